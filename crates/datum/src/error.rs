//! Error types for anchor resolution.

use datum_math::FrameError;
use thiserror::Error;

/// Errors reported by a geometry engine binding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The handle does not belong to this engine.
    #[error("unknown geometry handle: {0}")]
    UnknownHandle(String),

    /// The construction parameters describe no volume.
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    /// The engine cannot build or query this geometry.
    #[error("unsupported geometry: {0}")]
    Unsupported(String),

    /// The engine produced a frame that fails the orthonormality check.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Errors that abort a build pass.
///
/// Every variant raised by a declaration names the reference path(s)
/// involved so a loader can map them back to file positions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnchorError {
    /// Lookup of a path that was never declared or derived.
    #[error("unknown anchor `{path}`")]
    UnknownAnchor {
        /// The requested path.
        path: String,
    },

    /// A positioning target names nothing declared before it.
    #[error("`{from}` references `{target}`, which is not declared before it")]
    UndefinedReference {
        /// The declaration holding the reference.
        from: String,
        /// The unresolved target path.
        target: String,
    },

    /// Resolution re-entered a node that is still resolving.
    #[error("circular dependency: {}", .cycle.join(" -> "))]
    CircularDependency {
        /// Node names along the cycle; the first name is repeated at the end.
        cycle: Vec<String>,
    },

    /// Two declarations claim the same qualified path.
    #[error("anchor `{path}` is declared more than once")]
    AmbiguousAnchor {
        /// The contested path.
        path: String,
    },

    /// A frame fails the orthonormality invariant.
    #[error("invalid frame for `{path}`: {source}")]
    InvalidFrame {
        /// Anchor or part whose frame was being built.
        path: String,
        /// What was wrong with the basis.
        #[source]
        source: FrameError,
    },

    /// An offset or rotation vector is malformed.
    #[error("invalid offset for `{path}`: {reason}")]
    InvalidOffset {
        /// The declaration carrying the vector.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A declared name is not a usable reference path.
    #[error("invalid reference path `{path}`")]
    InvalidPath {
        /// The rejected text.
        path: String,
    },

    /// The build tolerance is not a finite positive number.
    #[error("tolerance must be finite and positive, got {tolerance}")]
    InvalidTolerance {
        /// The rejected value.
        tolerance: f64,
    },

    /// The geometry engine failed for a part.
    #[error("geometry error in part `{part}`: {source}")]
    Geometry {
        /// The part being realized.
        part: String,
        /// The engine's error.
        #[source]
        source: GeometryError,
    },
}

impl AnchorError {
    /// The reference paths this error is about.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::UnknownAnchor { path }
            | Self::AmbiguousAnchor { path }
            | Self::InvalidFrame { path, .. }
            | Self::InvalidOffset { path, .. }
            | Self::InvalidPath { path } => vec![path.as_str()],
            Self::UndefinedReference { from, target } => vec![from.as_str(), target.as_str()],
            Self::CircularDependency { cycle } => cycle.iter().map(String::as_str).collect(),
            Self::Geometry { part, .. } => vec![part.as_str()],
            Self::InvalidTolerance { .. } => Vec::new(),
        }
    }
}

/// Result type for anchor resolution.
pub type Result<T> = std::result::Result<T, AnchorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let err = AnchorError::CircularDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "circular dependency: a -> b -> a");
        assert_eq!(err.paths(), vec!["a", "b", "a"]);
    }

    #[test]
    fn undefined_reference_reports_both_ends() {
        let err = AnchorError::UndefinedReference {
            from: "lid".into(),
            target: "base.face_top".into(),
        };
        assert_eq!(err.paths(), vec!["lid", "base.face_top"]);
        assert!(err.to_string().contains("base.face_top"));
    }

    #[test]
    fn frame_error_is_the_source() {
        use std::error::Error as _;
        let err = AnchorError::InvalidFrame {
            path: "a".into(),
            source: FrameError::NonFinite,
        };
        assert!(err.source().is_some());
    }
}
