//! Insertion-only store of resolved anchors.

use std::collections::HashMap;

use datum_math::{Frame, Tolerance};
use tracing::trace;

use crate::error::{AnchorError, Result};
use crate::path::ReferencePath;

/// How an anchor came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorKind {
    /// Derived from a part's geometry.
    Auto,
    /// Declared by the user relative to another anchor.
    Named,
}

/// A named frame usable as a positioning reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    path: ReferencePath,
    frame: Frame,
    kind: AnchorKind,
}

impl Anchor {
    /// Create an anchor.
    pub fn new(path: ReferencePath, frame: Frame, kind: AnchorKind) -> Self {
        Self { path, frame, kind }
    }

    /// Qualified path.
    pub fn path(&self) -> &ReferencePath {
        &self.path
    }

    /// Resolved frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Auto-derived or user-declared.
    pub fn kind(&self) -> AnchorKind {
        self.kind
    }
}

/// Every anchor of one build, keyed by qualified path.
///
/// Anchors are never replaced or removed once inserted, and iteration
/// follows insertion order.
#[derive(Debug, Clone)]
pub struct AnchorRegistry {
    anchors: Vec<Anchor>,
    index: HashMap<String, usize>,
    tolerance: f64,
}

impl AnchorRegistry {
    /// Empty registry checking frames against `tolerance`.
    pub fn new(tolerance: f64) -> Self {
        Self {
            anchors: Vec::new(),
            index: HashMap::new(),
            tolerance,
        }
    }

    /// Insert a new anchor.
    ///
    /// Fails with [`AnchorError::AmbiguousAnchor`] when the path is taken and
    /// with [`AnchorError::InvalidFrame`] when the frame is not orthonormal
    /// within this registry's tolerance.
    pub fn insert(&mut self, anchor: Anchor) -> Result<()> {
        let key = anchor.path.as_str();
        if self.index.contains_key(key) {
            return Err(AnchorError::AmbiguousAnchor {
                path: key.to_string(),
            });
        }
        anchor
            .frame
            .check(self.tolerance)
            .map_err(|source| AnchorError::InvalidFrame {
                path: key.to_string(),
                source,
            })?;

        trace!(path = key, kind = ?anchor.kind, "registered anchor");
        self.index.insert(key.to_string(), self.anchors.len());
        self.anchors.push(anchor);
        Ok(())
    }

    /// Look up an anchor by exact path.
    pub fn get(&self, path: &str) -> Option<&Anchor> {
        self.index.get(path).map(|&i| &self.anchors[i])
    }

    /// Frame of the anchor at `path`.
    pub fn resolve(&self, path: &str) -> Result<Frame> {
        self.get(path)
            .map(|a| a.frame)
            .ok_or_else(|| AnchorError::UnknownAnchor {
                path: path.to_string(),
            })
    }

    /// Whether `path` is registered.
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Anchors scoped to `part`, in insertion order.
    pub fn anchors_of<'a>(&'a self, part: &'a str) -> impl Iterator<Item = &'a Anchor> + 'a {
        self.anchors
            .iter()
            .filter(move |a| a.path.part() == Some(part))
    }

    /// All anchors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter()
    }

    /// Number of anchors.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Whether no anchor is registered.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

impl Default for AnchorRegistry {
    fn default() -> Self {
        Self::new(Tolerance::DEFAULT.orthonormal)
    }
}
