//! Build options.

use datum_math::Tolerance;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AnchorError, Result};

/// Failure to read a [`BuildConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Not valid TOML, or a field has the wrong type.
    #[error(transparent)]
    Parse(#[from] toml::de::Error),

    /// Parsed, but the values cannot be used.
    #[error(transparent)]
    Invalid(#[from] AnchorError),
}

/// Options for one build pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Orthonormality tolerance applied when anchors are registered.
    ///
    /// Frames are already checked at 1e-9 when constructed, so only a
    /// stricter value changes what is accepted. Must be finite and positive.
    pub tolerance: f64,
}

impl BuildConfig {
    /// Parse from a TOML table such as `tolerance = 1e-10`.
    pub fn from_toml(text: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Same config with a different tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Reject a tolerance that is NaN, infinite, zero, or negative.
    pub fn validate(&self) -> Result<()> {
        if self.tolerance.is_finite() && self.tolerance > 0.0 {
            Ok(())
        } else {
            Err(AnchorError::InvalidTolerance {
                tolerance: self.tolerance,
            })
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT.orthonormal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        assert_eq!(BuildConfig::from_toml("").unwrap(), BuildConfig::default());
        assert_eq!(BuildConfig::default().tolerance, 1e-9);
    }

    #[test]
    fn reads_tolerance() {
        let config = BuildConfig::from_toml("tolerance = 1e-12").unwrap();
        assert_eq!(config.tolerance, 1e-12);
    }

    #[test]
    fn rejects_wrong_type() {
        assert!(matches!(
            BuildConfig::from_toml("tolerance = \"tight\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_unusable_tolerance() {
        for text in ["tolerance = -1.0", "tolerance = 0.0", "tolerance = nan", "tolerance = inf"] {
            assert!(
                matches!(
                    BuildConfig::from_toml(text),
                    Err(ConfigError::Invalid(AnchorError::InvalidTolerance { .. }))
                ),
                "{text}"
            );
        }
        let err = BuildConfig::default().with_tolerance(-1.0).validate().unwrap_err();
        assert_eq!(err, AnchorError::InvalidTolerance { tolerance: -1.0 });
        assert!(err.paths().is_empty());
    }
}
