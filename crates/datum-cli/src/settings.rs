//! `--config` file handling.

use std::path::Path;

use anyhow::{Context, Result};
use datum::BuildConfig;
use serde::{Deserialize, Serialize};

/// Output format of `resolve` and `frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Aligned text columns.
    #[default]
    Table,
    /// One JSON document.
    Json,
}

/// `[output]` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Decimal places in table output.
    pub precision: usize,
    /// Default format when `--format` is not given.
    pub format: Format,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            precision: 3,
            format: Format::Table,
        }
    }
}

/// Contents of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Build options.
    pub build: BuildConfig,
    /// Output options.
    pub output: OutputSettings,
}

impl Settings {
    /// Load from `path`, or defaults when no path was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let settings: Settings = toml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        settings
            .build
            .validate()
            .with_context(|| format!("invalid [build] in {}", path.display()))?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_path_gives_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.output.precision, 3);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_config("[output]\nformat = \"json\"\n");
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.output.format, Format::Json);
        assert_eq!(settings.output.precision, 3);
        assert_eq!(settings.build, BuildConfig::default());
    }

    #[test]
    fn reads_build_tolerance() {
        let file = write_config("[build]\ntolerance = 1e-12\n[output]\nprecision = 6\n");
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.build.tolerance, 1e-12);
        assert_eq!(settings.output.precision, 6);
    }

    #[test]
    fn rejects_bad_tolerance_and_bad_toml() {
        let file = write_config("[build]\ntolerance = -1.0\n");
        assert!(Settings::load(Some(file.path())).is_err());
        let file = write_config("[output\n");
        assert!(Settings::load(Some(file.path())).is_err());
    }
}
