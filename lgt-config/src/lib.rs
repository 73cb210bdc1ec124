//! Shared configuration loader for the lgt toolchain.
//!
//! `defaults/lgt.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into
//! [`LgtConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

use lgt_parser::lgt::IndentStyle;

const DEFAULT_TOML: &str = include_str!("../defaults/lgt.default.toml");

/// Top-level configuration consumed by lgt applications.
#[derive(Debug, Clone, Deserialize)]
pub struct LgtConfig {
    pub indentation: IndentationConfig,
    pub scanning: ScanningConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Indentation unit selection.
#[derive(Debug, Clone, Deserialize)]
pub struct IndentationConfig {
    pub style: IndentStyleName,
    pub width: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentStyleName {
    Tabs,
    Spaces,
}

impl IndentationConfig {
    /// The style the indentation engine consumes.
    pub fn indent_style(&self) -> IndentStyle {
        match self.style {
            IndentStyleName::Tabs => IndentStyle::Tabs,
            IndentStyleName::Spaces => IndentStyle::Spaces(self.width),
        }
    }
}

/// Workspace scanning knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanningConfig {
    pub extensions: Vec<String>,
}

/// Anomaly reporting knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    pub report_anomalies: bool,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<LgtConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<LgtConfig, ConfigError> {
    Loader::new().build()
}
