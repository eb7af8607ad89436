//! Optional settings file
//!
//! Looked up as `drawio-batch.toml` in the input directory, then as
//! `config.toml` in the user's config directory. Command-line flags are
//! applied on top with [`Config::apply_cli_overrides`].

use crate::targets::ExportTargets;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local settings file name
pub const PROJECT_CONFIG_FILE: &str = "drawio-batch.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// draw.io executable, a path or a program name on PATH
    pub renderer: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub widths: Vec<u32>,
    pub png: bool,
    pub jpeg: bool,
    pub skip_pdf: bool,
    pub include_xml: bool,
    pub log_file: Option<PathBuf>,
}

/// Values given on the command line; `None` / `false` / empty means "not given"
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub renderer: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub widths: Vec<u32>,
    pub png: bool,
    pub jpeg: bool,
    pub skip_pdf: bool,
    pub include_xml: bool,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load the first settings file found for `input_dir`, or defaults
    pub fn load(input_dir: &Path) -> Result<Self> {
        let project = input_dir.join(PROJECT_CONFIG_FILE);
        if project.is_file() {
            return Self::load_from(&project);
        }
        match user_config_path() {
            Some(user) if user.is_file() => Self::load_from(&user),
            _ => Ok(Self::default()),
        }
    }

    /// Parse a settings file; relative paths are resolved against its directory
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_relative_paths(base);
        }
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn resolve_relative_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(dir) = self.output_directory.as_mut() {
            resolve(dir);
        }
        if let Some(file) = self.log_file.as_mut() {
            resolve(file);
        }
        // A bare program name stays as is so it can be looked up on PATH
        if let Some(renderer) = self.renderer.as_mut() {
            if renderer.components().count() > 1 {
                resolve(renderer);
            }
        }
    }

    /// Merge command-line values: toggles switch on, given values replace
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if overrides.renderer.is_some() {
            self.renderer = overrides.renderer;
        }
        if overrides.output_directory.is_some() {
            self.output_directory = overrides.output_directory;
        }
        if !overrides.widths.is_empty() {
            self.widths = overrides.widths;
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }
        self.png |= overrides.png;
        self.jpeg |= overrides.jpeg;
        self.skip_pdf |= overrides.skip_pdf;
        self.include_xml |= overrides.include_xml;
    }

    pub fn export_targets(&self) -> ExportTargets {
        ExportTargets {
            pdf: !self.skip_pdf,
            png: self.png,
            jpeg: self.jpeg,
            widths: self.widths.clone(),
        }
    }
}

/// `config.toml` in the platform config directory for this tool
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "drawio-batch")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
