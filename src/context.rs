//! Per-run pipeline context.
//!
//! Built once by the CLI from the project root and its configuration, then
//! passed by reference to every stage. Nothing in the pipeline reads
//! configuration from anywhere else.

use crate::config::{self, ConfigError, SiteConfig};
use crate::types::SiteFields;
use std::path::{Path, PathBuf};

/// Theme subdirectory copied verbatim into the output.
pub const THEME_ASSETS_DIR: &str = "assets";

/// Output subdirectory receiving the theme's assets.
pub const PUBLIC_ASSETS_DIR: &str = "public/assets";

#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Project root; every configured directory is relative to it.
    pub root: PathBuf,
    pub config: SiteConfig,
    /// Author and site fields merged into every record.
    pub site: SiteFields,
}

impl BuildContext {
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        let site = SiteFields::from_config(&config.author, &config.site);
        Self {
            root: root.into(),
            config,
            site,
        }
    }

    /// Load `config.toml` from `root` (defaults when absent).
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config = config::load_config(root)?;
        Ok(Self::new(root, config))
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join(&self.config.directories.input)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.directories.output)
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.root.join(&self.config.directories.themes)
    }

    /// Directory of the active theme.
    pub fn theme_dir(&self) -> PathBuf {
        self.themes_dir().join(&self.config.site.theme)
    }
}
