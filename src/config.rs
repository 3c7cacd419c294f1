//! Project configuration module.
//!
//! Handles loading and validating the project's `config.toml`. User
//! files are sparse: stock defaults form the base layer and whatever the user
//! writes is merged on top, table by table.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [directories]
//! input = "source"          # Documents, one subdirectory per type
//! output = "out"            # Generated site
//! themes = "themes"         # Installed themes
//!
//! [site]
//! theme = "default"
//! domain = "wordflow.com"
//!
//! [author]
//! nickname = "ahr"
//! name = "author"
//! email = "you@me.com"
//! about = "I publish my word documents using wordflow!"
//!
//! [generator]
//! input = "docx"            # "docx" or "md"
//! sort_posts = "newest"     # "newest", "oldest" or "none"
//! preview_length = 120      # Characters of plain text in listing previews
//! ```
//!
//! Loading is best-effort. A file that fails to parse is read section by
//! section, and unknown keys or values of the wrong type are logged and
//! skipped; everything else still applies over the defaults. Only values that
//! parse but fail [`SiteConfig::validate`] stop the run.

use crate::types::InputMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Name of the configuration file at the project root.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub directories: DirectoriesConfig,
    pub site: SiteSection,
    pub author: AuthorConfig,
    pub generator: GeneratorConfig,
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dirs = [
            ("directories.input", &self.directories.input),
            ("directories.output", &self.directories.output),
            ("directories.themes", &self.directories.themes),
        ];
        for (key, value) in dirs {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.directories.input == self.directories.output {
            return Err(ConfigError::Validation(
                "directories.input and directories.output must differ".into(),
            ));
        }
        if self.site.theme.trim().is_empty() {
            return Err(ConfigError::Validation("site.theme must not be empty".into()));
        }
        if self.generator.preview_length == 0 {
            return Err(ConfigError::Validation(
                "generator.preview_length must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Input, output, and theme directories, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoriesConfig {
    pub input: String,
    pub output: String,
    pub themes: String,
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            input: "source".to_string(),
            output: "out".to_string(),
            themes: "themes".to_string(),
        }
    }
}

/// Site-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Theme directory name under `directories.themes`.
    pub theme: String,
    pub domain: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            domain: "wordflow.com".to_string(),
        }
    }
}

/// Author details merged into every page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorConfig {
    pub nickname: String,
    pub name: String,
    pub email: String,
    pub about: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            nickname: "ahr".to_string(),
            name: "author".to_string(),
            email: "you@me.com".to_string(),
            about: "I publish my word documents using wordflow!".to_string(),
        }
    }
}

/// Order of entries on the listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostOrder {
    #[default]
    Newest,
    Oldest,
    /// Keep cache order (sorted by key).
    None,
}

/// Generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Source format to read.
    pub input: InputMode,
    pub sort_posts: PostOrder,
    /// Plain-text characters shown per listing entry before the ellipsis.
    pub preview_length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            input: InputMode::Docx,
            sort_posts: PostOrder::Newest,
            preview_length: 120,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from the project root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist. Parse errors are logged and
/// the sections that do parse are returned.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    Ok(Some(parse_lenient(&content)))
}

/// Parse TOML text, keeping every `[section]` that parses on its own when the
/// whole text does not.
pub fn parse_lenient(content: &str) -> toml::Value {
    match toml::from_str::<toml::Value>(content) {
        Ok(value) => value,
        Err(e) => {
            warn!("{CONFIG_FILENAME}: {}", e.message());
            let mut value = toml::Value::Table(toml::Table::new());
            for section in split_sections(content) {
                match toml::from_str::<toml::Table>(&section) {
                    Ok(parsed) => value = merge_toml(value, toml::Value::Table(parsed)),
                    Err(e) => warn!(
                        "{CONFIG_FILENAME}: skipping `{}`: {}",
                        section.lines().next().unwrap_or_default().trim(),
                        e.message()
                    ),
                }
            }
            value
        }
    }
}

/// Split TOML text before every line that opens a table header.
fn split_sections(content: &str) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut current = String::new();
    for line in content.lines() {
        if line.trim_start().starts_with('[') && !current.trim().is_empty() {
            sections.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        sections.push(current);
    }
    sections
}

/// Drop keys of `overlay` that have no counterpart in `schema`, logging each.
fn drop_unknown_keys(schema: &toml::Value, overlay: toml::Value, prefix: &str) -> toml::Value {
    let toml::Value::Table(schema_table) = schema else {
        return overlay;
    };
    let table = match overlay {
        toml::Value::Table(table) => table,
        other => return other,
    };
    let mut kept = toml::Table::new();
    for (key, value) in table {
        let path = format!("{prefix}{key}");
        match schema_table.get(&key) {
            Some(schema_value) => {
                kept.insert(key, drop_unknown_keys(schema_value, value, &format!("{path}.")));
            }
            None => warn!("{CONFIG_FILENAME}: ignoring unknown key `{path}`"),
        }
    }
    toml::Value::Table(kept)
}

/// Apply `overlay` onto `base` one setting at a time, skipping settings whose
/// value does not deserialize.
fn apply_settings(base: toml::Value, overlay: toml::Value) -> toml::Value {
    let toml::Value::Table(sections) = overlay else {
        return base;
    };
    let mut current = base;
    for (section, value) in sections {
        let toml::Value::Table(settings) = value else {
            warn!("{CONFIG_FILENAME}: `{section}` must be a table, ignoring it");
            continue;
        };
        for (key, value) in settings {
            let mut setting = toml::Table::new();
            setting.insert(key.clone(), value);
            let mut layer = toml::Table::new();
            layer.insert(section.clone(), toml::Value::Table(setting));
            let candidate = merge_toml(current.clone(), toml::Value::Table(layer));
            let parsed: Result<SiteConfig, _> = candidate.clone().try_into();
            match parsed {
                Ok(_) => current = candidate,
                Err(e) => warn!(
                    "{CONFIG_FILENAME}: ignoring `{section}.{key}`: {}",
                    e.message()
                ),
            }
        }
    }
    current
}

/// Load the project config: stock defaults overlaid with `config.toml`.
///
/// Malformed parts of the file are logged and replaced by their defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(root)? {
        Some(overlay) => {
            let overlay = drop_unknown_keys(&base, overlay, "");
            apply_settings(base, overlay)
        }
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by `init` and the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# WordFlow Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys are ignored with a warning.

# ---------------------------------------------------------------------------
# Directories (relative to this file)
# ---------------------------------------------------------------------------
[directories]
# Source documents. Each subdirectory is a content type: source/post/, source/page/
input = "source"
# Generated site.
output = "out"
# Installed themes: themes/<name>/<type>.html
themes = "themes"

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
theme = "default"
domain = "wordflow.com"

# ---------------------------------------------------------------------------
# Author (available to every template as [[name]], [[email]], ...)
# ---------------------------------------------------------------------------
[author]
nickname = "ahr"
name = "author"
email = "you@me.com"
about = "I publish my word documents using wordflow!"

# ---------------------------------------------------------------------------
# Generator
# ---------------------------------------------------------------------------
[generator]
# Source format: "docx" (Word documents) or "md" (markdown).
input = "docx"
# Listing page order: "newest", "oldest" or "none".
sort_posts = "newest"
# Characters of plain text shown per post on the listing page.
preview_length = 120
"##
}
