//! Theme templates and placeholder substitution.
//!
//! A theme is a directory under `directories.themes`:
//!
//! ```text
//! themes/default/
//! ├── theme.toml       # Optional settings: [snippets] fragments
//! ├── home.html        # Listing page (out/index.html)
//! ├── post.html        # One template per content type
//! ├── page.html
//! └── assets/          # Copied verbatim to out/public/assets/
//! ```
//!
//! ## Placeholders
//!
//! Templates reference fields as `[[name]]`, where `name` is lowercase ASCII
//! letters and underscores. Substitution is a single left-to-right pass over
//! the template text: values are inserted verbatim (no HTML escaping) and are
//! never scanned for placeholders themselves, so a document body that happens
//! to contain `[[title]]` renders literally.
//!
//! A placeholder with no matching field is left in the output as-is and
//! logged as a warning.

use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

/// Optional settings file at the root of a theme.
pub const THEME_SETTINGS_FILENAME: &str = "theme.toml";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([a-z_]+)\]\]").expect("placeholder pattern is valid"));

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("theme settings error: {0}")]
    Settings(#[from] toml::de::Error),
}

/// Settings declared in `theme.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    /// Named fragments; `post` formats one listing entry on the home page.
    pub snippets: BTreeMap<String, String>,
}

impl ThemeSettings {
    pub fn snippet(&self, name: &str) -> Option<&str> {
        self.snippets.get(name).map(String::as_str)
    }
}

/// Read `theme.toml` from a theme directory. A missing file yields defaults.
pub fn load_theme_settings(theme_dir: &Path) -> Result<ThemeSettings, TemplateError> {
    let path = theme_dir.join(THEME_SETTINGS_FILENAME);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ThemeSettings::default()),
        Err(e) => Err(e.into()),
    }
}

/// Path of the named template (`<theme_dir>/<name>.html`).
pub fn template_path(theme_dir: &Path, name: &str) -> PathBuf {
    theme_dir.join(format!("{name}.html"))
}

/// Read the raw text of `<theme_dir>/<name>.html`.
pub fn load_template(theme_dir: &Path, name: &str) -> Result<String, TemplateError> {
    let path = template_path(theme_dir, name);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(TemplateError::NotFound(path)),
        Err(e) => Err(e.into()),
    }
}

/// Load a template and render it with `fields`.
pub fn render_named(
    theme_dir: &Path,
    name: &str,
    fields: &BTreeMap<String, String>,
) -> Result<String, TemplateError> {
    let text = load_template(theme_dir, name)?;
    Ok(render_template(&text, fields))
}

/// Substitute placeholders, warning once per unresolved name.
pub fn render_template(text: &str, fields: &BTreeMap<String, String>) -> String {
    let (html, unresolved) = substitute(text, fields);
    for name in unresolved {
        warn!(placeholder = %name, "unresolved template placeholder");
    }
    html
}

/// Single-pass substitution. Returns the output and the distinct placeholder
/// names that had no field, in first-seen order.
pub fn substitute(text: &str, fields: &BTreeMap<String, String>) -> (String, Vec<String>) {
    let mut seen = BTreeSet::new();
    let mut unresolved = Vec::new();
    let html = PLACEHOLDER.replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        match fields.get(name) {
            Some(value) => value.clone(),
            None => {
                if seen.insert(name.to_string()) {
                    unresolved.push(name.to_string());
                }
                caps[0].to_string()
            }
        }
    });
    (html.into_owned(), unresolved)
}
