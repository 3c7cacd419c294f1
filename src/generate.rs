//! HTML site generation.
//!
//! Stage 2 of the WordFlow pipeline. Takes the content cache filled by
//! [`scan`](crate::scan) and renders the site through the active theme.
//!
//! ## Generated Pages
//!
//! - **Content pages** (`/<type>/<slug>.html`): each record rendered with the
//!   theme's `<type>.html` template.
//! - **Index page** (`/index.html`): the theme's `home.html` with a listing of
//!   every `post` record in its `[[body]]`. Each listing entry is formatted with
//!   the theme's `post` snippet, or a built-in one.
//!
//! A missing template is a warning: pages of that type (or the index) are
//! skipped and the rest of the site is still written.
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── index.html
//! ├── generated_output.json      # Copy of the content cache
//! ├── post/
//! │   └── hello-world.html
//! ├── page/
//! │   └── about.html
//! └── public/
//!     ├── assets/                # Theme assets, replaced on every run
//!     └── images/
//!         └── hello-world-3f2a9c1e/
//! ```

use crate::cache::{CACHE_FILENAME, ContentCache};
use crate::config::PostOrder;
use crate::context::{BuildContext, PUBLIC_ASSETS_DIR, THEME_ASSETS_DIR};
use crate::template::{self, TemplateError, ThemeSettings};
use crate::types::ContentRecord;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("error walking theme assets: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Content type listed on the index page.
pub const LISTED_TYPE: &str = "post";

/// Template name for the index page.
pub const HOME_TEMPLATE: &str = "home";

/// Snippet name for one listing entry.
pub const LISTING_SNIPPET: &str = "post";

/// Listing entry used when the theme declares no `post` snippet.
pub const DEFAULT_LISTING_SNIPPET: &str = concat!(
    r#"<div class="card post-item bg-transparent border-0 mb-5"><div class="card-body px-0">"#,
    r#"<h2 class="card-title"><a class="text-white opacity-75-onHover" href="[[url]]">[[title]]</a></h2>"#,
    r#"<ul class="post-meta mt-3">"#,
    r##"<li class="d-inline-block mr-3"><span class="fas fa-clock text-primary"></span><a class="ml-1" href="#">[[display_date]]</a></li>"##,
    r##"<li class="d-inline-block"><span class="fas fa-list-alt text-primary"></span><a class="ml-1" href="#">[[author]]</a></li>"##,
    r#"</ul>"#,
    r#"<p class="card-text my-4">[[preview]]</p>"#,
    r#"<a href="[[url]]" class="btn btn-primary">Read More</a>"#,
    r#"</div></div>"#
);

const ELLIPSIS: &str = "...";

static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|h\d|li|td|tr|table|blockquote|q)>")
        .expect("block break pattern is valid")
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

/// A page written to the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    pub key: String,
    pub doc_type: String,
    /// Path relative to the output directory.
    pub path: PathBuf,
}

/// A record that got no page because its template is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPage {
    pub key: String,
    pub template: String,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub pages: Vec<GeneratedPage>,
    pub skipped: Vec<SkippedPage>,
    /// `index.html` relative to the output directory, if it was written.
    pub index: Option<PathBuf>,
    /// Entries on the index listing.
    pub listed: usize,
    /// Theme asset files copied, `None` when the theme has no assets.
    pub assets_copied: Option<usize>,
}

/// Render every cached record, the index page, and copy theme assets.
pub fn generate(ctx: &BuildContext, cache: &ContentCache) -> Result<GenerateReport, GenerateError> {
    let output_dir = ctx.output_dir();
    let theme_dir = ctx.theme_dir();
    fs::create_dir_all(&output_dir)?;

    let mut report = GenerateReport::default();
    if !theme_dir.is_dir() {
        warn!(theme = %ctx.config.site.theme, path = %theme_dir.display(), "theme not found");
    }

    render_pages(cache, &theme_dir, &output_dir, &mut report)?;
    render_index(ctx, cache, &theme_dir, &output_dir, &mut report)?;

    cache.save(&output_dir)?;
    debug!(file = CACHE_FILENAME, "copied content cache into output");

    report.assets_copied = copy_theme_assets(&theme_dir, &output_dir)?;
    Ok(report)
}

fn render_pages(
    cache: &ContentCache,
    theme_dir: &Path,
    output_dir: &Path,
    report: &mut GenerateReport,
) -> Result<(), GenerateError> {
    // type -> template text, None once known missing
    let mut templates: BTreeMap<String, Option<String>> = BTreeMap::new();
    let mut written: BTreeSet<PathBuf> = BTreeSet::new();

    for record in cache.records() {
        if !templates.contains_key(&record.doc_type) {
            let loaded = load_optional(theme_dir, &record.doc_type)?;
            templates.insert(record.doc_type.clone(), loaded);
        }
        let Some(Some(text)) = templates.get(&record.doc_type) else {
            report.skipped.push(SkippedPage {
                key: record.key.clone(),
                template: record.doc_type.clone(),
            });
            continue;
        };

        let html = template::render_template(text, &record.template_fields());
        let rel = page_path(record);
        if !written.insert(rel.clone()) {
            warn!(key = %record.key, path = %rel.display(), "another document already wrote this page, overwriting");
        }
        let path = output_dir.join(&rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, html)?;
        debug!(key = %record.key, path = %rel.display(), "wrote page");

        report.pages.push(GeneratedPage {
            key: record.key.clone(),
            doc_type: record.doc_type.clone(),
            path: rel,
        });
    }
    Ok(())
}

fn render_index(
    ctx: &BuildContext,
    cache: &ContentCache,
    theme_dir: &Path,
    output_dir: &Path,
    report: &mut GenerateReport,
) -> Result<(), GenerateError> {
    let posts = listed_posts(cache, ctx.config.generator.sort_posts);
    report.listed = posts.len();

    let settings = match template::load_theme_settings(theme_dir) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "ignoring unreadable theme settings");
            ThemeSettings::default()
        }
    };
    let snippet = settings
        .snippet(LISTING_SNIPPET)
        .unwrap_or(DEFAULT_LISTING_SNIPPET);

    let mut fields = BTreeMap::new();
    ctx.site.extend_fields(&mut fields);
    fields.insert(
        "body".to_string(),
        render_listing(&posts, snippet, ctx.config.generator.preview_length),
    );

    let html = match template::render_named(theme_dir, HOME_TEMPLATE, &fields) {
        Ok(html) => html,
        Err(TemplateError::NotFound(path)) => {
            warn!(template = HOME_TEMPLATE, path = %path.display(), "template not found, skipping");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    fs::write(output_dir.join("index.html"), html)?;
    info!(posts = posts.len(), "wrote index page");
    report.index = Some(PathBuf::from("index.html"));
    Ok(())
}

/// A template's text, or `None` (with a warning) when the theme lacks it.
fn load_optional(theme_dir: &Path, name: &str) -> Result<Option<String>, GenerateError> {
    match template::load_template(theme_dir, name) {
        Ok(text) => Ok(Some(text)),
        Err(TemplateError::NotFound(path)) => {
            warn!(template = %name, path = %path.display(), "template not found, skipping");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Output path of a record's page, relative to the output directory.
pub fn page_path(record: &ContentRecord) -> PathBuf {
    PathBuf::from(&record.doc_type).join(format!("{}.html", record.slug()))
}

/// Records shown on the index page, in listing order.
///
/// Dates are ISO strings, so string order is chronological; ties keep key
/// order.
pub fn listed_posts(cache: &ContentCache, order: PostOrder) -> Vec<&ContentRecord> {
    let mut posts: Vec<&ContentRecord> = cache
        .records()
        .filter(|r| r.doc_type == LISTED_TYPE)
        .collect();
    match order {
        PostOrder::Newest => posts.sort_by(|a, b| b.date.cmp(&a.date)),
        PostOrder::Oldest => posts.sort_by(|a, b| a.date.cmp(&b.date)),
        PostOrder::None => {}
    }
    posts
}

/// Concatenate one formatted snippet per post.
pub fn render_listing(posts: &[&ContentRecord], snippet: &str, preview_length: usize) -> String {
    let mut body = String::new();
    for post in posts {
        let mut fields = post.template_fields();
        fields.insert("preview".to_string(), preview(&post.body, preview_length));
        fields.insert("author".to_string(), post.site.name.clone());
        body.push_str(&template::render_template(snippet, &fields));
    }
    body
}

/// Plain-text preview of an HTML body: the first `max_chars` characters,
/// with an ellipsis when cut. The result is HTML-escaped.
pub fn preview(html: &str, max_chars: usize) -> String {
    let text = html_to_text(html);
    let mut truncated: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        truncated.push_str(ELLIPSIS);
    }
    escape_html(&truncated)
}

/// Strip tags from an HTML fragment, keeping word boundaries between blocks.
pub fn html_to_text(html: &str) -> String {
    let text = BLOCK_BREAK.replace_all(html, " ");
    let text = TAG.replace_all(&text, "");
    let text = unescape_entities(&text)
        .replace('\u{a0}', " ")
        .replace('\u{2011}', "-")
        .replace(['\u{201c}', '\u{201d}'], "\"");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn unescape_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Replace `<output>/public/assets` with a copy of `<theme>/assets`.
///
/// Returns the number of files copied, or `None` (with a warning) when the
/// theme has no asset directory.
pub fn copy_theme_assets(theme_dir: &Path, output_dir: &Path) -> Result<Option<usize>, GenerateError> {
    let source = theme_dir.join(THEME_ASSETS_DIR);
    if !source.is_dir() {
        warn!(path = %source.display(), "theme has no assets directory, skipping asset copy");
        return Ok(None);
    }

    let target = output_dir.join(PUBLIC_ASSETS_DIR);
    if target.exists() {
        fs::remove_dir_all(&target)?;
    }

    let mut copied = 0;
    for entry in WalkDir::new(&source).sort_by_file_name() {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(&source) else {
            continue;
        };
        let dest = target.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
            copied += 1;
        }
    }
    info!(files = copied, "copied theme assets");
    Ok(Some(copied))
}
