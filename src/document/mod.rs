//! Source document → HTML body.
//!
//! Two input modes produce the same [`ParsedDocument`]:
//!
//! - **docx**: the package body is walked block by block ([`docx`]), media is
//!   pulled out into a per-parse directory ([`assets`]), and each block is
//!   rendered in source order: tables as `<table>`, paragraphs through the
//!   [style mapper](crate::style) with any inline graphics emitted as `<img>`
//!   ahead of the paragraph text.
//! - **md**: the whole file goes through `pulldown-cmark`; whatever the
//!   markdown renderer produces is the body.
//!
//! ## Dates
//!
//! The record date is the first available of: the document's embedded
//! creation timestamp, the file's creation time on disk, today.

pub mod assets;
pub mod docx;

use crate::style::{StyleError, map_style};
use assets::ExtractedAssets;
use chrono::{DateTime, Local, NaiveDate};
use docx::{Block, DocxPackage, TableBlock, TextBlock};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid docx package: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("missing package part {0}")]
    MissingPart(String),
    #[error(transparent)]
    Style(#[from] StyleError),
}

/// The parser's output for one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Title embedded in the document, if any.
    pub title: Option<String>,
    pub body: String,
    pub date: NaiveDate,
    /// Site-absolute media directory, empty when nothing was extracted.
    pub asset_directory: String,
}

/// Parse a `.docx` file, extracting media under `output_root`.
///
/// On failure (e.g. an unmapped style) any media already extracted for this
/// parse is removed again.
pub fn parse_docx(path: &Path, key: &str, output_root: &Path) -> Result<ParsedDocument, DocumentError> {
    let mut package = DocxPackage::open(path)?;
    let props = package.core_properties()?;
    let blocks = package.blocks()?;
    let assets = assets::extract_assets(&mut package, key, output_root)?;

    let body = match render_blocks(&blocks, &assets) {
        Ok(body) => body,
        Err(e) => {
            if !assets.directory.is_empty() {
                discard_asset_dir(&asset_path(output_root, &assets.directory));
            }
            return Err(e.into());
        }
    };

    Ok(ParsedDocument {
        title: props.title,
        body,
        date: resolve_date(props.created, path),
        asset_directory: assets.directory,
    })
}

/// Parse a markdown file. The first `# ` heading, if any, is the title.
pub fn parse_markdown(path: &Path) -> Result<ParsedDocument, DocumentError> {
    let content = fs::read_to_string(path)?;
    let title = content
        .lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
        .filter(|t| !t.is_empty());

    Ok(ParsedDocument {
        title,
        body: render_markdown(&content),
        date: resolve_date(None, path),
        asset_directory: String::new(),
    })
}

/// Markdown → HTML with the common extensions enabled.
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);
    let parser = Parser::new_ext(content, options);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}

/// Render parsed blocks to one HTML string, preserving block order.
///
/// Paragraphs with neither text nor a resolvable graphic emit nothing.
pub fn render_blocks(blocks: &[Block], assets: &ExtractedAssets) -> Result<String, StyleError> {
    let mut html = String::new();
    for block in blocks {
        match block {
            Block::Table(table) => render_table(table, &mut html),
            Block::Text(text) => render_text(text, assets, &mut html)?,
        }
    }
    Ok(html)
}

fn render_table(table: &TableBlock, html: &mut String) {
    html.push_str("<table>");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str("<td>");
            html.push_str(&escape_text(cell));
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
}

fn render_text(block: &TextBlock, assets: &ExtractedAssets, html: &mut String) -> Result<(), StyleError> {
    for rel_id in &block.image_refs {
        if let Some(src) = assets.src_for(rel_id) {
            html.push_str(&format!(
                "<img class=\"img-fluid\" src=\"{}\" alt=\"\">",
                escape_attr(&src)
            ));
        }
    }
    if !block.text.trim().is_empty() {
        let tag = map_style(&block.style, &block.formatting)?;
        html.push_str(&tag.wrap(&escape_text(&block.text)));
    }
    Ok(())
}

/// Escape text content for HTML, turning line breaks into `<br>`.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            c => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Pick the record date: embedded metadata, then file creation time, then today.
pub fn resolve_date(embedded: Option<NaiveDate>, path: &Path) -> NaiveDate {
    embedded
        .or_else(|| file_created(path))
        .unwrap_or_else(|| Local::now().date_naive())
}

fn file_created(path: &Path) -> Option<NaiveDate> {
    let created = fs::metadata(path).ok()?.created().ok()?;
    Some(DateTime::<Local>::from(created).date_naive())
}

/// Filename stem used as the record key.
pub fn key_for(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy().to_string();
    // `report.final.docx` → `report`
    let key = name.split('.').next().unwrap_or(&name).to_string();
    (!key.is_empty()).then_some(key)
}

/// Remove a failed document's media directory, warning when it can't be.
/// Returns whether the directory is gone.
fn discard_asset_dir(dir: &Path) -> bool {
    match fs::remove_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "could not remove media directory of failed document");
            false
        }
    }
}

/// Absolute path of a site-absolute asset directory under the output root.
pub fn asset_path(output_root: &Path, asset_directory: &str) -> PathBuf {
    output_root.join(asset_directory.trim_start_matches('/'))
}
