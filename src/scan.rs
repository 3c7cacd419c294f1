//! Input-tree scanning into the content cache.
//!
//! Stage 1 of the WordFlow pipeline. Walks the input directory, parses every
//! document the cache doesn't already hold, and records the outcome of each
//! file so the CLI can summarize the run.
//!
//! ## Directory Structure
//!
//! ```text
//! source/                      # Input root (directories.input)
//! ├── post/                    # Content type "post" (listed on index.html)
//! │   ├── Hello World.docx
//! │   └── Trip Report.docx
//! ├── page/                    # Content type "page"
//! │   └── About.docx
//! └── stray.docx               # Misplaced: warned about and skipped
//! ```
//!
//! Every directory directly under the input root is a content type, and only
//! files with the configured input extension (`docx` or `md`) inside it are
//! documents. Deeper directories are ignored. Types and files are processed in
//! sorted order so repeated builds behave identically.
//!
//! ## Caching
//!
//! A document is reused from the cache when its key, type and source hash all
//! match. Otherwise it is parsed; a changed document replaces its old record
//! and the old record's media directory is removed. A document that fails to
//! parse is reported and skipped without stopping the scan, and any record it
//! already had stays in place.

use crate::cache::{ContentCache, ScanStats, hash_file};
use crate::context::BuildContext;
use crate::document::{self, DocumentError, ParsedDocument};
use crate::types::{ContentRecord, InputMode};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("input path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// What happened to one source document.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Added,
    Reused,
    Reparsed,
    Failed(String),
}

/// One document seen during the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedDocument {
    /// Path relative to the input root, e.g. `post/Hello.docx`.
    pub path: PathBuf,
    pub key: String,
    pub doc_type: String,
    pub outcome: Outcome,
}

/// Result of a scan run.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub documents: Vec<ScannedDocument>,
    /// Files directly under the input root, relative to it.
    pub misplaced: Vec<PathBuf>,
    pub stats: ScanStats,
}

/// Scan the input tree into `cache`. The cache is not persisted here.
pub fn scan(ctx: &BuildContext, cache: &mut ContentCache) -> Result<ScanReport, ScanError> {
    let input = ctx.input_dir();
    let mut report = ScanReport::default();

    if !input.exists() {
        warn!(path = %input.display(), "input directory does not exist, nothing to scan");
        return Ok(report);
    }
    if !input.is_dir() {
        return Err(ScanError::NotADirectory(input));
    }

    let mode = ctx.config.generator.input;
    let mut seen_keys = BTreeSet::new();

    for entry in sorted_entries(&input)? {
        let name = file_name(&entry);
        if entry.is_dir() {
            scan_type_dir(ctx, cache, &entry, &name, mode, &mut seen_keys, &mut report)?;
        } else {
            warn!(
                file = %name,
                "found misplaced file, move documents into a type directory (e.g. post/); skipping"
            );
            report.misplaced.push(PathBuf::from(name));
        }
    }

    Ok(report)
}

fn scan_type_dir(
    ctx: &BuildContext,
    cache: &mut ContentCache,
    dir: &Path,
    doc_type: &str,
    mode: InputMode,
    seen_keys: &mut BTreeSet<String>,
    report: &mut ScanReport,
) -> Result<(), ScanError> {
    for path in sorted_entries(dir)? {
        if !path.is_file() || !has_extension(&path, mode.extension()) {
            continue;
        }
        let name = file_name(&path);
        if name.starts_with("~$") {
            debug!(file = %name, "skipping editor lock file");
            continue;
        }
        let Some(key) = document::key_for(&path) else {
            continue;
        };
        let rel = PathBuf::from(doc_type).join(&name);

        let outcome = if !seen_keys.insert(key.clone()) {
            warn!(path = %rel.display(), %key, "another document already uses this key; skipping");
            Outcome::Failed(format!("duplicate key '{key}'"))
        } else {
            process_document(ctx, cache, &path, &key, doc_type)
        };

        match &outcome {
            Outcome::Added => report.stats.add(),
            Outcome::Reused => report.stats.reuse(),
            Outcome::Reparsed => report.stats.reparse(),
            Outcome::Failed(_) => report.stats.fail(),
        }
        report.documents.push(ScannedDocument {
            path: rel,
            key,
            doc_type: doc_type.to_string(),
            outcome,
        });
    }
    Ok(())
}

fn process_document(
    ctx: &BuildContext,
    cache: &mut ContentCache,
    path: &Path,
    key: &str,
    doc_type: &str,
) -> Outcome {
    let source_hash = match hash_file(path) {
        Ok(h) => h,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read document; skipping");
            return Outcome::Failed(e.to_string());
        }
    };

    let cached_type = cache.get(key).map(|r| r.doc_type.clone());
    if cache.is_fresh(key, &source_hash) && cached_type.as_deref() == Some(doc_type) {
        debug!(%key, "unchanged, using cached record");
        return Outcome::Reused;
    }

    let record = match parse_record(ctx, path, key, doc_type, source_hash) {
        Ok(record) => record,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not parse document; skipping");
            return Outcome::Failed(e.to_string());
        }
    };

    match cache.insert(record) {
        None => {
            info!(%key, %doc_type, "parsed new document");
            Outcome::Added
        }
        Some(old) => {
            remove_asset_dir(ctx, &old.asset_directory);
            info!(%key, %doc_type, "document changed, reparsed");
            Outcome::Reparsed
        }
    }
}

/// Parse one source file into a fresh record carrying the site fields.
pub fn parse_record(
    ctx: &BuildContext,
    path: &Path,
    key: &str,
    doc_type: &str,
    source_hash: String,
) -> Result<ContentRecord, DocumentError> {
    let parsed: ParsedDocument = match ctx.config.generator.input {
        InputMode::Docx => document::parse_docx(path, key, &ctx.output_dir())?,
        InputMode::Md => document::parse_markdown(path)?,
    };

    let title = parsed
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| key.to_string());

    Ok(ContentRecord {
        key: key.to_string(),
        doc_type: doc_type.to_string(),
        title,
        body: parsed.body,
        date: parsed.date.format("%Y-%m-%d").to_string(),
        display_date: parsed.date.format("%B %d, %Y").to_string(),
        asset_directory: parsed.asset_directory,
        source_hash,
        site: ctx.site.clone(),
    })
}

fn remove_asset_dir(ctx: &BuildContext, asset_directory: &str) {
    if asset_directory.is_empty() {
        return;
    }
    let dir = document::asset_path(&ctx.output_dir(), asset_directory);
    if dir.exists()
        && let Err(e) = fs::remove_dir_all(&dir)
    {
        warn!(path = %dir.display(), error = %e, "could not remove stale media directory");
    }
}

/// Directory entries sorted by name, dotfiles excluded.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| !file_name(p).starts_with('.'))
        .collect();
    entries.sort();
    Ok(entries)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
