//! Content cache: parsed records persisted between runs.
//!
//! Parsing a `.docx` means unzipping it, walking its XML and extracting every
//! embedded image into a fresh directory. The cache lets `scan` skip all of
//! that for documents it has already seen.
//!
//! ## Keys and freshness
//!
//! Records are keyed by document key (filename stem). Each record also carries
//! the SHA-256 of its source file at parse time. A cached record is reused only
//! when the key is present **and** the source hash still matches, so editing a
//! document is enough to get it re-rendered. Hashes are content-based rather
//! than mtime-based so they survive `git checkout`.
//!
//! ## Storage
//!
//! The cache is a JSON object (`key → record`) at
//! `<project root>/generated_output.json`. The generate stage also copies it
//! into the output directory so the site ships with a machine-readable index
//! of its content.
//!
//! Loading is best-effort: an unreadable or malformed file yields an empty
//! cache, and a single malformed entry is dropped with a warning while the
//! rest are kept.

use crate::types::ContentRecord;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the cache file within the project root.
pub const CACHE_FILENAME: &str = "generated_output.json";

/// In-memory view of the cache file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentCache {
    records: BTreeMap<String, ContentRecord>,
}

impl ContentCache {
    /// An empty cache (first run, or after `clearcontent`).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from the project root. Missing or unparseable files give an empty
    /// cache; malformed entries are skipped individually.
    pub fn load(root: &Path) -> Self {
        let path = cache_path(root);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::empty(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read content cache, starting empty");
                return Self::empty();
            }
        };
        Self::from_json(&content)
    }

    /// Parse cache JSON, keeping every entry that deserializes.
    pub fn from_json(content: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "content cache is not valid JSON, starting empty");
                return Self::empty();
            }
        };
        let serde_json::Value::Object(entries) = value else {
            warn!("content cache is not a JSON object, starting empty");
            return Self::empty();
        };

        let mut records = BTreeMap::new();
        for (key, entry) in entries {
            match serde_json::from_value::<ContentRecord>(entry) {
                Ok(record) if record.key == key => {
                    records.insert(key, record);
                }
                Ok(record) => {
                    warn!(%key, record_key = %record.key, "dropping cache entry filed under the wrong key");
                }
                Err(e) => {
                    warn!(%key, error = %e, "dropping malformed cache entry");
                }
            }
        }
        debug!(entries = records.len(), "loaded content cache");
        Self { records }
    }

    /// Write the whole cache to the project root, replacing the previous file.
    pub fn save(&self, root: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(cache_path(root), json)
    }

    pub fn get(&self, key: &str) -> Option<&ContentRecord> {
        self.records.get(key)
    }

    /// True when `key` is cached and was parsed from content hashing to
    /// `source_hash`.
    pub fn is_fresh(&self, key: &str, source_hash: &str) -> bool {
        self.records
            .get(key)
            .is_some_and(|r| r.source_hash == source_hash)
    }

    /// Insert or replace a record, returning the one it displaced.
    pub fn insert(&mut self, record: ContentRecord) -> Option<ContentRecord> {
        self.records.insert(record.key.clone(), record)
    }

    /// Records in key order.
    pub fn records(&self) -> impl Iterator<Item = &ContentRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Resolve the cache file path for a project root.
pub fn cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_FILENAME)
}

/// Summary of what a scan did with each document it found.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    /// Parsed for the first time.
    pub added: u32,
    /// Unchanged since the last scan.
    pub reused: u32,
    /// Source changed, parsed again.
    pub reparsed: u32,
    /// Could not be parsed (unmapped style, corrupt package, ...).
    pub failed: u32,
}

impl ScanStats {
    pub fn add(&mut self) {
        self.added += 1;
    }

    pub fn reuse(&mut self) {
        self.reused += 1;
    }

    pub fn reparse(&mut self) {
        self.reparsed += 1;
    }

    pub fn fail(&mut self) {
        self.failed += 1;
    }

    pub fn total(&self) -> u32 {
        self.added + self.reused + self.reparsed + self.failed
    }
}

impl fmt::Display for ScanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} new, {} cached", self.added, self.reused)?;
        if self.reparsed > 0 {
            write!(f, ", {} changed", self.reparsed)?;
        }
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        write!(f, " ({} total)", self.total())
    }
}
