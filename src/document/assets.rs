//! Embedded media extraction.
//!
//! Every parse of a `.docx` gets its own media directory under
//! `<output>/public/images/`, named `<slug>-<suffix>` where the suffix is
//! freshly random. Two parses of the same document never write into the same
//! directory, even before the content cache has had a chance to dedupe them.
//!
//! Extraction is best-effort per entry: a media part that can't be read or
//! written is logged and skipped, and the rest of the document still parses.
//! Graphics whose media was skipped simply have no entry in the lookup.

use super::DocumentError;
use super::docx::DocxPackage;
use crate::slug::slugify_text;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

/// Output-relative root for extracted media directories.
pub const IMAGES_ROOT: &str = "public/images";

/// Characters of the random suffix appended to each media directory.
const SUFFIX_LEN: usize = 8;

/// Result of extracting one document's media.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedAssets {
    /// Site-absolute directory (`/public/images/<slug>-<suffix>`), or empty
    /// when the document has no media.
    pub directory: String,
    /// Relationship id → extracted file basename.
    pub files: BTreeMap<String, String>,
}

impl ExtractedAssets {
    /// The `src` for an inline graphic, if its media was extracted.
    pub fn src_for(&self, rel_id: &str) -> Option<String> {
        self.files
            .get(rel_id)
            .map(|file| format!("{}/{}", self.directory, file))
    }
}

/// A fresh `<slug>-<random>` directory name for a document key.
pub fn asset_dir_name(key: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let slug = slugify_text(key);
    let suffix = &suffix[..SUFFIX_LEN];
    if slug.is_empty() {
        suffix.to_string()
    } else {
        format!("{slug}-{suffix}")
    }
}

/// Extract all `word/media/*` parts into a new directory under
/// `<output_root>/public/images/` and map image relationships to them.
///
/// Nothing is created on disk when the package has no media.
pub fn extract_assets<R: Read + Seek>(
    package: &mut DocxPackage<R>,
    key: &str,
    output_root: &Path,
) -> Result<ExtractedAssets, DocumentError> {
    let media = package.media_parts();
    if media.is_empty() {
        return Ok(ExtractedAssets::default());
    }

    let dir_name = asset_dir_name(key);
    let target_dir = output_root.join(IMAGES_ROOT).join(&dir_name);
    fs::create_dir_all(&target_dir)?;

    // part name → basename, for parts that made it to disk
    let mut written: HashMap<String, String> = HashMap::new();
    for part in media {
        let Some(basename) = part.rsplit('/').next().filter(|b| !b.is_empty()) else {
            continue;
        };
        let basename = basename.to_string();
        let bytes = match package.read_part(&part) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%part, error = %e, "skipping unreadable media");
                continue;
            }
        };
        if let Err(e) = fs::write(target_dir.join(&basename), bytes) {
            warn!(%part, error = %e, "skipping media that could not be written");
            continue;
        }
        debug!(%part, dir = %dir_name, "extracted media");
        written.insert(part, basename);
    }

    let files = package
        .image_relationships()?
        .into_iter()
        .filter_map(|rel| written.get(&rel.part).map(|b| (rel.id, b.clone())))
        .collect();

    Ok(ExtractedAssets {
        directory: format!("/{IMAGES_ROOT}/{dir_name}"),
        files,
    })
}
