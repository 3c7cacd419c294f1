//! URL-safe identifiers for titles and filenames.
//!
//! Every output path in the generated site is derived from a slug: record
//! pages land at `out/<type>/<slug>.html`, extracted media at
//! `out/public/images/<slug><suffix>/`. Slugs are lowercase ASCII with
//! non-alphanumeric runs collapsed to a single `-`:
//!
//! - `"Café Déjà Vu!"` → `"cafe-deja-vu"`
//! - `"My_First Post"` → `"my-first-post"`
//! - `"Привет мир"` → `"privet-mir"`
//!
//! Non-ASCII text is transliterated first, so titles in any script still
//! produce a usable identifier.

use rslug::slugify;
use sha2::{Digest, Sha256};

/// Quotation marks dropped before slugifying so `"quoted"` titles don't
/// grow stray separators.
const QUOTE_MARKS: [char; 13] = [
    '\u{0027}', '\u{0022}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201B}',
    '\u{0060}', '\u{00AB}', '\u{00BB}', '\u{2039}', '\u{203A}',
];

/// Normalize arbitrary text into a slug.
///
/// Total over any input: an input with no alphanumeric content yields the
/// empty string. Idempotent: `slugify_text(&slugify_text(s)) == slugify_text(s)`.
pub fn slugify_text(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !QUOTE_MARKS.contains(c)).collect();
    let raw = slugify!(&stripped);
    normalize_ascii(&raw)
}

/// Slug for a page file name. Never empty: a key with no alphanumeric
/// content becomes `untitled-<first 8 hex digits of its SHA-256>`, so
/// distinct keys keep distinct pages.
pub fn page_slug(key: &str) -> String {
    let slug = slugify_text(key);
    if !slug.is_empty() {
        return slug;
    }
    let digest = format!("{:x}", Sha256::digest(key.as_bytes()));
    format!("untitled-{}", &digest[..8])
}

/// Collapse anything that isn't `[a-z0-9]` into single hyphens, trimming
/// both ends.
fn normalize_ascii(raw: &str) -> String {
    raw.to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
