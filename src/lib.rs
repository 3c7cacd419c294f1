//! # WordFlow
//!
//! A static site generator for people who write in a word processor. Drop
//! `.docx` files (or markdown) into one directory per content type, pick a
//! theme, and get a plain HTML site.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      source/  →  generated_output.json   (documents → content records)
//! 2. Generate  records  →  out/                    (theme templates → HTML)
//! ```
//!
//! Scan parses each document once: the OOXML body is walked block by block,
//! paragraph styles are mapped to HTML tags, and embedded images are extracted
//! next to the output. The result is a [`ContentRecord`](types::ContentRecord)
//! per document, kept in a JSON cache so later runs only reparse documents
//! whose content changed.
//!
//! Generate fills the active theme's templates with record fields and writes
//! one page per record plus a listing page for posts.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the input tree and fills the content cache |
//! | [`document`] | `.docx`/markdown → HTML body, media extraction, date resolution |
//! | [`style`] | Paragraph style + formatting → HTML tag and inline CSS |
//! | [`slug`] | Title/filename → URL-safe ASCII slug |
//! | [`cache`] | Content cache persistence and content hashing |
//! | [`generate`] | Stage 2: page rendering, listing page, theme asset copy |
//! | [`template`] | Theme template loading and `[[placeholder]]` substitution |
//! | [`context`] | Per-run build context (root + configuration) |
//! | [`config`] | Layered `config.toml` loading and validation |
//! | [`project`] | `init`, `clear` and `clearcontent` commands |
//! | [`types`] | Records and enums shared between stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Unknown Styles Fail the Document
//!
//! Every paragraph style must map to a tag. A document using a style outside
//! the table is reported and skipped rather than rendered with a guessed tag;
//! the rest of the site still builds.
//!
//! ## Content-Hashed Cache
//!
//! Records are reused only while the source file's SHA-256 matches, so edits
//! show up on the next build without wiping the cache.
//!
//! ## One Placeholder Syntax
//!
//! Templates use `[[name]]` only, substituted in a single pass. Inserted
//! values are never rescanned.

pub mod cache;
pub mod config;
pub mod context;
pub mod document;
pub mod generate;
pub mod output;
pub mod project;
pub mod scan;
pub mod slug;
pub mod style;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
