//! Shared types persisted in the content cache and consumed by generation.
//!
//! A [`ContentRecord`] is written once during scan, serialized to the cache
//! file, and read back by the page assembler. It must stay serializable in
//! both directions.

use crate::config::{AuthorConfig, SiteSection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which kind of source file the generator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Word-processor documents (`.docx`).
    #[default]
    Docx,
    /// Lightweight markup (`.md`).
    Md,
}

impl InputMode {
    /// File extension matched during scan, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Md => "md",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Site and author fields copied into every record at creation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteFields {
    pub nickname: String,
    pub name: String,
    pub email: String,
    pub about: String,
    pub domain: String,
    pub theme: String,
}

impl SiteFields {
    pub fn from_config(author: &AuthorConfig, site: &SiteSection) -> Self {
        Self {
            nickname: author.nickname.clone(),
            name: author.name.clone(),
            email: author.email.clone(),
            about: author.about.clone(),
            domain: site.domain.clone(),
            theme: site.theme.clone(),
        }
    }

    /// Insert these fields into a template field map.
    pub fn extend_fields(&self, fields: &mut BTreeMap<String, String>) {
        fields.insert("nickname".into(), self.nickname.clone());
        fields.insert("name".into(), self.name.clone());
        fields.insert("email".into(), self.email.clone());
        fields.insert("about".into(), self.about.clone());
        fields.insert("domain".into(), self.domain.clone());
        fields.insert("theme".into(), self.theme.clone());
    }
}

/// One parsed source document, ready for template rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Source filename without extension. Unique across the cache.
    pub key: String,
    /// Category from the containing directory (`post`, `page`, ...).
    #[serde(rename = "type")]
    pub doc_type: String,
    pub title: String,
    /// Rendered HTML fragment, block order preserved.
    pub body: String,
    /// ISO `YYYY-MM-DD`, so string order is chronological order.
    pub date: String,
    /// Human-readable form of `date`, e.g. `March 04, 2024`.
    pub display_date: String,
    /// Output-relative directory holding extracted media, e.g.
    /// `/public/images/my-post-3f2a9c1e`. Empty when nothing was extracted.
    #[serde(default)]
    pub asset_directory: String,
    /// SHA-256 of the source file at parse time.
    #[serde(default)]
    pub source_hash: String,
    #[serde(flatten)]
    pub site: SiteFields,
}

impl ContentRecord {
    /// URL slug for this record's page. Never empty.
    pub fn slug(&self) -> String {
        crate::slug::page_slug(&self.key)
    }

    /// Site-relative URL of the rendered page, e.g. `/post/hello.html`.
    pub fn url(&self) -> String {
        format!("/{}/{}.html", self.doc_type, self.slug())
    }

    /// Flatten into the placeholder → value map used by templates.
    pub fn template_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        self.site.extend_fields(&mut fields);
        fields.insert("key".into(), self.key.clone());
        fields.insert("file".into(), self.key.clone());
        fields.insert("type".into(), self.doc_type.clone());
        fields.insert("title".into(), self.title.clone());
        fields.insert("body".into(), self.body.clone());
        fields.insert("date".into(), self.date.clone());
        fields.insert("display_date".into(), self.display_date.clone());
        fields.insert("imagedir".into(), self.asset_directory.clone());
        fields.insert("slug".into(), self.slug());
        fields.insert("url".into(), self.url());
        fields
    }
}
