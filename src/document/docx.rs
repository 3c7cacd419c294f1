//! OOXML (`.docx`) package reading.
//!
//! A `.docx` file is a zip archive of XML parts. The ones used here:
//!
//! | Part | Content |
//! |------|---------|
//! | `word/document.xml` | Body: paragraphs (`w:p`) and tables (`w:tbl`) in order |
//! | `word/styles.xml` | Style id → display name (`Heading1` → `heading 1`) |
//! | `word/_rels/document.xml.rels` | Relationship id → target part (`rId5` → `media/image1.png`) |
//! | `docProps/core.xml` | Title and creation timestamp |
//! | `word/media/*` | Embedded images |
//!
//! The body is read with a streaming `quick-xml` walk into a flat list of
//! [`Block`]s. Nested structure inside table cells is flattened to text;
//! text boxes and `mc:Fallback` duplicates are skipped.

use super::DocumentError;
use crate::style::{Alignment, Formatting, LineSpacing, Underline};
use chrono::{DateTime, NaiveDate};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const CORE_PART: &str = "docProps/core.xml";
const MEDIA_PREFIX: &str = "word/media/";
/// Upper bound on the buffer reserved from a part's declared size.
const READ_CAPACITY_LIMIT: u64 = 1 << 20;
const IMAGE_REL_SUFFIX: &str = "/image";

/// Style used for paragraphs that declare none and have no default in `styles.xml`.
pub const DEFAULT_STYLE: &str = "Normal";

/// One top-level block of the document body, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(TextBlock),
    Table(TableBlock),
}

/// A paragraph: styled text and/or inline graphics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    /// Resolved style display name (e.g. `heading 1`), or the raw id when
    /// `styles.xml` does not define it.
    pub style: String,
    /// Paragraph properties plus the run properties of the first text run.
    pub formatting: Formatting,
    pub text: String,
    /// Relationship ids of inline graphics (`a:blip/@r:embed`), in order.
    pub image_refs: Vec<String>,
}

/// A table flattened to plain cell text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableBlock {
    pub rows: Vec<Vec<String>>,
}

/// Metadata from `docProps/core.xml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub created: Option<NaiveDate>,
}

/// An image relationship from the document part.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRelationship {
    pub id: String,
    /// Package part name, e.g. `word/media/image1.png`.
    pub part: String,
}

/// An opened `.docx` package.
pub struct DocxPackage<R> {
    archive: ZipArchive<R>,
}

impl DocxPackage<File> {
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> DocxPackage<R> {
    pub fn new(reader: R) -> Result<Self, DocumentError> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// Read a part as UTF-8 text. `Ok(None)` if the part does not exist.
    fn read_text_part(&mut self, name: &str) -> Result<Option<String>, DocumentError> {
        let mut file = match self.archive.by_name(name) {
            Ok(f) => f,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(Some(content))
    }

    /// Read a binary part.
    pub fn read_part(&mut self, name: &str) -> Result<Vec<u8>, DocumentError> {
        let mut file = self.archive.by_name(name)?;
        // header sizes are untrusted
        let mut bytes = Vec::with_capacity(file.size().min(READ_CAPACITY_LIMIT) as usize);
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Part names of every embedded media file (`word/media/*`), sorted.
    pub fn media_parts(&self) -> Vec<String> {
        let mut parts: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| name.starts_with(MEDIA_PREFIX) && !name.ends_with('/'))
            .map(str::to_string)
            .collect();
        parts.sort();
        parts
    }

    /// Image relationships of the main document part.
    pub fn image_relationships(&mut self) -> Result<Vec<ImageRelationship>, DocumentError> {
        let Some(xml) = self.read_text_part(DOCUMENT_RELS_PART)? else {
            return Ok(Vec::new());
        };
        parse_image_relationships(&xml)
    }

    /// Title and creation date from the core properties part.
    pub fn core_properties(&mut self) -> Result<CoreProperties, DocumentError> {
        match self.read_text_part(CORE_PART)? {
            Some(xml) => parse_core_properties(&xml),
            None => Ok(CoreProperties::default()),
        }
    }

    /// Walk the body into ordered blocks with style names resolved.
    pub fn blocks(&mut self) -> Result<Vec<Block>, DocumentError> {
        let styles = match self.read_text_part(STYLES_PART)? {
            Some(xml) => parse_styles(&xml)?,
            None => StyleTable::default(),
        };
        let document = self
            .read_text_part(DOCUMENT_PART)?
            .ok_or_else(|| DocumentError::MissingPart(DOCUMENT_PART.to_string()))?;
        parse_body(&document, &styles)
    }
}

// ============================================================================
// XML helpers
// ============================================================================

/// Value of attribute `key` (qualified name, e.g. `b"w:val"`).
fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Read an OOXML on/off property such as `<w:b/>` or `<w:i w:val="0"/>`.
fn toggle(e: &BytesStart) -> bool {
    !matches!(
        attr(e, b"w:val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

fn twips_to_points(val: &str) -> Option<f32> {
    val.parse::<f32>().ok().map(|t| t / 20.0)
}

/// Resolve a relationship target against the `word/` directory.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = vec!["word"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

fn parse_image_relationships(xml: &str) -> Result<Vec<ImageRelationship>, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut rels = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let is_image = attr(&e, b"Type").is_some_and(|t| t.ends_with(IMAGE_REL_SUFFIX));
                let external = attr(&e, b"TargetMode").is_some_and(|m| m == "External");
                if let (true, false, Some(id), Some(target)) =
                    (is_image, external, attr(&e, b"Id"), attr(&e, b"Target"))
                {
                    rels.push(ImageRelationship {
                        id,
                        part: resolve_target(&target),
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rels)
}

fn parse_core_properties(xml: &str) -> Result<CoreProperties, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut props = CoreProperties::default();
    let mut current: Option<Vec<u8>> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => current = Some(e.name().as_ref().to_vec()),
            Event::End(_) => current = None,
            Event::Text(t) => {
                let text = t.unescape()?;
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match current.as_deref() {
                    Some(b"dc:title") => props.title = Some(text.to_string()),
                    Some(b"dcterms:created") => props.created = parse_w3c_date(text),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(props)
}

/// Parse a W3CDTF timestamp (`2024-03-04T10:00:00Z`) or bare date.
fn parse_w3c_date(text: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok())
}

// ============================================================================
// Styles
// ============================================================================

#[derive(Debug, Default)]
struct StyleTable {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleTable {
    fn display_name(&self, style_id: Option<&str>) -> String {
        let id = style_id.or(self.default_paragraph.as_deref());
        match id {
            Some(id) => self.names.get(id).cloned().unwrap_or_else(|| id.to_string()),
            None => DEFAULT_STYLE.to_string(),
        }
    }
}

fn parse_styles(xml: &str) -> Result<StyleTable, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut table = StyleTable::default();
    let mut current_id: Option<String> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:style" => {
                let id = attr(&e, b"w:styleId");
                let is_paragraph = attr(&e, b"w:type").as_deref() == Some("paragraph");
                let is_default = attr(&e, b"w:default").is_some_and(|d| d == "1" || d == "true");
                if is_paragraph && is_default {
                    table.default_paragraph = id.clone();
                }
                current_id = id;
            }
            Event::Empty(e) if e.name().as_ref() == b"w:name" => {
                if let (Some(id), Some(name)) = (&current_id, attr(&e, b"w:val")) {
                    table.names.insert(id.clone(), name);
                }
            }
            Event::End(e) if e.name().as_ref() == b"w:style" => current_id = None,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(table)
}

// ============================================================================
// Body walk
// ============================================================================

/// Elements whose whole subtree is ignored.
const SKIPPED: &[&[u8]] = &[
    b"w:txbxContent",
    b"mc:Fallback",
    b"w:pPrChange",
    b"w:rPrChange",
];

#[derive(Default)]
struct Paragraph {
    style_id: Option<String>,
    formatting: Formatting,
    run_captured: bool,
    text: String,
    image_refs: Vec<String>,
}

#[derive(Default)]
struct BodyWalker {
    blocks: Vec<Block>,
    skip_depth: usize,
    table_depth: usize,
    table: Option<TableBlock>,
    cell: Option<Vec<String>>,
    paragraph: Option<Paragraph>,
    run: Formatting,
    in_ppr: bool,
    in_ppr_rpr: bool,
    in_rpr: bool,
    in_text: bool,
}

impl BodyWalker {
    fn open(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = Some(TableBlock::default());
                }
            }
            b"w:tr" if self.table_depth == 1 => {
                if let Some(table) = &mut self.table {
                    table.rows.push(Vec::new());
                }
            }
            b"w:tc" if self.table_depth == 1 => self.cell = Some(Vec::new()),
            b"w:p" => self.paragraph = Some(Paragraph::default()),
            b"w:pPr" => self.in_ppr = true,
            b"w:rPr" if self.in_ppr => self.in_ppr_rpr = true,
            b"w:rPr" => self.in_rpr = true,
            b"w:r" => self.run = Formatting::default(),
            b"w:t" => self.in_text = true,
            b"w:tab" if !self.in_ppr => self.push_text("\t"),
            b"w:br" | b"w:cr" => self.push_text("\n"),
            b"a:blip" => self.push_image(attr(e, b"r:embed")),
            b"v:imagedata" => self.push_image(attr(e, b"r:id")),
            _ if self.in_ppr && !self.in_ppr_rpr => self.paragraph_property(e),
            _ if self.in_rpr => self.run_property(e),
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"w:tbl" => {
                if self.table_depth == 1
                    && let Some(table) = self.table.take()
                {
                    self.blocks.push(Block::Table(table));
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            b"w:tc" if self.table_depth == 1 => {
                if let (Some(cell), Some(table)) = (self.cell.take(), &mut self.table)
                    && let Some(row) = table.rows.last_mut()
                {
                    row.push(cell.join("\n"));
                }
            }
            b"w:p" => self.finish_paragraph(),
            b"w:pPr" => self.in_ppr = false,
            b"w:rPr" if self.in_ppr_rpr => self.in_ppr_rpr = false,
            b"w:rPr" => self.in_rpr = false,
            b"w:t" => self.in_text = false,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if !self.in_text || text.is_empty() {
            return;
        }
        if let Some(p) = &mut self.paragraph
            && !p.run_captured
        {
            let run = &self.run;
            p.formatting.font_size = run.font_size;
            p.formatting.italic = run.italic;
            p.formatting.bold = run.bold;
            p.formatting.underline = run.underline.clone();
            p.formatting.color = run.color.clone();
            p.run_captured = true;
        }
        self.push_text(text);
    }

    fn push_text(&mut self, text: &str) {
        if let Some(p) = &mut self.paragraph {
            p.text.push_str(text);
        }
    }

    fn push_image(&mut self, rel_id: Option<String>) {
        if let (Some(p), Some(id)) = (&mut self.paragraph, rel_id) {
            p.image_refs.push(id);
        }
    }

    fn paragraph_property(&mut self, e: &BytesStart) {
        let Some(p) = &mut self.paragraph else {
            return;
        };
        let f = &mut p.formatting;
        match e.name().as_ref() {
            b"w:pStyle" => p.style_id = attr(e, b"w:val"),
            b"w:jc" => f.alignment = attr(e, b"w:val").and_then(|v| Alignment::from_ooxml(&v)),
            b"w:ind" => {
                let left = attr(e, b"w:left").or_else(|| attr(e, b"w:start"));
                let right = attr(e, b"w:right").or_else(|| attr(e, b"w:end"));
                f.left_indent = left.as_deref().and_then(twips_to_points);
                f.right_indent = right.as_deref().and_then(twips_to_points);
            }
            b"w:spacing" => {
                if let Some(line) = attr(e, b"w:line").and_then(|v| v.parse::<f32>().ok()) {
                    f.line_spacing = Some(match attr(e, b"w:lineRule").as_deref() {
                        Some("exact") | Some("atLeast") => LineSpacing::Points(line / 20.0),
                        _ => LineSpacing::Multiple(line / 240.0),
                    });
                }
            }
            _ => {}
        }
    }

    fn run_property(&mut self, e: &BytesStart) {
        let run = &mut self.run;
        match e.name().as_ref() {
            b"w:b" => run.bold = Some(toggle(e)),
            b"w:i" => run.italic = Some(toggle(e)),
            b"w:u" => run.underline = Some(Underline::from_ooxml(attr(e, b"w:val").as_deref())),
            b"w:color" => {
                run.color = attr(e, b"w:val").filter(|v| !v.eq_ignore_ascii_case("auto"));
            }
            b"w:sz" => {
                run.font_size = attr(e, b"w:val")
                    .and_then(|v| v.parse::<f32>().ok())
                    .map(|half_points| half_points / 2.0);
            }
            _ => {}
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(p) = self.paragraph.take() else {
            return;
        };
        if let Some(cell) = &mut self.cell {
            cell.push(p.text);
        } else if self.table_depth == 0 {
            self.blocks.push(Block::Text(TextBlock {
                style: p.style_id.unwrap_or_default(),
                formatting: p.formatting,
                text: p.text,
                image_refs: p.image_refs,
            }));
        }
    }
}

fn parse_body(xml: &str, styles: &StyleTable) -> Result<Vec<Block>, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut walker = BodyWalker::default();
    loop {
        let event = reader.read_event()?;
        if walker.skip_depth > 0 {
            match event {
                Event::Start(_) => walker.skip_depth += 1,
                Event::End(_) => walker.skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }
        match event {
            Event::Start(e) if SKIPPED.contains(&e.name().as_ref()) => walker.skip_depth = 1,
            Event::Start(e) => walker.open(&e),
            Event::Empty(e) => {
                walker.open(&e);
                walker.close(e.name().as_ref());
            }
            Event::End(e) => walker.close(e.name().as_ref()),
            Event::Text(t) => walker.text(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    // Style ids were collected raw; resolve them to display names now.
    for block in &mut walker.blocks {
        if let Block::Text(text) = block {
            let id = (!text.style.is_empty()).then_some(text.style.as_str());
            text.style = styles.display_name(id);
        }
    }
    Ok(walker.blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{DocxBuilder, paragraph, styled_paragraph, table};
    use std::io::Cursor;

    fn blocks_of(builder: DocxBuilder) -> Vec<Block> {
        let mut pkg = DocxPackage::new(Cursor::new(builder.build())).unwrap();
        pkg.blocks().unwrap()
    }

    #[test]
    fn paragraphs_and_tables_keep_source_order() {
        let blocks = blocks_of(
            DocxBuilder::new()
                .body(&paragraph("Intro"))
                .body(&table(&[&["a", "b"], &["c", "d"]]))
                .body(&paragraph("Outro")),
        );
        assert_eq!(blocks.len(), 3);
        assert!(matches!(&blocks[0], Block::Text(t) if t.text == "Intro"));
        assert!(
            matches!(&blocks[1], Block::Table(t) if t.rows == vec![vec!["a", "b"], vec!["c", "d"]])
        );
        assert!(matches!(&blocks[2], Block::Text(t) if t.text == "Outro"));
    }

    #[test]
    fn style_ids_resolve_through_styles_part() {
        let blocks = blocks_of(
            DocxBuilder::new()
                .style("Heading1", "heading 1")
                .body(&styled_paragraph("Heading1", "", "Title")),
        );
        let Block::Text(t) = &blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(t.style, "heading 1");
    }

    #[test]
    fn missing_style_falls_back_to_default_paragraph() {
        let blocks = blocks_of(DocxBuilder::new().body(&paragraph("plain")));
        let Block::Text(t) = &blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(t.style, DEFAULT_STYLE);
    }

    #[test]
    fn paragraph_and_run_formatting_captured() {
        let ppr = r#"<w:jc w:val="center"/><w:ind w:left="720"/><w:spacing w:line="360" w:lineRule="auto"/>"#;
        let xml = format!(
            r#"<w:p><w:pPr>{ppr}</w:pPr><w:r><w:rPr><w:b/><w:i w:val="0"/><w:u w:val="double"/><w:color w:val="FF0000"/><w:sz w:val="28"/></w:rPr><w:t>Styled</w:t></w:r></w:p>"#
        );
        let blocks = blocks_of(DocxBuilder::new().body(&xml));
        let Block::Text(t) = &blocks[0] else {
            panic!("expected text block");
        };
        let f = &t.formatting;
        assert_eq!(f.alignment, Some(Alignment::Center));
        assert_eq!(f.left_indent, Some(36.0));
        assert_eq!(f.right_indent, None);
        assert_eq!(f.line_spacing, Some(LineSpacing::Multiple(1.5)));
        assert_eq!(f.bold, Some(true));
        assert_eq!(f.italic, Some(false));
        assert_eq!(f.underline, Some(Underline::Styled("double".into())));
        assert_eq!(f.color.as_deref(), Some("FF0000"));
        assert_eq!(f.font_size, Some(14.0));
    }

    #[test]
    fn paragraph_mark_run_properties_are_ignored() {
        let xml = r#"<w:p><w:pPr><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#;
        let blocks = blocks_of(DocxBuilder::new().body(xml));
        let Block::Text(t) = &blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(t.formatting, Formatting::default());
    }

    #[test]
    fn inline_graphics_collect_relationship_ids() {
        let xml = r#"<w:p><w:r><w:drawing><wp:inline><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="rId7"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#;
        let blocks = blocks_of(DocxBuilder::new().body(xml));
        let Block::Text(t) = &blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(t.image_refs, vec!["rId7"]);
        assert!(t.text.is_empty());
    }

    #[test]
    fn fallback_content_is_not_duplicated() {
        let xml = r#"<w:p><w:r><mc:AlternateContent><mc:Choice><w:drawing><a:blip r:embed="rId1"/></w:drawing></mc:Choice><mc:Fallback><w:pict><v:imagedata r:id="rId1"/></w:pict></mc:Fallback></mc:AlternateContent></w:r></w:p>"#;
        let blocks = blocks_of(DocxBuilder::new().body(xml));
        let Block::Text(t) = &blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(t.image_refs, vec!["rId1"]);
    }

    #[test]
    fn nested_table_text_is_flattened_into_cell() {
        let inner = table(&[&["inner"]]);
        let xml = format!(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>outer</w:t></w:r></w:p>{inner}</w:tc></w:tr></w:tbl>"
        );
        let blocks = blocks_of(DocxBuilder::new().body(&xml));
        assert_eq!(blocks.len(), 1);
        let Block::Table(t) = &blocks[0] else {
            panic!("expected table block");
        };
        assert_eq!(t.rows, vec![vec!["outer\ninner".to_string()]]);
    }

    #[test]
    fn tabs_and_breaks_become_whitespace() {
        let xml = r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>"#;
        let blocks = blocks_of(DocxBuilder::new().body(xml));
        let Block::Text(t) = &blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(t.text, "a\tb\nc");
    }

    #[test]
    fn escaped_text_is_unescaped() {
        let blocks = blocks_of(DocxBuilder::new().body(&paragraph("Fish &amp; Chips")));
        let Block::Text(t) = &blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(t.text, "Fish & Chips");
    }

    #[test]
    fn image_relationships_resolved_to_parts() {
        let mut pkg = DocxPackage::new(Cursor::new(
            DocxBuilder::new()
                .image("rId3", "image1.png", b"png-bytes")
                .build(),
        ))
        .unwrap();
        let rels = pkg.image_relationships().unwrap();
        assert_eq!(
            rels,
            vec![ImageRelationship {
                id: "rId3".into(),
                part: "word/media/image1.png".into()
            }]
        );
        assert_eq!(pkg.media_parts(), vec!["word/media/image1.png"]);
    }

    #[test]
    fn core_properties_title_and_created() {
        let mut pkg = DocxPackage::new(Cursor::new(
            DocxBuilder::new()
                .core("My Title", "2023-11-05T09:30:00Z")
                .build(),
        ))
        .unwrap();
        let props = pkg.core_properties().unwrap();
        assert_eq!(props.title.as_deref(), Some("My Title"));
        assert_eq!(props.created, NaiveDate::from_ymd_opt(2023, 11, 5));
    }

    #[test]
    fn missing_core_properties_are_empty() {
        let mut pkg = DocxPackage::new(Cursor::new(DocxBuilder::new().build())).unwrap();
        assert_eq!(pkg.core_properties().unwrap(), CoreProperties::default());
    }

    #[test]
    fn resolve_target_handles_relative_and_absolute() {
        assert_eq!(resolve_target("media/a.png"), "word/media/a.png");
        assert_eq!(resolve_target("../media/a.png"), "media/a.png");
        assert_eq!(resolve_target("/word/media/a.png"), "word/media/a.png");
    }

    #[test]
    fn missing_document_part_is_error() {
        let mut pkg = DocxPackage::new(Cursor::new(DocxBuilder::new().without_document().build()))
            .unwrap();
        assert!(matches!(pkg.blocks(), Err(DocumentError::MissingPart(_))));
    }

    #[test]
    fn inflated_declared_size_does_not_drive_allocation() {
        let data = b"not really a png".to_vec();
        let mut bytes = DocxBuilder::new()
            .image("rId5", "image1.png", &data)
            .body(&paragraph("x"))
            .build();

        // Rewrite the central directory's uncompressed size for the media entry.
        let name = b"word/media/image1.png";
        let entry = bytes
            .windows(4)
            .enumerate()
            .filter(|(_, w)| *w == b"PK\x01\x02")
            .map(|(i, _)| i)
            .find(|&i| bytes[i + 46..].starts_with(name))
            .unwrap();
        bytes[entry + 24..entry + 28].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());

        let mut pkg = DocxPackage::new(Cursor::new(bytes)).unwrap();
        if let Ok(read) = pkg.read_part("word/media/image1.png") {
            assert_eq!(read, data);
        }
    }
}
