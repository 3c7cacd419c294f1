//! Shared test utilities for the wordflow test suite.
//!
//! Tests run against real `.docx` packages assembled in memory, so the parser
//! sees exactly the part layout Word produces rather than a mocked model.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let bytes = DocxBuilder::new()
//!     .style("Heading1", "heading 1")
//!     .image("rId5", "image1.png", b"...")
//!     .body(&styled_paragraph("Heading1", "", "Hello"))
//!     .body(&table(&[&["a", "b"]]))
//!     .build();
//! ```

use std::io::{Cursor, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" "#,
    r#"xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" "#,
    r#"xmlns:v="urn:schemas-microsoft-com:vml""#,
);

const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Builder for minimal but well-formed `.docx` packages.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    styles: Vec<(String, String)>,
    rels: Vec<(String, String)>,
    media: Vec<(String, Vec<u8>)>,
    core: Option<(String, String)>,
    omit_document: bool,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw body XML (one or more `w:p` / `w:tbl` elements).
    pub fn body(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Declare a paragraph style id with its display name.
    pub fn style(mut self, id: &str, name: &str) -> Self {
        self.styles.push((id.to_string(), name.to_string()));
        self
    }

    /// Embed `word/media/<filename>` and an image relationship pointing at it.
    pub fn image(mut self, rel_id: &str, filename: &str, bytes: &[u8]) -> Self {
        self.rels.push((rel_id.to_string(), format!("media/{filename}")));
        self.media.push((filename.to_string(), bytes.to_vec()));
        self
    }

    /// An image relationship whose target part is absent from the package.
    pub fn dangling_image_rel(mut self, rel_id: &str, filename: &str) -> Self {
        self.rels.push((rel_id.to_string(), format!("media/{filename}")));
        self
    }

    /// Set `dc:title` and `dcterms:created`.
    pub fn core(mut self, title: &str, created: &str) -> Self {
        self.core = Some((title.to_string(), created.to_string()));
        self
    }

    /// Leave out `word/document.xml`.
    pub fn without_document(mut self) -> Self {
        self.omit_document = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default();

        let mut put = |name: &str, data: &[u8]| {
            zip.start_file(name, opts).unwrap();
            zip.write_all(data).unwrap();
        };

        put("[Content_Types].xml", content_types().as_bytes());
        if !self.omit_document {
            let document = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {NAMESPACES}><w:body>{}<w:sectPr/></w:body></w:document>"#,
                self.body
            );
            put("word/document.xml", document.as_bytes());
        }
        put("word/styles.xml", styles_xml(&self.styles).as_bytes());
        put("word/_rels/document.xml.rels", rels_xml(&self.rels).as_bytes());
        for (filename, bytes) in &self.media {
            put(&format!("word/media/{filename}"), bytes);
        }
        if let Some((title, created)) = &self.core {
            put("docProps/core.xml", core_xml(title, created).as_bytes());
        }

        zip.finish().unwrap().into_inner()
    }

    /// Build and write the package to `path`.
    pub fn write_to(self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

fn content_types() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Default Extension="png" ContentType="image/png"/>"#,
        r#"</Types>"#
    )
    .to_string()
}

fn styles_xml(styles: &[(String, String)]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:styles {NAMESPACES}><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#
    );
    for (id, name) in styles {
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="{name}"/><w:basedOn w:val="Normal"/></w:style>"#
        ));
    }
    xml.push_str("</w:styles>");
    xml
}

fn rels_xml(rels: &[(String, String)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    xml.push_str(r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#);
    xml.push_str(r#"<Relationship Id="rIdLink" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>"#);
    for (id, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{IMAGE_REL_TYPE}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn core_xml(title: &str, created: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            r#"<dc:title>{title}</dc:title>"#,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>"#,
            r#"</cp:coreProperties>"#
        ),
        title = title,
        created = created
    )
}

/// A `Normal` paragraph with one text run.
pub fn paragraph(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}

/// A paragraph with an explicit style id and extra `w:pPr` children.
pub fn styled_paragraph(style_id: &str, ppr_extra: &str, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{style_id}"/>{ppr_extra}</w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#
    )
}

/// A table with one paragraph per cell.
pub fn table(rows: &[&[&str]]) -> String {
    let mut xml = String::from("<w:tbl><w:tblPr/>");
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in *row {
            xml.push_str("<w:tc><w:tcPr/>");
            xml.push_str(&paragraph(cell));
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

/// Write a markdown source file.
pub fn write_markdown(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
}
