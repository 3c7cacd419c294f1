//! End-to-end: init → scan → generate through the public library API.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::TempDir;
use wordflow::cache::{CACHE_FILENAME, ContentCache};
use wordflow::context::BuildContext;
use wordflow::{generate, project, scan};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn write_docx(path: &Path, title: &str, body_xml: &str) {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default();
    let parts = [
        (
            "word/document.xml".to_string(),
            format!(r#"<?xml version="1.0"?><w:document xmlns:w="{W_NS}"><w:body>{body_xml}</w:body></w:document>"#),
        ),
        (
            "word/styles.xml".to_string(),
            format!(
                r#"<?xml version="1.0"?><w:styles xmlns:w="{W_NS}"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style></w:styles>"#
            ),
        ),
        (
            "docProps/core.xml".to_string(),
            format!(
                r#"<?xml version="1.0"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/"><dc:title>{title}</dc:title><dcterms:created>2024-03-04T09:00:00Z</dcterms:created></cp:coreProperties>"#
            ),
        ),
    ];
    for (name, content) in parts {
        zip.start_file(name, opts).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    let bytes = zip.finish().unwrap().into_inner();
    fs::write(path, bytes).unwrap();
}

fn para(style: Option<&str>, text: &str) -> String {
    let ppr = style
        .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{s}"/></w:pPr>"#))
        .unwrap_or_default();
    format!("<w:p>{ppr}<w:r><w:t>{text}</w:t></w:r></w:p>")
}

fn setup_theme(ctx: &BuildContext) {
    let theme = ctx.theme_dir();
    fs::create_dir_all(theme.join("assets")).unwrap();
    fs::write(theme.join("home.html"), "<h1>[[name]]</h1>[[body]]").unwrap();
    fs::write(
        theme.join("post.html"),
        "<h1>[[title]]</h1><time>[[display_date]]</time>[[body]]",
    )
    .unwrap();
    fs::write(theme.join("theme.toml"), "[snippets]\npost = \"<a href='[[url]]'>[[title]]</a>\"\n").unwrap();
    fs::write(theme.join("assets/site.css"), "body{}").unwrap();
}

#[test]
fn init_scan_generate_produces_site() {
    let tmp = TempDir::new().unwrap();
    project::init(tmp.path()).unwrap();
    let ctx = BuildContext::load(tmp.path()).unwrap();
    setup_theme(&ctx);

    let body = format!(
        "{}<w:tbl><w:tr><w:tc><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>b</w:t></w:r></w:p></w:tc></w:tr></w:tbl>{}",
        para(Some("Heading2"), "Intro"),
        para(None, "Outro")
    );
    write_docx(&ctx.input_dir().join("post/Café Déjà Vu.docx"), "Café Déjà Vu!", &body);
    write_docx(&ctx.input_dir().join("page/About.docx"), "About", &para(None, "me"));
    fs::write(ctx.input_dir().join("misplaced.docx"), "x").unwrap();

    let mut cache = ContentCache::load(&ctx.root);
    let report = scan::scan(&ctx, &mut cache).unwrap();
    cache.save(&ctx.root).unwrap();

    assert_eq!(report.stats.added, 2);
    assert_eq!(report.misplaced.len(), 1);

    let gen_report = generate::generate(&ctx, &cache).unwrap();
    let out = ctx.output_dir();

    let post = fs::read_to_string(out.join("post/cafe-deja-vu.html")).unwrap();
    assert_eq!(
        post,
        "<h1>Café Déjà Vu!</h1><time>March 04, 2024</time><h2>Intro</h2><table><tr><td>a</td><td>b</td></tr></table><p>Outro</p>"
    );
    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert_eq!(index, "<h1>author</h1><a href='/post/cafe-deja-vu.html'>Café Déjà Vu!</a>");

    // no page.html in the theme
    assert_eq!(gen_report.skipped.len(), 1);
    assert!(out.join("public/assets/site.css").exists());
    assert!(out.join(CACHE_FILENAME).exists());
    assert!(tmp.path().join(CACHE_FILENAME).exists());
}

#[test]
fn second_run_reuses_cache_from_disk() {
    let tmp = TempDir::new().unwrap();
    project::init(tmp.path()).unwrap();
    let ctx = BuildContext::load(tmp.path()).unwrap();
    write_docx(&ctx.input_dir().join("post/one.docx"), "One", &para(None, "1"));

    let mut first = ContentCache::load(&ctx.root);
    scan::scan(&ctx, &mut first).unwrap();
    first.save(&ctx.root).unwrap();

    let mut second = ContentCache::load(&ctx.root);
    let report = scan::scan(&ctx, &mut second).unwrap();

    assert_eq!(report.stats.reused, 1);
    assert_eq!(report.stats.added, 0);
    assert_eq!(first, second);
}

#[test]
fn clearcontent_forces_full_reparse() {
    let tmp = TempDir::new().unwrap();
    project::init(tmp.path()).unwrap();
    let ctx = BuildContext::load(tmp.path()).unwrap();
    write_docx(&ctx.input_dir().join("post/one.docx"), "One", &para(None, "1"));

    let mut cache = ContentCache::load(&ctx.root);
    scan::scan(&ctx, &mut cache).unwrap();
    cache.save(&ctx.root).unwrap();

    project::clear_content(&ctx).unwrap();

    let mut cache = ContentCache::load(&ctx.root);
    assert!(cache.is_empty());
    let report = scan::scan(&ctx, &mut cache).unwrap();
    assert_eq!(report.stats.added, 1);
}
