//! Paragraph style → HTML tag + inline CSS mapping.
//!
//! A Word paragraph carries two kinds of presentation information:
//!
//! 1. A **named style** (`Heading 1`, `List Bullet`, `Intense Quote`, ...)
//!    which decides the HTML element.
//! 2. **Direct formatting** set explicitly on the paragraph or its runs
//!    (alignment, indents, line spacing, font size, bold/italic, underline,
//!    color) which becomes an inline `style` attribute.
//!
//! Only attributes that are explicitly present in the document produce a CSS
//! declaration. An attribute the author never touched is `None` here and is
//! omitted from the output entirely, so the theme's stylesheet stays in charge
//! of defaults.
//!
//! Style names are matched case-insensitively with whitespace ignored, so
//! both the display name (`"Heading 1"`) and the style id (`"Heading1"`)
//! resolve. A style outside the table is an error: there is no safe tag to
//! guess, and silently emitting `<p>` would hide broken documents.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error("unmapped paragraph style '{0}'")]
    Unmapped(String),
}

/// Style-name → tag table. Keys are pre-normalized (lowercase, no spaces).
const STYLE_TAGS: &[(&str, &str)] = &[
    ("title", "h1"),
    ("subtitle", "h2"),
    ("heading1", "h1"),
    ("heading2", "h2"),
    ("heading3", "h3"),
    ("heading4", "h4"),
    ("heading5", "h5"),
    ("heading6", "h6"),
    ("normal", "p"),
    ("bodytext", "p"),
    ("nospacing", "p"),
    ("listparagraph", "li"),
    ("listnumber", "li"),
    ("listbullet", "li"),
    ("emphasis", "em"),
    ("intenseemphasis", "strong"),
    ("strong", "strong"),
    ("quote", "blockquote"),
    ("intensequote", "q"),
];

/// Paragraph alignment (`w:jc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Parse an OOXML `w:jc/@w:val`. Unknown values are treated as unset.
    pub fn from_ooxml(val: &str) -> Option<Self> {
        match val {
            "left" | "start" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            "both" | "distribute" | "lowKashida" | "mediumKashida" | "highKashida" => {
                Some(Self::Justify)
            }
            _ => None,
        }
    }

    fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }
}

/// Line spacing: proportional (`lineRule="auto"`) or a fixed height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineSpacing {
    /// Multiple of single spacing, e.g. `1.5`.
    Multiple(f32),
    /// Fixed line height in points.
    Points(f32),
}

/// Underline is tri-state once set: plain, explicitly off, or a named style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Underline {
    Single,
    Off,
    /// Word underline style such as `double`, `dotted`, `wave`.
    Styled(String),
}

impl Underline {
    /// Parse `w:u/@w:val`; a missing value means a plain underline.
    pub fn from_ooxml(val: Option<&str>) -> Self {
        match val {
            None | Some("single") | Some("words") => Self::Single,
            Some("none") => Self::Off,
            Some(other) => Self::Styled(other.to_string()),
        }
    }

    fn write_css(&self, css: &mut String) {
        match self {
            Self::Single => css.push_str("text-decoration-line: underline;"),
            Self::Off => css.push_str("text-decoration-line: none;"),
            Self::Styled(name) => {
                css.push_str("text-decoration-line: underline;");
                css.push_str(&format!("text-decoration-style: {};", css_decoration_style(name)));
            }
        }
    }
}

/// Map a Word underline style name to the closest `text-decoration-style`.
fn css_decoration_style(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower.starts_with("double") || lower == "wavydouble" {
        "double"
    } else if lower.starts_with("dotted") {
        "dotted"
    } else if lower.contains("dash") {
        "dashed"
    } else if lower.starts_with("wav") {
        "wavy"
    } else {
        "solid"
    }
}

/// Explicit formatting collected from a paragraph and its runs.
///
/// Every field is `None` unless the document sets it directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formatting {
    pub alignment: Option<Alignment>,
    /// Left indent in points.
    pub left_indent: Option<f32>,
    /// Right indent in points.
    pub right_indent: Option<f32>,
    pub line_spacing: Option<LineSpacing>,
    /// Font size in points.
    pub font_size: Option<f32>,
    pub italic: Option<bool>,
    pub bold: Option<bool>,
    pub underline: Option<Underline>,
    /// Hex RGB without the leading `#`, e.g. `"FF0000"`.
    pub color: Option<String>,
}

impl Formatting {
    /// Render the explicitly-set attributes as CSS declarations.
    ///
    /// Declarations appear in a fixed order so identical formatting always
    /// yields an identical string.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        if let Some(align) = self.alignment {
            css.push_str(&format!("text-align: {};", align.as_css()));
        }
        if let Some(pt) = self.left_indent {
            css.push_str(&format!("margin-left: {}pt;", pt));
        }
        if let Some(pt) = self.right_indent {
            css.push_str(&format!("margin-right: {}pt;", pt));
        }
        match self.line_spacing {
            Some(LineSpacing::Multiple(m)) => css.push_str(&format!("line-height: {};", m)),
            Some(LineSpacing::Points(pt)) => css.push_str(&format!("line-height: {}pt;", pt)),
            None => {}
        }
        if let Some(pt) = self.font_size {
            css.push_str(&format!("font-size: {}pt;", pt));
        }
        if self.italic == Some(true) {
            css.push_str("font-style: italic;");
        }
        if self.bold == Some(true) {
            css.push_str("font-weight: bold;");
        }
        if let Some(underline) = &self.underline {
            underline.write_css(&mut css);
        }
        if let Some(color) = &self.color {
            css.push_str(&format!("color: #{};", color));
        }
        css
    }
}

/// The element and inline style chosen for one paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledTag {
    pub tag: &'static str,
    pub css: String,
}

impl StyledTag {
    /// Wrap already-escaped inner HTML in this element.
    pub fn wrap(&self, inner_html: &str) -> String {
        if self.css.is_empty() {
            format!("<{tag}>{inner_html}</{tag}>", tag = self.tag)
        } else {
            format!(
                "<{tag} style=\"{css}\">{inner_html}</{tag}>",
                tag = self.tag,
                css = self.css
            )
        }
    }
}

fn normalize_style_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Look up the HTML tag for a paragraph style name.
pub fn tag_for_style(style_name: &str) -> Result<&'static str, StyleError> {
    let key = normalize_style_name(style_name);
    STYLE_TAGS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, tag)| *tag)
        .ok_or_else(|| StyleError::Unmapped(style_name.to_string()))
}

/// Map a paragraph's style name and explicit formatting to a tag + CSS.
pub fn map_style(style_name: &str, formatting: &Formatting) -> Result<StyledTag, StyleError> {
    Ok(StyledTag {
        tag: tag_for_style(style_name)?,
        css: formatting.to_css(),
    })
}
