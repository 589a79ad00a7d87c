//! Stroke fonts used to build extruded text.
//!
//! A stroke font describes each glyph as a set of line segments in em units
//! (baseline at y = 0, cap height at y = 1). The document format is XML:
//!
//! ```xml
//! <font name="block" stroke="0.14" advance="0.8" line-height="1.4">
//!     <glyph char="N">
//!         <stroke from="0 0" to="0 1"/>
//!     </glyph>
//! </font>
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use glam::Vec2;
use log::{debug, info};
use roxmltree::{Document, Node};
use thiserror::Error;

const BUILTIN_FONT: &str = include_str!("../assets/fonts/block.xml");

/// Errors raised while loading or parsing a stroke font.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("unable to read font {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("font document must have a <font> root element")]
    MissingRoot,
    #[error("invalid value {value:?} for attribute `{attribute}` on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
    #[error("<glyph> is missing a single-character `char` attribute")]
    InvalidGlyphChar,
    #[error("font does not define any glyphs")]
    Empty,
}

/// Where a font is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FontSource {
    /// The block font compiled into the crate.
    #[default]
    Builtin,
    File(PathBuf),
}

/// Straight segment of a glyph outline centerline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub from: Vec2,
    pub to: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub advance: f32,
    pub strokes: Vec<Stroke>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeFont {
    pub name: String,
    /// Stroke thickness in em units.
    pub stroke_width: f32,
    /// Advance used for glyphs without their own and for unknown characters.
    pub advance: f32,
    pub line_height: f32,
    glyphs: HashMap<char, Glyph>,
}

impl StrokeFont {
    /// Parses a font document.
    pub fn from_xml(xml: &str) -> Result<Self, FontError> {
        let document = Document::parse(xml)?;
        let root = document.root_element();
        if !root.has_tag_name("font") {
            return Err(FontError::MissingRoot);
        }

        let name = root.attribute("name").unwrap_or("unnamed").to_string();
        let stroke_width = parse_attr(&root, "font", "stroke", 0.14)?;
        let advance = parse_attr(&root, "font", "advance", 0.8)?;
        let line_height = parse_attr(&root, "font", "line-height", 1.4)?;

        let mut glyphs = HashMap::new();
        for node in root.children().filter(|n| n.has_tag_name("glyph")) {
            let ch = glyph_char(&node)?;
            let glyph_advance = parse_attr(&node, "glyph", "advance", advance)?;
            let strokes = node
                .children()
                .filter(|n| n.has_tag_name("stroke"))
                .map(|stroke| {
                    Ok(Stroke {
                        from: parse_point(&stroke, "from")?,
                        to: parse_point(&stroke, "to")?,
                    })
                })
                .collect::<Result<Vec<_>, FontError>>()?;
            glyphs.insert(
                ch,
                Glyph {
                    advance: glyph_advance,
                    strokes,
                },
            );
        }

        if glyphs.is_empty() {
            return Err(FontError::Empty);
        }
        debug!("parsed font {name} with {} glyphs", glyphs.len());

        Ok(Self {
            name,
            stroke_width,
            advance,
            line_height,
            glyphs,
        })
    }

    /// The block font shipped with the crate.
    pub fn builtin() -> Result<Self, FontError> {
        Self::from_xml(BUILTIN_FONT)
    }

    /// Looks up a glyph, falling back to the uppercase form.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs
            .get(&ch)
            .or_else(|| self.glyphs.get(&ch.to_ascii_uppercase()))
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

/// Loads a font. Scene assembly awaits this before building text meshes.
pub async fn load_font(source: &FontSource) -> Result<StrokeFont, FontError> {
    let font = match source {
        FontSource::Builtin => StrokeFont::builtin()?,
        FontSource::File(path) => {
            let xml = std::fs::read_to_string(path).map_err(|source| FontError::Io {
                path: path.clone(),
                source,
            })?;
            StrokeFont::from_xml(&xml)?
        }
    };
    info!("loaded font {} ({} glyphs)", font.name, font.glyph_count());
    Ok(font)
}

fn glyph_char(node: &Node<'_, '_>) -> Result<char, FontError> {
    let value = node.attribute("char").ok_or(FontError::InvalidGlyphChar)?;
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(FontError::InvalidGlyphChar),
    }
}

fn parse_attr(
    node: &Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
    default: f32,
) -> Result<f32, FontError> {
    let Some(value) = node.attribute(attribute) else {
        return Ok(default);
    };
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|number| number.is_finite() && *number >= 0.0)
        .ok_or_else(|| FontError::InvalidAttribute {
            element,
            attribute,
            value: value.to_string(),
        })
}

fn parse_point(node: &Node<'_, '_>, attribute: &'static str) -> Result<Vec2, FontError> {
    let invalid = || FontError::InvalidAttribute {
        element: "stroke",
        attribute,
        value: node.attribute(attribute).unwrap_or_default().to_string(),
    };
    let value = node.attribute(attribute).ok_or_else(invalid)?;
    let numbers = value
        .split_whitespace()
        .map(|component| component.parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    match numbers.as_slice() {
        [x, y] if x.is_finite() && y.is_finite() => Ok(Vec2::new(*x, *y)),
        _ => Err(invalid()),
    }
}
