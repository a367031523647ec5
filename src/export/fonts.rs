//! Font lookup and glyph outlining for text export.
//!
//! Faces are keyed by lowercase family name plus bold/italic. Loading a
//! directory infers the key from the file name: `Roboto-BoldItalic.ttf`
//! registers family `roboto`, bold, italic. Lookups fall back from the
//! requested style to the family's regular face.

use std::collections::HashMap;
use std::path::Path;

use rusttype::{Font, OutlineBuilder, Scale, point};

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("font directory unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a usable TrueType/OpenType font: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    family: String,
    bold: bool,
    italic: bool,
}

impl FontKey {
    fn new(family: &str, bold: bool, italic: bool) -> Self {
        Self { family: family.trim().to_lowercase(), bold, italic }
    }
}

/// Fonts available for outlining.
#[derive(Default)]
pub struct FontBook {
    faces: HashMap<FontKey, Font<'static>>,
}

impl FontBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a face from raw font bytes.
    ///
    /// # Errors
    ///
    /// `Invalid` when the bytes are not a parsable font.
    pub fn insert_bytes(&mut self, family: &str, bold: bool, italic: bool, bytes: Vec<u8>) -> Result<(), FontError> {
        let font = Font::try_from_vec(bytes).ok_or_else(|| FontError::Invalid(family.to_string()))?;
        self.faces.insert(FontKey::new(family, bold, italic), font);
        Ok(())
    }

    /// Load every `.ttf`/`.otf` file directly inside `dir`. Unparsable files
    /// are logged and skipped.
    ///
    /// # Errors
    ///
    /// `Io` when the directory cannot be listed.
    pub fn load_dir(dir: &Path) -> Result<Self, FontError> {
        let mut book = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()).filter(|_| is_font) else {
                continue;
            };
            let (family, bold, italic) = parse_face_name(stem);
            let loaded = std::fs::read(&path)
                .map_err(FontError::from)
                .and_then(|bytes| book.insert_bytes(&family, bold, italic, bytes));
            if let Err(e) = loaded {
                tracing::warn!(path = %path.display(), error = %e, "skipping font file");
            }
        }
        tracing::info!(dir = %dir.display(), faces = book.len(), "fonts loaded");
        Ok(book)
    }

    /// The requested face, else the family's regular face.
    #[must_use]
    pub fn get(&self, family: &str, bold: bool, italic: bool) -> Option<&Font<'static>> {
        self.faces.get(&FontKey::new(family, bold, italic)).or_else(|| self.faces.get(&FontKey::new(family, false, false)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Split `Family-Style` into family and bold/italic flags.
pub(crate) fn parse_face_name(stem: &str) -> (String, bool, bool) {
    let Some((family, style)) = stem.rsplit_once('-') else {
        return (stem.to_string(), false, false);
    };
    let style = style.to_lowercase();
    let bold = style.contains("bold");
    let italic = style.contains("italic") || style.contains("oblique");
    if bold || italic || style == "regular" {
        (family.to_string(), bold, italic)
    } else {
        (stem.to_string(), false, false)
    }
}

// =============================================================================
// OUTLINING
// =============================================================================

/// Collects glyph outlines as SVG path data.
#[derive(Default)]
struct PathBuilder {
    d: String,
}

impl OutlineBuilder for PathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.d.push_str(&format!("M{x:.2} {y:.2} "));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.d.push_str(&format!("L{x:.2} {y:.2} "));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.d.push_str(&format!("Q{x1:.2} {y1:.2} {x:.2} {y:.2} "));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.d.push_str(&format!("C{x1:.2} {y1:.2} {x2:.2} {y2:.2} {x:.2} {y:.2} "));
    }

    fn close(&mut self) {
        self.d.push_str("Z ");
    }
}

/// Horizontal advance of `line` at `size` pixels.
#[must_use]
pub fn line_width(font: &Font<'_>, line: &str, size: f32) -> f32 {
    let scale = Scale::uniform(size);
    font.layout(line, scale, point(0.0, 0.0))
        .last()
        .map_or(0.0, |g| g.position().x + g.unpositioned().h_metrics().advance_width)
}

/// SVG path data for `line` with its baseline origin at `(x, baseline)`.
#[must_use]
pub fn outline_line(font: &Font<'_>, line: &str, size: f32, x: f32, baseline: f32) -> String {
    let mut builder = PathBuilder::default();
    for glyph in font.layout(line, Scale::uniform(size), point(x, baseline)) {
        glyph.build_outline(&mut builder);
    }
    builder.d.trim_end().to_string()
}

/// Distance from the top of a line box to its baseline.
#[must_use]
pub fn ascent(font: &Font<'_>, size: f32) -> f32 {
    font.v_metrics(Scale::uniform(size)).ascent
}
