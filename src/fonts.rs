use crate::error::{Error, Result};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use std::path::Path;
use std::sync::Arc;
use ttf_parser::{Face, GlyphId};

/// Advance used for characters the font has no glyph for, as a fraction of
/// the font size.
const MISSING_GLYPH_ADVANCE: f32 = 0.56;

/// Raw font bytes plus the unscaled metrics needed for layout. Cloning is
/// cheap; the bytes are shared.
#[derive(Debug, Clone)]
pub struct FontData {
    bytes: Arc<[u8]>,
    index: u32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
}

impl FontData {
    /// Parse the first face in `bytes`; fails when the data is not a font.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_index(bytes, 0)
    }

    pub fn from_bytes_with_index(bytes: Vec<u8>, index: u32) -> Result<Self> {
        let face = Face::parse(&bytes, index)?;
        let units_per_em = face.units_per_em().max(1);
        let ascender = face.ascender();
        let descender = face.descender();
        Ok(Self {
            bytes: Arc::from(bytes),
            index,
            units_per_em,
            ascender,
            descender,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Look up a system font. `families` is a CSS-style comma separated list;
    /// generic names (`serif`, `sans-serif`, `monospace`) are honored.
    pub fn from_system(families: &str) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        let mut generics: Vec<Family<'static>> = Vec::new();
        for part in families.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => generics.push(Family::Serif),
                "sans-serif" | "system-ui" => generics.push(Family::SansSerif),
                "monospace" => generics.push(Family::Monospace),
                "cursive" => generics.push(Family::Cursive),
                "fantasy" => generics.push(Family::Fantasy),
                _ => names.push(raw.to_string()),
            }
        }
        let mut query_families: Vec<Family<'_>> =
            names.iter().map(|name| Family::Name(name.as_str())).collect();
        query_families.extend(generics);
        if query_families.is_empty() {
            query_families.push(Family::SansSerif);
        }

        let mut db = Database::new();
        db.load_system_fonts();
        let query = Query {
            families: &query_families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db
            .query(&query)
            .ok_or_else(|| Error::FontNotFound(families.to_string()))?;
        let loaded = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| Error::FontNotFound(families.to_string()))?;
        Self::from_bytes_with_index(loaded.0, loaded.1)
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub(crate) fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.bytes, self.index).ok()
    }

    /// Resolve this font at `size`.
    pub fn scaled(&self, size: f32) -> ScaledFace {
        ScaledFace {
            font: self.clone(),
            size,
            scale: size / self.units_per_em as f32,
        }
    }
}

/// A glyph with its pen position relative to the start of the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedGlyph {
    pub id: Option<GlyphId>,
    pub x: f32,
}

#[derive(Debug, Clone)]
pub struct ScaledFace {
    font: FontData,
    size: f32,
    scale: f32,
}

impl ScaledFace {
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Scale factor from font units to canvas units.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn font(&self) -> &FontData {
        &self.font
    }

    pub fn ascent(&self) -> f32 {
        self.font.ascender as f32 * self.scale
    }

    /// Distance below the baseline, as a positive number.
    pub fn descent(&self) -> f32 {
        -(self.font.descender as f32) * self.scale
    }

    pub fn line_height(&self) -> f32 {
        self.ascent() + self.descent()
    }

    /// Lay out `text` on a single line; returns the glyphs and the advance
    /// width of the run.
    pub fn layout(&self, text: &str) -> (Vec<PositionedGlyph>, f32) {
        let fallback = self.size * MISSING_GLYPH_ADVANCE;
        let face = self.font.face();
        let mut glyphs = Vec::with_capacity(text.len());
        let mut pen = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let id = face.as_ref().and_then(|f| f.glyph_index(ch));
            let advance = match (face.as_ref(), id) {
                (Some(f), Some(glyph)) => f.glyph_hor_advance(glyph).unwrap_or(0) as f32 * self.scale,
                _ => fallback,
            };
            glyphs.push(PositionedGlyph { id, x: pen });
            pen += advance;
        }
        (glyphs, pen.max(0.0))
    }

    pub fn measure(&self, text: &str) -> (f32, f32) {
        let (_, width) = self.layout(text);
        (width, self.line_height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_a_font_error() {
        let err = FontData::from_bytes(b"definitely not a font".to_vec()).unwrap_err();
        assert!(matches!(err, Error::FontParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = FontData::from_file(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
