// File: src/render/fonts.rs
// Text measurement and drawing seam, plus the ab_glyph-backed production impl.
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::fs;
use std::path::Path;

/// The four faces the layout uses. Each maps to one file in the font dir.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub face: Face,
    pub size: f32,
}

impl TextStyle {
    pub const fn new(face: Face, size: f32) -> Self {
        Self { face, size }
    }
}

/// Measuring and drawing text under a style. The renderer depends only on
/// this seam; production supplies [`FontBook`], tests substitute fixed
/// metrics.
pub trait TextPainter: Send + Sync {
    /// Rendered width and line height of `text`, in pixels.
    fn measure(&self, style: TextStyle, text: &str) -> (f32, f32);

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn paint(
        &self,
        canvas: &mut RgbImage,
        style: TextStyle,
        text: &str,
        x: f32,
        y: f32,
        color: Rgb<u8>,
    );
}

/// Production text backend: the Noto faces loaded once at startup and
/// shared read-only across concurrent renders.
pub struct FontBook {
    regular: FontVec,
    bold: FontVec,
    italic: FontVec,
    bold_italic: FontVec,
}

impl FontBook {
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            regular: load_font(&dir.join("NotoSans-Regular.ttf"))?,
            bold: load_font(&dir.join("NotoSans-Bold.ttf"))?,
            italic: load_font(&dir.join("NotoSans-Italic.ttf"))?,
            bold_italic: load_font(&dir.join("NotoSans-BoldItalic.ttf"))?,
        })
    }

    fn font(&self, face: Face) -> &FontVec {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Italic => &self.italic,
            Face::BoldItalic => &self.bold_italic,
        }
    }
}

fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read font '{}'", path.display()))?;
    FontVec::try_from_vec(bytes)
        .with_context(|| format!("Invalid font file '{}'", path.display()))
}

impl TextPainter for FontBook {
    fn measure(&self, style: TextStyle, text: &str) -> (f32, f32) {
        let font = self.font(style.face);
        let scale = PxScale::from(style.size);
        let (width, _) = text_size(scale, font, text);
        // Line height comes from the scaled face, keeping vertical flow
        // stable across runs with and without descenders.
        let height = font.as_scaled(scale).height();
        (width as f32, height)
    }

    fn paint(
        &self,
        canvas: &mut RgbImage,
        style: TextStyle,
        text: &str,
        x: f32,
        y: f32,
        color: Rgb<u8>,
    ) {
        let font = self.font(style.face);
        draw_text_mut(
            canvas,
            color,
            x as i32,
            y as i32,
            PxScale::from(style.size),
            font,
            text,
        );
    }
}
