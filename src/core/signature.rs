use crate::domain::ports::SignatureRenderer;
use crate::utils::error::{CertError, Result};
use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use std::path::Path;

pub const SIGNATURE_WIDTH: u32 = 150;
pub const SIGNATURE_HEIGHT: u32 = 20;
pub const TEXT_OFFSET: (i32, i32) = (10, 4);
pub const DEFAULT_FONT_SIZE: f32 = 13.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// 以固定字型把姓名畫在 150x20 的白底畫布上
pub struct FontRenderer {
    font: Font<'static>,
    scale: Scale,
}

impl FontRenderer {
    pub fn from_file<P: AsRef<Path>>(path: P, size_px: f32) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| CertError::FontError {
            message: format!("cannot read font '{}': {}", path.display(), e),
        })?;
        tracing::debug!("Loaded font {} ({} bytes)", path.display(), data.len());
        Self::from_bytes(data, size_px)
    }

    pub fn from_bytes(data: Vec<u8>, size_px: f32) -> Result<Self> {
        let font = Font::try_from_vec(data).ok_or_else(|| CertError::FontError {
            message: "font data is not a valid TrueType/OpenType font".to_string(),
        })?;

        Ok(Self {
            font,
            scale: Scale::uniform(size_px),
        })
    }
}

impl SignatureRenderer for FontRenderer {
    fn render(&self, name: &str) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(SIGNATURE_WIDTH, SIGNATURE_HEIGHT, BACKGROUND);

        // the offset addresses the top of the ascender, not the baseline
        let v_metrics = self.font.v_metrics(self.scale);
        let origin = point(
            TEXT_OFFSET.0 as f32,
            TEXT_OFFSET.1 as f32 + v_metrics.ascent,
        );

        for glyph in self.font.layout(name, self.scale, origin) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let x = gx as i32 + bb.min.x;
                let y = gy as i32 + bb.min.y;
                if x < 0 || y < 0 || x >= SIGNATURE_WIDTH as i32 || y >= SIGNATURE_HEIGHT as i32 {
                    return;
                }
                let shade = (255.0 * (1.0 - coverage.clamp(0.0, 1.0))).round() as u8;
                let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                pixel.0 = pixel.0.map(|c| c.min(shade));
            });
        }

        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_FONTS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    fn system_font() -> Option<FontRenderer> {
        SYSTEM_FONTS
            .iter()
            .find(|p| Path::new(p).exists())
            .and_then(|p| FontRenderer::from_file(p, DEFAULT_FONT_SIZE).ok())
    }

    #[test]
    fn test_missing_font_file_is_font_error() {
        let err = FontRenderer::from_file("/definitely/not/here/arial.ttf", 13.0)
            .err()
            .unwrap();
        assert!(matches!(err, CertError::FontError { .. }));
    }

    #[test]
    fn test_invalid_font_bytes_is_font_error() {
        let err = FontRenderer::from_bytes(b"not a font".to_vec(), 13.0)
            .err()
            .unwrap();
        assert!(matches!(err, CertError::FontError { .. }));
    }

    #[test]
    fn test_render_draws_dark_text_on_white_canvas() {
        let Some(renderer) = system_font() else {
            eprintln!("no system font available, skipping");
            return;
        };

        let image = renderer.render("Ivan Petrov");

        assert_eq!(image.dimensions(), (SIGNATURE_WIDTH, SIGNATURE_HEIGHT));
        // left margin stays blank
        for y in 0..SIGNATURE_HEIGHT {
            for x in 0..8 {
                assert_eq!(*image.get_pixel(x, y), BACKGROUND);
            }
        }
        assert!(image.pixels().any(|p| p.0[0] < 64));
    }

    #[test]
    fn test_render_clips_long_names() {
        let Some(renderer) = system_font() else {
            eprintln!("no system font available, skipping");
            return;
        };

        let image = renderer.render(&"Wolfeschlegelsteinhausenbergerdorff ".repeat(4));
        assert_eq!(image.dimensions(), (SIGNATURE_WIDTH, SIGNATURE_HEIGHT));
    }

    #[test]
    fn test_render_empty_name_is_blank() {
        let Some(renderer) = system_font() else {
            eprintln!("no system font available, skipping");
            return;
        };

        let image = renderer.render("");
        assert!(image.pixels().all(|p| *p == BACKGROUND));
    }
}
