//! Observation to image rendering
//!
//! Every terminal cell becomes an 8x16 tile: the background colour filled,
//! then the cell's glyph drawn in the foreground colour. The cursor cell gets
//! the palette's cursor background.

use image::{Rgb, RgbImage};

use crate::color::Color;
use crate::config::{IndexPolicy, RenderConfig};
use crate::consts::{CELL_HEIGHT, CELL_WIDTH, IMAGE_HEIGHT, IMAGE_WIDTH, NUM_COLORS, NUM_GLYPHS};
use crate::error::{Field, RenderError};
use crate::glyph::GlyphAtlas;
use crate::observation::{Observation, RgbGrid};

/// Caller-supplied colours replacing the palette lookup, e.g. saliency
/// overlays from [`crate::heatmap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub foreground: Option<RgbGrid>,
    pub background: Option<RgbGrid>,
}

impl Overrides {
    pub fn foreground(mut self, grid: RgbGrid) -> Self {
        self.foreground = Some(grid);
        self
    }

    pub fn background(mut self, grid: RgbGrid) -> Self {
        self.background = Some(grid);
        self
    }
}

/// Renders observations as RGB images.
///
/// Holds only immutable lookup tables, so one renderer can be shared between
/// threads.
#[derive(Debug, Clone)]
pub struct ImageRenderer {
    atlas: GlyphAtlas,
    config: RenderConfig,
}

impl ImageRenderer {
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            atlas: GlyphAtlas::new(),
            config,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Width and height of every rendered image.
    pub fn image_size(&self) -> (u32, u32) {
        (IMAGE_WIDTH, IMAGE_HEIGHT)
    }

    /// Render using the palette for both foreground and background.
    pub fn render(&self, obs: &Observation) -> Result<RgbImage, RenderError> {
        self.render_with(obs, &Overrides::default())
    }

    /// Render with optional per-cell colour overrides.
    ///
    /// The observation's colour grids are still checked against the palette
    /// when they are not overridden.
    pub fn render_with(
        &self,
        obs: &Observation,
        overrides: &Overrides,
    ) -> Result<RgbImage, RenderError> {
        let _span = tracing::debug_span!(
            "render",
            policy = %self.config.index_policy,
            fg_override = overrides.foreground.is_some(),
            bg_override = overrides.background.is_some()
        )
        .entered();

        let cursor = if self.config.highlight_cursor {
            obs.cursor().cell()
        } else {
            None
        };

        let mut image = RgbImage::new(IMAGE_WIDTH, IMAGE_HEIGHT);
        for ((row, col), &raw) in obs.chars().indexed_iter() {
            let code = self.char_code(row, col, raw)?;

            let fg = match &overrides.foreground {
                Some(grid) => grid.get(row, col),
                None => self.palette_color(Field::Colors, row, col, obs.colors()[[row, col]])?,
            };
            let mut bg = match &overrides.background {
                Some(grid) => grid.get(row, col),
                None => {
                    self.palette_color(Field::Background, row, col, obs.background()[[row, col]])?
                }
            };
            if cursor == Some((row, col)) {
                bg = self.config.palette.cursor;
            }

            self.paint_cell(&mut image, row, col, code, fg, bg);
        }
        Ok(image)
    }

    fn char_code(&self, row: usize, col: usize, raw: i32) -> Result<u8, RenderError> {
        match (u8::try_from(raw), self.config.index_policy) {
            (Ok(code), _) => Ok(code),
            (Err(_), IndexPolicy::Clamp) => Ok(raw.clamp(0, NUM_GLYPHS as i32 - 1) as u8),
            (Err(_), IndexPolicy::Strict) => Err(RenderError::InvalidIndex {
                field: Field::Chars,
                row,
                col,
                value: raw,
            }),
        }
    }

    fn palette_color(
        &self,
        field: Field,
        row: usize,
        col: usize,
        index: i32,
    ) -> Result<Color, RenderError> {
        let palette = &self.config.palette;
        match (palette.get(index), self.config.index_policy) {
            (Some(color), _) => Ok(color),
            (None, IndexPolicy::Clamp) => Ok(palette.colors[index.clamp(0, NUM_COLORS as i32 - 1) as usize]),
            (None, IndexPolicy::Strict) => Err(RenderError::InvalidIndex {
                field,
                row,
                col,
                value: index,
            }),
        }
    }

    fn paint_cell(&self, image: &mut RgbImage, row: usize, col: usize, code: u8, fg: Color, bg: Color) {
        let x0 = col as u32 * CELL_WIDTH;
        let y0 = row as u32 * CELL_HEIGHT;
        let (fg, bg): (Rgb<u8>, Rgb<u8>) = (fg.to_rgb(), bg.to_rgb());
        for (dy, &bits) in self.atlas.glyph(code).iter().enumerate() {
            for dx in 0..CELL_WIDTH {
                let on = (bits >> dx) & 1 == 1;
                image.put_pixel(x0 + dx, y0 + dy as u32, if on { fg } else { bg });
            }
        }
    }
}

impl Default for ImageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Cursor;

    #[test]
    fn test_renderer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ImageRenderer>();
    }

    #[test]
    fn test_blank_cell_is_background_only() {
        let renderer = ImageRenderer::new();
        let obs = Observation::blank().with_cursor(Cursor::new(10, 10)).unwrap();
        let img = renderer.render(&obs).unwrap();
        for y in 0..CELL_HEIGHT {
            for x in 0..CELL_WIDTH {
                assert_eq!(*img.get_pixel(x, y), Rgb([0, 0, 0]));
            }
        }
    }

    #[test]
    fn test_glyph_pixels_use_foreground() {
        let renderer = ImageRenderer::new();
        let obs = Observation::from_text(&["@"], 9, Cursor::new(5, 5)).unwrap();
        let img = renderer.render(&obs).unwrap();

        let mut lit = 0;
        for y in 0..CELL_HEIGHT {
            for x in 0..CELL_WIDTH {
                let px = *img.get_pixel(x, y);
                assert!(px == Rgb([0xff, 0, 0]) || px == Rgb([0, 0, 0]));
                if px == Rgb([0xff, 0, 0]) {
                    lit += 1;
                }
            }
        }
        assert!(lit > 0);
    }

    #[test]
    fn test_cursor_highlight_can_be_disabled() {
        let config = RenderConfig {
            highlight_cursor: false,
            ..RenderConfig::default()
        };
        let renderer = ImageRenderer::with_config(config);
        let img = renderer.render(&Observation::blank()).unwrap();
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 0]));
    }
}
