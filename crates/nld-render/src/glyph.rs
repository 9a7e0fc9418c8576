//! Glyph atlas
//!
//! One 8x16 bitmap per character code, built from the 8x8 `font8x8` tables
//! with every row doubled. Row `y` of a glyph is a byte whose bit `x` is set
//! when pixel `(x, y)` belongs to the character.
//!
//! Codes 0xa0..=0xff are drawn as Latin-1, not as the IBM (CP437) line and
//! block graphics that NetHack's high-bit tty symsets use. The default ASCII
//! symset only emits codes below 0x80.

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};

use crate::consts::{CELL_HEIGHT, NUM_GLYPHS};

/// Bitmap rows of a single rendered cell.
pub type GlyphBitmap = [u8; CELL_HEIGHT as usize];

const BLANK: GlyphBitmap = [0; CELL_HEIGHT as usize];

/// Bitmaps for character codes 0..=255.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    glyphs: Box<[GlyphBitmap; NUM_GLYPHS]>,
}

impl GlyphAtlas {
    pub fn new() -> Self {
        let mut glyphs = Box::new([BLANK; NUM_GLYPHS]);
        for (code, glyph) in glyphs.iter_mut().enumerate() {
            let ch = char::from(represent_char(code as u8));
            if let Some(rows) = lookup(ch) {
                for (y, row) in glyph.iter_mut().enumerate() {
                    *row = rows[y / 2];
                }
            }
        }
        Self { glyphs }
    }

    /// Bitmap for a character code, after the curses-style substitutions of
    /// [`represent_char`].
    pub fn glyph(&self, code: u8) -> &GlyphBitmap {
        &self.glyphs[code as usize]
    }

    /// Whether the code draws any pixels at all.
    pub fn is_blank(&self, code: u8) -> bool {
        self.glyph(code).iter().all(|row| *row == 0)
    }
}

impl Default for GlyphAtlas {
    fn default() -> Self {
        Self::new()
    }
}

/// Change the representation of certain characters to their curses forms.
///
/// NUL is shown as a space and boulders (`` ` ``) as `0`.
pub fn represent_char(code: u8) -> u8 {
    match code {
        0 => b' ',
        b'`' => b'0',
        c => c,
    }
}

fn lookup(ch: char) -> Option<[u8; 8]> {
    match ch as u32 {
        0x20..=0x7e => BASIC_FONTS.get(ch),
        0xa0..=0xff => LATIN_FONTS.get(ch),
        // C0/C1 control codes and DEL have no visible form
        _ => None,
    }
}
