//! Background colours from map-glyph display flags
//!
//! Live environments report a bitfield per map cell describing how the
//! glyph there is displayed (a pet, a corpse, an object pile, ...). These
//! flags are turned into background colours so the image shows what the
//! curses interface would highlight.

use bitflags::bitflags;
use ndarray::ArrayView2;

use crate::color::Color;
use crate::consts::{MAP_COLS, MAP_ROWS, TERMINAL_COLS, TERMINAL_ROWS};
use crate::error::{Field, RenderError};
use crate::observation::RgbGrid;

bitflags! {
    /// Map glyph display flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpecialFlags: u8 {
        const CORPSE = 0x01;
        const INVIS = 0x02;
        const DETECT = 0x04;
        const PET = 0x08;
        const RIDDEN = 0x10;
        const STATUE = 0x20;
        const OBJPILE = 0x40;
        const BW_LAVA = 0x80;
    }
}

/// Flags in the order they win when several are set.
const PRIORITY: [(SpecialFlags, Color); 8] = [
    (SpecialFlags::CORPSE, Color::new(0x00, 0x00, 0xaa)),
    (SpecialFlags::INVIS, Color::new(0x33, 0x33, 0x33)),
    (SpecialFlags::DETECT, Color::new(0x33, 0x33, 0x33)),
    (SpecialFlags::PET, Color::new(0xff, 0xff, 0xff)),
    (SpecialFlags::RIDDEN, Color::new(0x33, 0x33, 0x33)),
    (SpecialFlags::STATUE, Color::new(0x33, 0x33, 0x33)),
    (SpecialFlags::OBJPILE, Color::new(0x33, 0x33, 0x33)),
    (SpecialFlags::BW_LAVA, Color::new(0x33, 0x00, 0x00)),
];

impl SpecialFlags {
    /// Background for a cell with these flags.
    pub fn background(self) -> Color {
        PRIORITY
            .iter()
            .find(|(flag, _)| self.contains(*flag))
            .map(|(_, color)| *color)
            .unwrap_or(Color::BLACK)
    }
}

/// Build a background override from a specials grid.
///
/// A 21x79 map grid is placed on the terminal the way the tty draws the map:
/// one message row above, two status rows below and one spare column on the
/// right, all with the default background. A 24x80 grid is used as is.
pub fn specials_background(specials: ArrayView2<'_, u8>) -> Result<RgbGrid, RenderError> {
    let (row_offset, col_offset) = match specials.dim() {
        (MAP_ROWS, MAP_COLS) => (1, 0),
        (TERMINAL_ROWS, TERMINAL_COLS) => (0, 0),
        _ => {
            return Err(RenderError::ShapeMismatch {
                field: Field::Specials,
                expected: vec![MAP_ROWS, MAP_COLS],
                found: specials.shape().to_vec(),
            });
        }
    };
    let (rows, cols) = specials.dim();

    Ok(RgbGrid::from_fn(|row, col| {
        let (Some(r), Some(c)) = (row.checked_sub(row_offset), col.checked_sub(col_offset)) else {
            return Color::BLACK;
        };
        if r >= rows || c >= cols {
            return Color::BLACK;
        }
        SpecialFlags::from_bits_retain(specials[[r, c]]).background()
    }))
}
