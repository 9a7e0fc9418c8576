//! Terminal-grid observations
//!
//! An [`Observation`] is one timestep of a tty: character codes, foreground
//! and background colour indices, and the cursor. Shapes are checked when the
//! value is built, so a constructed observation always matches the terminal.

use ndarray::{Array2, Array3, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::consts::{TERMINAL_COLS, TERMINAL_ROWS};
use crate::error::{Field, RenderError};

/// Cursor position on the terminal, `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub row: i32,
    pub col: i32,
}

impl Cursor {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Grid cell of the cursor, if it lies on the terminal.
    pub fn cell(&self) -> Option<(usize, usize)> {
        let row = usize::try_from(self.row).ok()?;
        let col = usize::try_from(self.col).ok()?;
        (row < TERMINAL_ROWS && col < TERMINAL_COLS).then_some((row, col))
    }
}

/// One tty snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    chars: Array2<i32>,
    colors: Array2<i32>,
    background: Array2<i32>,
    cursor: Cursor,
}

impl Observation {
    /// Build an observation, checking that every grid is 24x80 and that the
    /// cursor lies on the grid.
    pub fn new(
        chars: Array2<i32>,
        colors: Array2<i32>,
        background: Array2<i32>,
        cursor: Cursor,
    ) -> Result<Self, RenderError> {
        check_grid(Field::Chars, chars.view())?;
        check_grid(Field::Colors, colors.view())?;
        check_grid(Field::Background, background.view())?;
        if cursor.cell().is_none() {
            return Err(RenderError::CursorOutOfBounds {
                row: cursor.row,
                col: cursor.col,
            });
        }
        Ok(Self {
            chars,
            colors,
            background,
            cursor,
        })
    }

    /// A screen of blanks: NUL characters, colour 0 on background 0, cursor
    /// in the top-left corner.
    pub fn blank() -> Self {
        let grid = || Array2::zeros((TERMINAL_ROWS, TERMINAL_COLS));
        Self {
            chars: grid(),
            colors: grid(),
            background: grid(),
            cursor: Cursor::default(),
        }
    }

    /// Build from lines of text, one per row, drawn in `color` on background
    /// 0. Missing rows and columns are blank; extra text is cut off.
    pub fn from_text(lines: &[&str], color: i32, cursor: Cursor) -> Result<Self, RenderError> {
        let mut chars = Array2::zeros((TERMINAL_ROWS, TERMINAL_COLS));
        for (row, line) in lines.iter().take(TERMINAL_ROWS).enumerate() {
            for (col, byte) in line.bytes().take(TERMINAL_COLS).enumerate() {
                chars[[row, col]] = i32::from(byte);
            }
        }
        let colors = Array2::from_elem((TERMINAL_ROWS, TERMINAL_COLS), color);
        let background = Array2::zeros((TERMINAL_ROWS, TERMINAL_COLS));
        Self::new(chars, colors, background, cursor)
    }

    pub fn chars(&self) -> &Array2<i32> {
        &self.chars
    }

    pub fn colors(&self) -> &Array2<i32> {
        &self.colors
    }

    pub fn background(&self) -> &Array2<i32> {
        &self.background
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Replace the foreground colour grid, e.g. with values from a different
    /// colouring scheme.
    pub fn with_colors(mut self, colors: Array2<i32>) -> Result<Self, RenderError> {
        check_grid(Field::Colors, colors.view())?;
        self.colors = colors;
        Ok(self)
    }

    pub fn with_background(mut self, background: Array2<i32>) -> Result<Self, RenderError> {
        check_grid(Field::Background, background.view())?;
        self.background = background;
        Ok(self)
    }

    pub fn with_cursor(mut self, cursor: Cursor) -> Result<Self, RenderError> {
        if cursor.cell().is_none() {
            return Err(RenderError::CursorOutOfBounds {
                row: cursor.row,
                col: cursor.col,
            });
        }
        self.cursor = cursor;
        Ok(self)
    }

    /// The screen as text, one line per row, with trailing blanks trimmed.
    /// Codes that are not printable ASCII show as spaces.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(TERMINAL_ROWS * (TERMINAL_COLS + 1));
        for row in self.chars.rows() {
            let line: String = row
                .iter()
                .map(|&c| match u8::try_from(c) {
                    Ok(b) if b.is_ascii_graphic() => char::from(b),
                    _ => ' ',
                })
                .collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

fn check_grid(field: Field, grid: ArrayView2<'_, i32>) -> Result<(), RenderError> {
    if grid.dim() != (TERMINAL_ROWS, TERMINAL_COLS) {
        return Err(RenderError::ShapeMismatch {
            field,
            expected: vec![TERMINAL_ROWS, TERMINAL_COLS],
            found: grid.shape().to_vec(),
        });
    }
    Ok(())
}

/// Per-cell RGB colours covering the terminal, shape `[24, 80, 3]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbGrid(Array3<u8>);

impl RgbGrid {
    /// Wrap an RGB array, checking its shape. `field` names the array in the
    /// error when the shape is wrong.
    pub fn new(field: Field, rgb: Array3<u8>) -> Result<Self, RenderError> {
        if rgb.dim() != (TERMINAL_ROWS, TERMINAL_COLS, 3) {
            return Err(RenderError::ShapeMismatch {
                field,
                expected: vec![TERMINAL_ROWS, TERMINAL_COLS, 3],
                found: rgb.shape().to_vec(),
            });
        }
        Ok(Self(rgb))
    }

    pub fn filled(color: Color) -> Self {
        Self::from_fn(|_, _| color)
    }

    pub fn from_fn(mut f: impl FnMut(usize, usize) -> Color) -> Self {
        let mut rgb = Array3::zeros((TERMINAL_ROWS, TERMINAL_COLS, 3));
        for row in 0..TERMINAL_ROWS {
            for col in 0..TERMINAL_COLS {
                let color = f(row, col);
                rgb[[row, col, 0]] = color.r;
                rgb[[row, col, 1]] = color.g;
                rgb[[row, col, 2]] = color.b;
            }
        }
        Self(rgb)
    }

    pub fn get(&self, row: usize, col: usize) -> Color {
        Color::new(
            self.0[[row, col, 0]],
            self.0[[row, col, 1]],
            self.0[[row, col, 2]],
        )
    }

    pub fn set(&mut self, row: usize, col: usize, color: Color) {
        self.0[[row, col, 0]] = color.r;
        self.0[[row, col, 1]] = color.g;
        self.0[[row, col, 2]] = color.b;
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.0
    }

    pub fn into_array(self) -> Array3<u8> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_rejected() {
        let good = Array2::zeros((TERMINAL_ROWS, TERMINAL_COLS));
        let bad = Array2::zeros((TERMINAL_ROWS, TERMINAL_COLS - 1));
        let err = Observation::new(good.clone(), bad, good, Cursor::default()).unwrap_err();
        match err {
            RenderError::ShapeMismatch { field, found, .. } => {
                assert_eq!(field, Field::Colors);
                assert_eq!(found, vec![TERMINAL_ROWS, TERMINAL_COLS - 1]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cursor_bounds() {
        assert_eq!(Cursor::new(0, 0).cell(), Some((0, 0)));
        assert_eq!(Cursor::new(23, 79).cell(), Some((23, 79)));
        assert_eq!(Cursor::new(24, 0).cell(), None);
        assert_eq!(Cursor::new(0, 80).cell(), None);
        assert_eq!(Cursor::new(-1, 3).cell(), None);

        let obs = Observation::blank();
        assert!(matches!(
            obs.with_cursor(Cursor::new(5, 80)),
            Err(RenderError::CursorOutOfBounds { row: 5, col: 80 })
        ));
    }

    #[test]
    fn test_from_text_and_back() {
        let obs = Observation::from_text(&["Hello", "", "  @"], 7, Cursor::new(2, 2)).unwrap();
        assert_eq!(obs.chars()[[0, 0]], i32::from(b'H'));
        assert_eq!(obs.chars()[[2, 2]], i32::from(b'@'));
        assert_eq!(obs.colors()[[10, 10]], 7);
        assert!(obs.text().starts_with("Hello\n\n  @\n"));
    }

    #[test]
    fn test_rgb_grid_shape() {
        assert!(RgbGrid::new(Field::ForegroundOverride, Array3::zeros((24, 80, 3))).is_ok());
        assert!(matches!(
            RgbGrid::new(Field::BackgroundOverride, Array3::zeros((24, 80, 4))),
            Err(RenderError::ShapeMismatch { field: Field::BackgroundOverride, .. })
        ));

        let mut grid = RgbGrid::filled(Color::WHITE);
        grid.set(3, 4, Color::new(1, 2, 3));
        assert_eq!(grid.get(3, 4), Color::new(1, 2, 3));
        assert_eq!(grid.get(0, 0), Color::WHITE);
    }
}
