//! Terminal and tile dimensions

/// Terminal grid dimensions
pub const TERMINAL_ROWS: usize = 24;
pub const TERMINAL_COLS: usize = 80;

/// Dungeon map dimensions (the map occupies rows 1..=21 of the terminal)
pub const MAP_ROWS: usize = 21;
pub const MAP_COLS: usize = 79;

/// Size of one rendered cell in pixels
pub const CELL_WIDTH: u32 = 8;
pub const CELL_HEIGHT: u32 = 16;

/// Rendered image size in pixels
pub const IMAGE_WIDTH: u32 = TERMINAL_COLS as u32 * CELL_WIDTH;
pub const IMAGE_HEIGHT: u32 = TERMINAL_ROWS as u32 * CELL_HEIGHT;

/// Number of tty colours (8 dark + 8 bright)
pub const NUM_COLORS: usize = 16;

/// Number of character codes covered by the glyph atlas
pub const NUM_GLYPHS: usize = 256;
