//! nld-render: image rendering for NetHack terminal-grid observations
//!
//! Turns one tty snapshot (characters, foreground colours, background colours
//! and cursor) into an RGB image. Rendering is a pure function of its inputs;
//! no windows are opened and nothing is written to disk.

pub mod color;
pub mod config;
pub mod error;
pub mod glyph;
pub mod observation;
pub mod overlay;
pub mod renderer;
pub mod specials;

mod consts;

pub use color::{Color, Palette};
pub use config::{IndexPolicy, RenderConfig};
pub use consts::*;
pub use error::{Field, RenderError};
pub use glyph::GlyphAtlas;
pub use observation::{Cursor, Observation, RgbGrid};
pub use overlay::{Colormap, heatmap};
pub use renderer::{ImageRenderer, Overrides};
pub use specials::{SpecialFlags, specials_background};
