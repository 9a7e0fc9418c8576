//! Saliency overlays
//!
//! Maps arbitrary per-cell scores onto colours so they can be passed to the
//! renderer as foreground or background overrides.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::color::Color;
use crate::consts::{TERMINAL_COLS, TERMINAL_ROWS};
use crate::error::{Field, RenderError};
use crate::observation::RgbGrid;

/// Colour ramps for normalised scores.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    /// Black to white.
    Grayscale,
    /// Black through red and yellow to white.
    #[default]
    Heat,
}

const HEAT_STOPS: [Color; 4] = [
    Color::BLACK,
    Color::new(0xff, 0x00, 0x00),
    Color::new(0xff, 0xff, 0x00),
    Color::WHITE,
];

impl Colormap {
    /// Colour for a value in `[0, 1]`; values outside are clamped.
    pub fn sample(self, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        match self {
            Colormap::Grayscale => Color::BLACK.lerp(Color::WHITE, t),
            Colormap::Heat => {
                let segments = (HEAT_STOPS.len() - 1) as f32;
                let scaled = t * segments;
                let i = (scaled.floor() as usize).min(HEAT_STOPS.len() - 2);
                HEAT_STOPS[i].lerp(HEAT_STOPS[i + 1], scaled - i as f32)
            }
        }
    }
}

/// Min-max normalise `scores` and map them through `colormap`.
///
/// A constant grid maps every cell to the lowest colour of the ramp.
pub fn heatmap(scores: ArrayView2<'_, f32>, colormap: Colormap) -> Result<RgbGrid, RenderError> {
    if scores.dim() != (TERMINAL_ROWS, TERMINAL_COLS) {
        return Err(RenderError::ShapeMismatch {
            field: Field::Scores,
            expected: vec![TERMINAL_ROWS, TERMINAL_COLS],
            found: scores.shape().to_vec(),
        });
    }
    if let Some(((row, col), _)) = scores.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(RenderError::NonFiniteScore { row, col });
    }

    // f64 so the range of two extreme f32 scores stays finite
    let min = f64::from(scores.iter().copied().fold(f32::INFINITY, f32::min));
    let max = f64::from(scores.iter().copied().fold(f32::NEG_INFINITY, f32::max));
    let range = max - min;

    Ok(RgbGrid::from_fn(|row, col| {
        let t = if range > 0.0 {
            (f64::from(scores[[row, col]]) - min) / range
        } else {
            0.0
        };
        colormap.sample(t as f32)
    }))
}
