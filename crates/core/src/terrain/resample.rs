//! Bidirectional resampling, used to relax a rough field into a smooth one.
//!
//! Resampling picks out a coarse lattice of samples (every `step`-th row and
//! column) and rebuilds every other sample by interpolating between lattice
//! samples. Lattice samples themselves are never modified.

use crate::terrain::HeightField;
use serde::{Deserialize, Serialize};
use std::cmp;
use strum::{Display, EnumIter, EnumString};

/// The blend curve used between two lattice samples
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Interpolation {
    /// Straight-line blend. Continuous, but creased at every lattice line.
    Bilinear,
    /// Blend along `-2x³ + 3x²`, which has zero slope at both ends so the
    /// surface is smooth across lattice lines
    Bicubic,
}

impl Interpolation {
    /// Weight of the far sample at fraction `t` of the way across a span. The
    /// near sample gets `weight(1 - t)`. For both curves the two weights
    /// always sum to 1.
    pub fn weight(self, t: f64) -> f64 {
        match self {
            Self::Bilinear => t,
            Self::Bicubic => -2.0 * t.powi(3) + 3.0 * t.powi(2),
        }
    }

    /// Blend between `from` and `to`, at fraction `t` of the way across
    pub fn blend(self, from: f64, to: f64, t: f64) -> f64 {
        from * self.weight(1.0 - t) + to * self.weight(t)
    }
}

impl Default for Interpolation {
    fn default() -> Self {
        Self::Bicubic
    }
}

/// The lattice lines around one index along a single axis
#[derive(Copy, Clone, Debug, PartialEq)]
struct Bracket {
    /// Lattice line at or before the index
    low: usize,
    /// Next lattice line, clamped to the last line of the field
    high: usize,
    /// Whichever of `low` and `high` is closer. Ties go to `low`.
    nearest: usize,
    /// How far across `[low, high]` the index is, in `[0, 1]`
    t: f64,
}

impl Bracket {
    fn new(index: usize, step: usize, lines: usize) -> Self {
        let low = (index / step) * step;
        let high = cmp::min(low + step, lines - 1);
        // Normalizing by the actual span keeps clamped brackets in [0, 1]
        let t = if high > low {
            (index - low) as f64 / (high - low) as f64
        } else {
            0.0
        };
        let nearest = if (index - low) * 2 <= step { low } else { high };
        Self {
            low,
            high,
            nearest,
            t,
        }
    }
}

/// Resample a field against a lattice of every `step`-th sample line. Each
/// non-lattice sample becomes the average of two blends: one along its row,
/// between the lattice columns on either side (taken from the nearest lattice
/// row), and one along its column, between the lattice rows above and below
/// (taken from the nearest lattice column).
///
/// All reads come from a snapshot of the input, so the result doesn't depend
/// on iteration order. A step of 0 or 1 makes every sample a lattice sample,
/// so it does nothing.
pub fn resample(
    field: &mut HeightField,
    step: usize,
    interpolation: Interpolation,
) {
    if step <= 1 || field.is_empty() {
        return;
    }

    let source = field.clone();
    let (row_lines, col_lines) = field.lines();
    let col_brackets: Vec<Bracket> = (0..col_lines)
        .map(|col| Bracket::new(col, step, col_lines))
        .collect();

    for row in 0..row_lines {
        let rb = Bracket::new(row, step, row_lines);
        for (col, cb) in col_brackets.iter().enumerate() {
            if row % step == 0 && col % step == 0 {
                continue;
            }
            let horizontal = interpolation.blend(
                source.get(rb.nearest, cb.low),
                source.get(rb.nearest, cb.high),
                cb.t,
            );
            let vertical = interpolation.blend(
                source.get(rb.low, cb.nearest),
                source.get(rb.high, cb.nearest),
                rb.t,
            );
            field.set(row, col, (horizontal + vertical) / 2.0);
        }
    }
}
