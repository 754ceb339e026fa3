use crate::{
    terrain::{
        resample::{resample, Interpolation},
        Generate, HeightField, TerrainBuilder,
    },
    util::{mean, range::NumRange},
};
use anyhow::ensure;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp;

/// Midpoint displacement on a square grid of `2^k + 1` sample lines. The four
/// corners are seeded randomly, then each level fills in the centre and edge
/// midpoints of every cell from the level before, plus random displacement
/// that shrinks from one level to the next.
///
/// The grid has to be square with a power-of-two size, so the requested
/// dimensions are rounded up: the output field has
/// `max(rows, cols).next_power_of_two()` cells on each side. As a generator,
/// the filled grid is then resampled against a lattice of `smoothing_step`
/// to soften the displacement creases.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiamondSquare {
    /// Controls how fast displacement shrinks: each level's displacement
    /// range is the previous one times `2^-roughness`. Lower values keep
    /// fine levels noisy, giving rougher terrain.
    pub roughness: f64,
    /// Lattice step of the resampling pass run after the fill. 0 or 1
    /// disables it.
    pub smoothing_step: usize,
    pub interpolation: Interpolation,
}

impl DiamondSquare {
    /// Number of cells per side for a requested field size
    pub fn side_cells(rows: usize, cols: usize) -> usize {
        cmp::max(rows, cols).next_power_of_two()
    }

    /// Factor applied to the displacement range after each level
    pub fn decay(&self) -> f64 {
        2f64.powf(-self.roughness)
    }

    /// Run the whole algorithm on a square field. The field is cleared first.
    pub fn fill<R: Rng + ?Sized>(
        &self,
        field: &mut HeightField,
        elevation: NumRange,
        rng: &mut R,
    ) -> anyhow::Result<()> {
        let (row_lines, col_lines) = field.lines();
        ensure!(
            row_lines > 2
                && row_lines == col_lines
                && (row_lines - 1).is_power_of_two(),
            "diamond-square needs a square 2^k+1 grid, got {}x{}",
            row_lines,
            col_lines
        );
        let n = row_lines;
        field.elevations_mut().iter_mut().for_each(|z| *z = 0.0);

        for &(row, col) in &[(0, 0), (0, n - 1), (n - 1, 0), (n - 1, n - 1)] {
            field.set(row, col, rng.gen_range(elevation));
        }

        let mut noise = elevation;
        let mut step = n - 1;
        while step >= 2 {
            self.level(field, step, noise, rng);
            debug!("Diamond-square level with step {}, noise {}", step, noise);
            step /= 2;
            noise = noise.scale(self.decay());
        }
        Ok(())
    }

    /// One level of the algorithm: visit every `step`-sized cell, set its
    /// centre, then its four edge midpoints. Writes always land at least one
    /// sample away from every corner of the grid.
    fn level<R: Rng + ?Sized>(
        &self,
        field: &mut HeightField,
        step: usize,
        noise: NumRange,
        rng: &mut R,
    ) {
        let (n, _) = field.lines();
        let half = step / 2;
        let wrapped = |field: &HeightField, row: isize, col: isize| {
            field.get(wrap(row, n), wrap(col, n))
        };

        for r in (0..n - 1).step_by(step) {
            for c in (0..n - 1).step_by(step) {
                let (r_end, c_end) = (r + step, c + step);
                let (r_mid, c_mid) = (r + half, c + half);
                let (ri, ci, h, s) =
                    (r as isize, c as isize, half as isize, step as isize);

                let centre = mean(&[
                    field.get(r, c),
                    field.get(r, c_end),
                    field.get(r_end, c_end),
                    field.get(r_end, c),
                ]) + rng.gen_range(noise);
                field.set(r_mid, c_mid, centre);

                let left = mean(&[
                    wrapped(&*field, ri + h, ci - h),
                    field.get(r, c),
                    centre,
                    field.get(r_end, c),
                ]) + rng.gen_range(noise);
                field.set(r_mid, c, left);

                let top = mean(&[
                    field.get(r, c),
                    wrapped(&*field, ri - h, ci + h),
                    field.get(r, c_end),
                    centre,
                ]) + rng.gen_range(noise);
                field.set(r, c_mid, top);

                let right = mean(&[
                    centre,
                    field.get(r, c_end),
                    wrapped(&*field, ri + h, ci + s + h),
                    field.get(r_end, c_end),
                ]) + rng.gen_range(noise);
                field.set(r_mid, c_end, right);

                let bottom = mean(&[
                    field.get(r_end, c),
                    centre,
                    field.get(r_end, c_end),
                    wrapped(&*field, ri + s + h, ci + h),
                ]) + rng.gen_range(noise);
                field.set(r_end, c_mid, bottom);
            }
        }
    }
}

/// Wrap an index onto a torus of `n - 1` samples. The first and last lines of
/// the grid are the same line on the torus, so stepping off one edge lands
/// just inside the opposite edge.
fn wrap(index: isize, n: usize) -> usize {
    let period = (n - 1) as isize;
    let wrapped = if index < 0 {
        index + period
    } else if index > period {
        index - period
    } else {
        index
    };
    wrapped as usize
}

impl Default for DiamondSquare {
    fn default() -> Self {
        Self {
            roughness: 0.3,
            smoothing_step: 5,
            interpolation: Interpolation::Bicubic,
        }
    }
}

impl Generate for DiamondSquare {
    fn generate(&self, terrain: &mut TerrainBuilder) -> anyhow::Result<()> {
        if terrain.field.is_empty() {
            return Ok(());
        }
        let cells = Self::side_cells(terrain.config.rows, terrain.config.cols);
        ensure!(
            cells > 1,
            "diamond-square needs at least 2 cells per side, but {}x{} rounds \
            to a single cell",
            terrain.config.rows,
            terrain.config.cols
        );

        terrain.field = HeightField::new(cells, cells);
        let elevation = terrain.config.elevation;
        self.fill(&mut terrain.field, elevation, &mut terrain.rng)?;
        resample(&mut terrain.field, self.smoothing_step, self.interpolation);
        Ok(())
    }
}
