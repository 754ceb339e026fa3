use crate::{
    terrain::{
        noise::{BasisNoise, NoiseBasis},
        resample::{resample, Interpolation},
        Generate, HeightField, TerrainBuilder,
    },
    util::range::NumRange,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fills every sample independently. With no basis, samples are uniform
/// random values in the elevation range, which gives pure static. With a
/// noise basis, samples come from a coherent noise function, so neighbouring
/// samples are correlated.
///
/// As a generator, the filled map is then resampled against a lattice of
/// `smoothing_step`, which relaxes the static into rolling hills.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomMap {
    /// Noise function to sample. `None` means uniform random samples.
    pub basis: Option<NoiseBasis>,
    /// Multiplier from grid coordinates to noise input coordinates. Smaller
    /// values stretch the noise out over more samples. Only used with a basis.
    pub noise_scale: f64,
    /// Lattice step of the resampling pass run after the fill. 0 or 1
    /// disables it.
    pub smoothing_step: usize,
    pub interpolation: Interpolation,
}

impl RandomMap {
    /// The range that we expect noise functions to output. Values outside
    /// this get clamped before mapping into the elevation range.
    const NOISE_RANGE: NumRange = NumRange::new(-1.0, 1.0);

    /// Overwrite every sample in the field. Noise functions get a fresh seed
    /// drawn from the RNG each call, so repeated fills give different maps.
    pub fn fill<R: Rng + ?Sized>(
        &self,
        field: &mut HeightField,
        elevation: NumRange,
        rng: &mut R,
    ) {
        match self.basis {
            None => {
                for z in field.elevations_mut() {
                    *z = rng.gen_range(elevation);
                }
            }
            Some(basis) => {
                let noise = BasisNoise::new(basis, rng.gen());
                let (row_lines, col_lines) = field.lines();
                for row in 0..row_lines {
                    for col in 0..col_lines {
                        let point = [
                            col as f64 * self.noise_scale,
                            row as f64 * self.noise_scale,
                            1.0,
                        ];
                        let z = Self::NOISE_RANGE
                            .value(noise.get(point))
                            .clamp()
                            .map_to(elevation)
                            .inner();
                        field.set(row, col, z);
                    }
                }
            }
        }
    }
}

impl Default for RandomMap {
    fn default() -> Self {
        Self {
            basis: None,
            noise_scale: 0.05,
            smoothing_step: 10,
            interpolation: Interpolation::Bicubic,
        }
    }
}

impl Generate for RandomMap {
    fn generate(&self, terrain: &mut TerrainBuilder) -> anyhow::Result<()> {
        let elevation = terrain.config.elevation;
        self.fill(&mut terrain.field, elevation, &mut terrain.rng);
        resample(&mut terrain.field, self.smoothing_step, self.interpolation);
        Ok(())
    }
}
