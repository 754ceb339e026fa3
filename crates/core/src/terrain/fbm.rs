use crate::terrain::{
    noise::NoiseBasis,
    random::RandomMap,
    resample::{resample, Interpolation},
    Generate, HeightField, TerrainBuilder,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Fractional Brownian motion, built by stacking smoothed random maps. Each
/// octave is a fresh random map, resampled against a lattice half as coarse
/// as the previous octave's and added in at half the weight. The first octave
/// sets the broad shape and later ones add progressively finer, fainter
/// detail.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fbm {
    /// Noise function for each octave's random map. `None` means uniform
    /// random samples.
    pub basis: Option<NoiseBasis>,
    /// See [RandomMap::noise_scale]
    pub noise_scale: f64,
    /// Lattice step of the **last** octave. Earlier octaves double it.
    pub unit_size: usize,
    /// Number of layers to sum
    pub octaves: u32,
    pub interpolation: Interpolation,
}

impl Fbm {
    pub const MAX_OCTAVES: u32 = 16;

    /// Weight that octave `i` is summed with: `1 / 2^i`
    pub fn octave_weight(octave: u32) -> f64 {
        0.5f64.powi(octave as i32)
    }

    /// Lattice step for each octave that will actually run. The first octave
    /// uses `unit_size * 2^(octaves - 1)`, and each later one halves it.
    /// Empty if either `unit_size` or `octaves` is zero.
    pub fn octave_steps(&self) -> Vec<usize> {
        if self.unit_size < 1 || self.octaves < 1 {
            return Vec::new();
        }
        let base = self
            .unit_size
            .saturating_mul(2usize.saturating_pow(self.octaves - 1));
        (0..self.octaves)
            .map(|octave| base.checked_shr(octave).unwrap_or(0))
            .take_while(|&step| step >= 1)
            .collect()
    }
}

impl Default for Fbm {
    fn default() -> Self {
        Self {
            basis: None,
            noise_scale: RandomMap::default().noise_scale,
            unit_size: 5,
            octaves: 4,
            interpolation: Interpolation::Bicubic,
        }
    }
}

impl Generate for Fbm {
    fn generate(&self, terrain: &mut TerrainBuilder) -> anyhow::Result<()> {
        // Layers are resampled per octave below, not by the map itself
        let map = RandomMap {
            basis: self.basis,
            noise_scale: self.noise_scale,
            smoothing_step: 0,
            interpolation: self.interpolation,
        };
        let elevation = terrain.config.elevation;
        for (octave, step) in self.octave_steps().into_iter().enumerate() {
            let octave = octave as u32;
            let mut layer =
                HeightField::new(terrain.field.rows(), terrain.field.cols());
            map.fill(&mut layer, elevation, &mut terrain.rng);
            resample(&mut layer, step, self.interpolation);
            terrain
                .field
                .add_scaled(&layer, Self::octave_weight(octave))?;
            debug!(
                "fBm octave {} (step {}, weight {})",
                octave,
                step,
                Self::octave_weight(octave)
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_weights_decay() {
        assert_approx_eq!(Fbm::octave_weight(0), 1.0);
        assert_approx_eq!(Fbm::octave_weight(1), 0.5);
        assert_approx_eq!(Fbm::octave_weight(3), 0.125);
        for octave in 1..Fbm::MAX_OCTAVES {
            assert!(Fbm::octave_weight(octave) < Fbm::octave_weight(octave - 1));
        }
    }

    #[test]
    fn test_octave_steps() {
        let fbm = Fbm {
            unit_size: 5,
            octaves: 4,
            ..Default::default()
        };
        assert_eq!(fbm.octave_steps(), vec![40, 20, 10, 5]);

        let single = Fbm {
            unit_size: 1,
            octaves: 1,
            ..Default::default()
        };
        assert_eq!(single.octave_steps(), vec![1]);

        let no_unit = Fbm {
            unit_size: 0,
            ..Default::default()
        };
        assert!(no_unit.octave_steps().is_empty());

        let no_octaves = Fbm {
            octaves: 0,
            ..Default::default()
        };
        assert!(no_octaves.octave_steps().is_empty());
    }
}
