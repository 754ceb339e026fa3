use crate::terrain::{
    noise::{BasisNoise, NoiseBasis},
    Generate, TerrainBuilder,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Hybrid multifractal noise. Like fBm, this sums octaves of noise at rising
/// frequencies, but each octave's contribution is damped by a running weight
/// built from the octaves before it. Low areas stay smooth while high areas
/// pick up detail, which looks more like real erosion than plain fBm does.
///
/// Output elevation is `altitude * z_scale`, where altitude depends only on
/// the noise. The configured elevation range is not used.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridMultifractal {
    pub basis: NoiseBasis,
    /// Multiplier from grid coordinates to noise input coordinates
    pub xy_scale: f64,
    /// Fractal increment. Octave `i` is weighted by `lacunarity^(-i * h)`, so
    /// higher values fade out fine detail faster.
    pub h: f64,
    /// Frequency multiplier between successive octaves
    pub lacunarity: f64,
    pub octaves: u32,
    /// Added to every noise sample before weighting
    pub offset: f64,
    /// Vertical multiplier for the final altitude
    pub z_scale: f64,
}

impl HybridMultifractal {
    pub const MAX_OCTAVES: u32 = 32;

    /// Evaluate the multifractal at a single point. `noise` is the basis
    /// function, taking a 3D point.
    pub fn sample(
        &self,
        noise: impl Fn([f64; 3]) -> f64,
        point: [f64; 3],
    ) -> f64 {
        let mut point = point;
        let mut frequency = 1.0f64;
        let mut altitude = 0.0;
        let mut weight = 0.0f64;

        for octave in 0..self.octaves {
            let signal = (noise(point) + self.offset) * frequency.powf(-self.h);
            if octave == 0 {
                altitude = signal;
                weight = signal;
            } else {
                weight = weight.min(1.0);
                altitude += weight * signal;
                weight *= signal;
            }

            for coord in &mut point {
                *coord *= self.lacunarity;
            }
            frequency *= self.lacunarity;
        }
        altitude
    }
}

impl Default for HybridMultifractal {
    fn default() -> Self {
        Self {
            basis: NoiseBasis::Perlin,
            xy_scale: 0.025,
            h: 0.25,
            lacunarity: 3.0,
            octaves: 5,
            offset: 0.25,
            z_scale: 1.0,
        }
    }
}

impl Generate for HybridMultifractal {
    fn generate(&self, terrain: &mut TerrainBuilder) -> anyhow::Result<()> {
        let noise = BasisNoise::new(self.basis, terrain.rng.gen());
        let (row_lines, col_lines) = terrain.field.lines();
        for row in 0..row_lines {
            for col in 0..col_lines {
                let point =
                    [col as f64 * self.xy_scale, row as f64 * self.xy_scale, 1.0];
                let altitude = self.sample(|p| noise.get(p), point);
                terrain.field.set(row, col, altitude * self.z_scale);
            }
        }
        Ok(())
    }
}
