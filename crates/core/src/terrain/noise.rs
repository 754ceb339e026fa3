use noise::{
    NoiseFn, OpenSimplex, Perlin, RangeFunction, Seedable, SuperSimplex, Value,
    Worley,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use strum::{Display, EnumIter, EnumString};

/// The coherent noise functions available as a basis for noise-driven
/// elevation. All of them produce roughly `[-1, 1]` output, though some
/// (particularly the cellular ones) can stray slightly outside it.
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
pub enum NoiseBasis {
    Perlin,
    OpenSimplex,
    SuperSimplex,
    Value,
    /// Distance to the nearest feature point (Euclidean)
    VoronoiF1,
    /// Distance to the nearest feature point, measured in taxicab distance
    VoronoiManhattan,
    /// Distance to the nearest feature point, measured as the largest single
    /// axis distance
    VoronoiChebyshev,
    /// A constant random value per Voronoi cell
    CellNoise,
}

/// A seeded instance of one of the [NoiseBasis] functions. The concrete type
/// isn't known until runtime, so it's held as a trait object.
pub struct BasisNoise {
    basis: NoiseBasis,
    seed: u32,
    noise_fn: Box<dyn NoiseFn<[f64; 3]>>,
}

impl BasisNoise {
    pub fn new(basis: NoiseBasis, seed: u32) -> Self {
        Self {
            basis,
            seed,
            noise_fn: Self::make_noise_fn(basis, seed),
        }
    }

    pub fn basis(&self) -> NoiseBasis {
        self.basis
    }

    /// Sample the noise function at a point
    pub fn get(&self, point: [f64; 3]) -> f64 {
        self.noise_fn.get(point)
    }

    // Seedable is generic over Self, so it can't be used through a trait
    // object. Every type has to be seeded before it gets boxed.
    fn make_noise_fn(basis: NoiseBasis, seed: u32) -> Box<dyn NoiseFn<[f64; 3]>> {
        match basis {
            NoiseBasis::Perlin => Box::new(Perlin::new().set_seed(seed)),
            NoiseBasis::OpenSimplex => {
                Box::new(OpenSimplex::new().set_seed(seed))
            }
            NoiseBasis::SuperSimplex => {
                Box::new(SuperSimplex::new().set_seed(seed))
            }
            NoiseBasis::Value => Box::new(Value::new().set_seed(seed)),
            NoiseBasis::VoronoiF1 => {
                Box::new(Self::worley(seed, RangeFunction::Euclidean, true))
            }
            NoiseBasis::VoronoiManhattan => {
                Box::new(Self::worley(seed, RangeFunction::Manhattan, true))
            }
            NoiseBasis::VoronoiChebyshev => {
                Box::new(Self::worley(seed, RangeFunction::Chebyshev, true))
            }
            NoiseBasis::CellNoise => {
                Box::new(Self::worley(seed, RangeFunction::Euclidean, false))
            }
        }
    }

    fn worley(
        seed: u32,
        range_function: RangeFunction,
        enable_range: bool,
    ) -> Worley {
        Worley::new()
            .set_seed(seed)
            .set_range_function(range_function)
            .enable_range(enable_range)
    }
}

impl Debug for BasisNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasisNoise")
            .field("basis", &self.basis)
            .field("seed", &self.seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_deterministic() {
        for basis in NoiseBasis::iter() {
            let first = BasisNoise::new(basis, 42);
            let second = BasisNoise::new(basis, 42);
            for i in 0..20 {
                let point = [i as f64 * 0.37, i as f64 * 0.11, 1.0];
                let value = first.get(point);
                assert!(value.is_finite(), "{} gave {}", basis, value);
                assert_eq!(value, second.get(point));
            }
        }
    }

    #[test]
    fn test_names() {
        use std::str::FromStr;
        assert_eq!(
            NoiseBasis::from_str("open_simplex").unwrap(),
            NoiseBasis::OpenSimplex
        );
        assert_eq!(NoiseBasis::CellNoise.to_string(), "cell_noise");
    }
}
