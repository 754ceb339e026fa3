//! Height field generation. A run allocates a flat field, fills it with one
//! of the elevation algorithms, then applies the optional post-processing
//! steps (smoothing, border flattening).

mod diamond_square;
mod fbm;
mod height_field;
mod multifractal;
pub mod noise;
mod random;
pub mod resample;

pub use self::{
    diamond_square::DiamondSquare,
    fbm::Fbm,
    height_field::{GridMesh, HeightField},
    multifractal::HybridMultifractal,
    random::RandomMap,
    resample::Interpolation,
};

use crate::{config::Algorithm, timed, TerrainConfig};
use anyhow::Context;
use log::info;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use validator::Validate;

/// A container for a height field while it's being generated. The fields are
/// public to allow for disjoint borrowing of multiple fields at once, e.g. a
/// generator that needs the RNG and the field at the same time.
pub struct TerrainBuilder {
    /// Deterministically controls the whole run. This is public to allow for
    /// disjoint borrowing, but please **do not mutate the config**.
    pub config: TerrainConfig,

    /// RNG provider, seeded from the config. Every random draw in the run
    /// comes from here, in a fixed order.
    pub rng: Pcg64,

    /// The field being built. Starts flat, at the configured size. Generators
    /// may replace it with a different size (diamond-square needs a square
    /// power-of-two grid).
    pub field: HeightField,
}

impl TerrainBuilder {
    pub fn new(config: TerrainConfig) -> Self {
        let field = HeightField::new(config.rows, config.cols);
        info!(
            "Initialized {}x{} field ({} samples)",
            config.rows,
            config.cols,
            field.len()
        );
        Self {
            rng: config.seed.rng(),
            config,
            field,
        }
    }

    /// Run the configured algorithm and post-processing steps, and return the
    /// finished field. Returns an error if generation produced any non-finite
    /// elevations.
    pub fn generate(mut self) -> anyhow::Result<HeightField> {
        match self.config.algorithm {
            Algorithm::Random(generator) => self.apply_generator(generator)?,
            Algorithm::Fbm(generator) => self.apply_generator(generator)?,
            Algorithm::DiamondSquare(generator) => {
                self.apply_generator(generator)?
            }
            Algorithm::HybridMultifractal(generator) => {
                self.apply_generator(generator)?
            }
        }

        if let Some(smoothing) = self.config.smoothing {
            timed!(
                "Smoothing",
                resample::resample(
                    &mut self.field,
                    smoothing.step,
                    smoothing.interpolation
                )
            );
        }
        if self.config.border_width > 0 {
            self.field.zero_border(self.config.border_width);
        }

        self.field.ensure_finite()?;
        Ok(self.field)
    }

    /// A helper to run a generation step on this builder
    fn apply_generator(
        &mut self,
        generator: impl Debug + Generate,
    ) -> anyhow::Result<()> {
        timed!(&format!("{:?}", generator), generator.generate(self))
            .with_context(|| format!("error in {:?}", generator))
    }
}

/// A type that populates the elevations of a field. Any failure in here is
/// either a bug or an input that validation should have caught, so errors
/// are exceptional.
trait Generate {
    /// Fill in elevations for the builder's field. The field's contents going
    /// in are undefined; generators should overwrite every sample (or, for
    /// summing generators, start from the flat field the builder allocates).
    fn generate(&self, terrain: &mut TerrainBuilder) -> anyhow::Result<()>;
}

/// A fully generated height field, along with the config that produced it.
/// Generation is deterministic based on config, so the config alone is enough
/// to reproduce the terrain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Terrain {
    config: TerrainConfig,
    field: HeightField,
}

impl Terrain {
    /// Generate a new height field from the given config. Returns an error if
    /// the config is invalid, or in the exceptional case where generation
    /// produces non-finite output.
    pub fn generate(config: TerrainConfig) -> anyhow::Result<Self> {
        info!("Generating terrain with config {:#?}", config);
        config.validate().context("invalid config")?;

        let field = timed!(
            "Terrain generation",
            log::Level::Info,
            TerrainBuilder::new(config.clone()).generate()
        )?;
        Ok(Self { config, field })
    }

    /// Get a reference to the config that defines this terrain
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn into_field(self) -> HeightField {
        self.field
    }

    /// Build the world-space mesh, using the config's cell width and origin
    pub fn to_mesh(&self) -> GridMesh {
        self.field.to_mesh(self.config.cell_width, self.config.origin)
    }

    /// Serialize this terrain, config included, into JSON
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("error serializing terrain")
    }

    /// Deserialize terrain from JSON, as written by [Terrain::to_json]
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("error deserializing terrain")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Smoothing, util::range::NumRange, Seed};

    fn config(algorithm: Algorithm) -> TerrainConfig {
        TerrainConfig {
            seed: Seed::Int(17),
            rows: 16,
            cols: 12,
            elevation: NumRange::new(-10.0, 10.0),
            algorithm,
            border_width: 0,
            ..Default::default()
        }
    }

    fn generate(config: TerrainConfig) -> HeightField {
        TerrainBuilder::new(config).generate().unwrap()
    }

    #[test]
    fn test_deterministic() {
        let algorithms = [
            Algorithm::Random(RandomMap::default()),
            Algorithm::Fbm(Fbm::default()),
            Algorithm::DiamondSquare(DiamondSquare::default()),
            Algorithm::HybridMultifractal(HybridMultifractal::default()),
        ];
        for &algorithm in &algorithms {
            let first = generate(config(algorithm));
            let second = generate(config(algorithm));
            assert_eq!(first, second, "{:?}", algorithm);
        }
    }

    #[test]
    fn test_empty_field() {
        for &(rows, cols) in &[(0, 0), (0, 5), (5, 0)] {
            let field = generate(TerrainConfig {
                rows,
                cols,
                ..config(Algorithm::DiamondSquare(DiamondSquare::default()))
            });
            assert!(field.is_empty());
        }
    }

    #[test]
    fn test_diamond_square_resizes() {
        let field =
            generate(config(Algorithm::DiamondSquare(DiamondSquare::default())));
        assert_eq!(field.lines(), (17, 17));
    }

    #[test]
    fn test_single_cell_diamond_square() {
        let result = TerrainBuilder::new(TerrainConfig {
            rows: 1,
            cols: 1,
            ..config(Algorithm::DiamondSquare(DiamondSquare::default()))
        })
        .generate();
        let error = format!("{:#}", result.unwrap_err());
        assert!(error.contains("single cell"), "{}", error);
    }

    #[test]
    fn test_post_processing() {
        let smoothed = generate(TerrainConfig {
            smoothing: Some(Smoothing {
                step: 4,
                interpolation: Interpolation::Bicubic,
            }),
            border_width: 2,
            ..config(Algorithm::Random(RandomMap::default()))
        });
        let (row_lines, col_lines) = smoothed.lines();
        for col in 0..col_lines {
            assert_eq!(smoothed.get(0, col), 0.0);
            assert_eq!(smoothed.get(row_lines - 2, col), 0.0);
        }
        assert_ne!(smoothed.get(4, 4), 0.0);
    }
}
