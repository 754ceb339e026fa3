//! Morphogen is a procedural geometry kit. It grows plant-like and fractal
//! curves with L-systems and a turtle interpreter, and builds fractal height
//! fields for terrain. The output is plain data (polylines and grid meshes),
//! so presentation is left to whatever consumes it.
//!
//! ```
//! use morphogen::{Drawing, Preset, Terrain, TerrainConfig};
//!
//! let drawing = Drawing::generate(Preset::Koch.config()).unwrap();
//! println!("{} polylines", drawing.polylines().len());
//!
//! let config = TerrainConfig {
//!     rows: 32,
//!     cols: 32,
//!     ..Default::default()
//! };
//! let terrain = Terrain::generate(config).unwrap();
//! let mesh = terrain.to_mesh();
//! println!("{} vertices, {} edges", mesh.vertices.len(), mesh.edges.len());
//! ```
//!
//! See [LSystemConfig] and [TerrainConfig] for everything that can be
//! customized.

mod config;
pub mod lsystem;
pub mod terrain;
mod util;

pub use crate::{
    config::{
        Algorithm, AngleSet, Capabilities, LSystemConfig, Origin, Sampled,
        Seed, Smoothing, TerrainConfig, TurtleConfig,
    },
    lsystem::{
        rewrite,
        turtle::{Polyline, PolylineSet, Turtle, TurtleRun},
        Drawing, LSystem, Preset, RuleSet,
    },
    terrain::{
        noise::NoiseBasis, resample::Interpolation, DiamondSquare, Fbm,
        GridMesh, HeightField, HybridMultifractal, RandomMap, Terrain,
    },
    util::range::{NumRange, RangeValue},
};
