mod seed;

pub use self::seed::Seed;

use crate::{
    lsystem::RuleSet,
    terrain::{
        DiamondSquare, Fbm, HybridMultifractal, Interpolation, RandomMap,
    },
    util::range::NumRange,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A point in world space, as `[x, y, z]`
pub type Origin = [f64; 3];

/// Configuration that defines an L-system run: the grammar, how far to expand
/// it, and the turtle that traces the expanded string. Two runs with the same
/// config always produce identical polylines.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LSystemConfig {
    /// RNG seed. Only consumed if the turtle samples its angles or step
    /// distance from ranges, but always present so a config fully describes
    /// its output.
    pub seed: Seed,

    /// The starting string, before any rewriting
    pub axiom: String,

    /// Rewrite rules, each mapping one symbol to its replacement. In TOML this
    /// looks like `F = "F+F--F+F"`.
    pub rules: RuleSet,

    /// Number of rewrite passes. **Beware:** string length typically grows
    /// exponentially with this (a Koch curve quadruples every generation), so
    /// keep it small.
    pub generations: u32,

    /// Configuration for the turtle that interprets the expanded string
    #[validate]
    pub turtle: TurtleConfig,
}

/// Which parts of the turtle alphabet a turtle understands. Symbols outside
/// its capabilities are ignored, exactly like any other unknown character.
/// The associated constants cover the usual tiers, from a plain 2D curve
/// drawer up to a full 3D branching turtle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Support `f`, moving without drawing
    pub pen_up: bool,
    /// Support `[` and `]`, saving and restoring state for branches
    pub branching: bool,
    /// Support pitch (`&`, `^`), roll (`\`, `/`) and turn around (`|`)
    pub three_d: bool,
}

impl Capabilities {
    /// Draw and yaw only: `F`, `+`, `-`
    pub const DRAW_2D: Self = Self {
        pen_up: false,
        branching: false,
        three_d: false,
    };
    /// [Self::DRAW_2D] plus pen-up moves
    pub const SKIP_2D: Self = Self {
        pen_up: true,
        branching: false,
        three_d: false,
    };
    /// [Self::SKIP_2D] plus branching
    pub const BRANCHING_2D: Self = Self {
        pen_up: true,
        branching: true,
        three_d: false,
    };
    /// Everything
    pub const FULL_3D: Self = Self {
        pen_up: true,
        branching: true,
        three_d: true,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL_3D
    }
}

/// A numeric parameter that is either constant, or drawn uniformly from a
/// range every time it's used. Ranged parameters make a stochastic L-system:
/// each occurrence of a symbol gets an independent draw.
///
/// Deserializes from either a bare number (`step = 3.0`) or a range
/// (`step = { min = 10.0, max = 30.0 }`).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sampled {
    Fixed(f64),
    Range(NumRange),
}

impl Sampled {
    /// Get a value for a single use of this parameter. Fixed values never
    /// touch the RNG.
    pub fn sample<R: rand::Rng + ?Sized>(self, rng: &mut R) -> f64 {
        match self {
            Self::Fixed(value) => value,
            Self::Range(range) => rng.gen_range(range),
        }
    }

    /// The full set of values this parameter can take on
    pub fn bounds(self) -> NumRange {
        match self {
            Self::Fixed(value) => NumRange::new(value, value),
            Self::Range(range) => range,
        }
    }
}

impl From<f64> for Sampled {
    fn from(value: f64) -> Self {
        Self::Fixed(value)
    }
}

impl From<NumRange> for Sampled {
    fn from(range: NumRange) -> Self {
        Self::Range(range)
    }
}

/// Rotation magnitudes, in degrees, for each kind of turn. Each symbol picks
/// its direction; these only define how far it turns.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleSet {
    /// Used by `&` and `^`, rotating about the turtle's local X axis
    pub pitch: Sampled,
    /// Used by `+` and `-`, rotating about the turtle's local Y axis
    pub yaw: Sampled,
    /// Used by `\` and `/`, rotating about the turtle's local Z axis
    pub roll: Sampled,
}

impl AngleSet {
    /// The same fixed angle for every kind of rotation
    pub fn uniform(degrees: f64) -> Self {
        Self {
            pitch: degrees.into(),
            yaw: degrees.into(),
            roll: degrees.into(),
        }
    }
}

/// Configuration for a turtle interpreter
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TurtleConfig {
    pub capabilities: Capabilities,

    /// Rotation angles, in degrees
    #[validate(custom = "validate_angles")]
    pub angles: AngleSet,

    /// Distance covered by each `F` or `f`
    #[validate(custom = "validate_sampled")]
    pub step: Sampled,

    /// Where the turtle starts. It always starts facing +Z, with local X and Y
    /// aligned to the world axes.
    #[validate(custom = "validate_origin")]
    pub origin: Origin,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::FULL_3D,
            angles: AngleSet::uniform(22.5),
            step: Sampled::Fixed(1.0),
            origin: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for LSystemConfig {
    fn default() -> Self {
        // The Koch curve, the smallest grammar that still looks like something
        Self {
            seed: Seed::default(),
            axiom: "F".into(),
            rules: [('F', "F+F--F+F")].iter().copied().collect(),
            generations: 3,
            turtle: TurtleConfig {
                capabilities: Capabilities::DRAW_2D,
                angles: AngleSet::uniform(60.0),
                step: Sampled::Fixed(3.0),
                ..Default::default()
            },
        }
    }
}

/// Configuration that defines a height field generation run. Two runs with
/// the same config always produce identical fields.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TerrainConfig {
    /// RNG seed to use for all randomized steps of the run
    pub seed: Seed,

    /// Number of grid cells along Y. The field has one more line of samples
    /// than cells. Zero produces an empty field.
    #[validate(range(max = 16384))]
    pub rows: usize,

    /// Number of grid cells along X. Zero produces an empty field.
    #[validate(range(max = 16384))]
    pub cols: usize,

    /// Range that random samples are drawn from. Summing algorithms (fBm) and
    /// the noise-driven ones can leave this range; it's a sampling range, not
    /// a clamp.
    #[validate(custom = "validate_range")]
    pub elevation: NumRange,

    /// The algorithm that populates the field
    #[validate(custom = "validate_algorithm")]
    pub algorithm: Algorithm,

    /// Optional resampling pass applied after generation, to relax a rough
    /// field into a smoother surface
    pub smoothing: Option<Smoothing>,

    /// Number of sample lines around the edge of the field to flatten to zero
    /// elevation. Zero disables this.
    pub border_width: usize,

    /// Spacing between adjacent grid lines in the output mesh
    #[validate(custom = "validate_cell_width")]
    pub cell_width: f64,

    /// World position of the first grid vertex in the output mesh
    #[validate(custom = "validate_origin")]
    pub origin: Origin,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: Seed::default(),
            rows: 120,
            cols: 120,
            elevation: NumRange::new(-50.0, 50.0),
            algorithm: Algorithm::Fbm(Fbm::default()),
            smoothing: None,
            border_width: 5,
            cell_width: 1.0,
            origin: [0.0, 0.0, 0.0],
        }
    }
}

/// The different height field algorithms, along with their parameters.
///
/// In TOML, the variant is picked with a `type` key:
///
/// ```toml
/// [algorithm]
/// type = "diamond_square"
/// roughness = 0.3
/// ```
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Algorithm {
    Random(RandomMap),
    Fbm(Fbm),
    DiamondSquare(DiamondSquare),
    HybridMultifractal(HybridMultifractal),
}

/// A bidirectional resampling pass. See [crate::terrain::resample].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Smoothing {
    /// Spacing of the coarse lattice that gets interpolated between
    pub step: usize,
    #[serde(default)]
    pub interpolation: Interpolation,
}

fn validate_range(range: &NumRange) -> Result<(), ValidationError> {
    // The span has to be finite too, or sampling overflows
    if range.min.is_finite()
        && range.max.is_finite()
        && range.span().is_finite()
        && range.is_ordered()
    {
        Ok(())
    } else {
        Err(ValidationError::new("range"))
    }
}

fn validate_cell_width(cell_width: f64) -> Result<(), ValidationError> {
    if cell_width.is_finite() && cell_width >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("range"))
    }
}

fn validate_origin(origin: &Origin) -> Result<(), ValidationError> {
    if origin.iter().all(|coord| coord.is_finite()) {
        Ok(())
    } else {
        Err(ValidationError::new("finite"))
    }
}

fn validate_sampled(sampled: &Sampled) -> Result<(), ValidationError> {
    validate_range(&sampled.bounds())
}

fn validate_angles(angles: &AngleSet) -> Result<(), ValidationError> {
    validate_sampled(&angles.pitch)?;
    validate_sampled(&angles.yaw)?;
    validate_sampled(&angles.roll)
}

fn validate_algorithm(algorithm: &Algorithm) -> Result<(), ValidationError> {
    let valid = match algorithm {
        Algorithm::Random(map) => map.noise_scale.is_finite(),
        Algorithm::Fbm(fbm) => {
            fbm.noise_scale.is_finite() && fbm.octaves <= Fbm::MAX_OCTAVES
        }
        Algorithm::DiamondSquare(ds) => {
            ds.roughness.is_finite() && ds.roughness >= 0.0
        }
        Algorithm::HybridMultifractal(hmf) => {
            hmf.octaves <= HybridMultifractal::MAX_OCTAVES
                && hmf.lacunarity > 0.0
                && hmf.xy_scale.is_finite()
                && hmf.h.is_finite()
                && hmf.offset.is_finite()
                && hmf.z_scale.is_finite()
        }
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("algorithm"))
    }
}
