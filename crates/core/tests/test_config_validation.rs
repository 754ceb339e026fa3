use morphogen::{
    Algorithm, AngleSet, Drawing, Fbm, HybridMultifractal, LSystemConfig,
    NumRange, RandomMap, Sampled, Seed, Terrain, TerrainConfig, TurtleConfig,
};
use validator::ValidationErrors;

fn error_fields(err: anyhow::Error) -> Vec<&'static str> {
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    let mut error_fields = validation_errors
        .errors()
        .keys()
        .copied()
        .collect::<Vec<&str>>();
    error_fields.sort_unstable();
    error_fields
}

#[test]
fn test_terrain_config_validation() {
    let config = TerrainConfig {
        seed: Seed::Int(0),
        rows: 20000,                            // invalid (too big)
        cols: 10,                               // valid
        elevation: NumRange::new(10.0, -10.0),  // invalid
        algorithm: Algorithm::Fbm(Fbm {
            octaves: 40, // invalid
            ..Default::default()
        }),
        smoothing: None,
        border_width: 100, // valid (but weird)
        cell_width: -1.0,  // invalid
        origin: [0.0, 0.0, 0.0],
    };

    // This is a bit of a lazy check but it works well enough
    let err = Terrain::generate(config).unwrap_err();
    assert_eq!(
        error_fields(err),
        vec!["algorithm", "cell_width", "elevation", "rows"]
    );
}

#[test]
fn test_multifractal_validation() {
    let config = TerrainConfig {
        algorithm: Algorithm::HybridMultifractal(HybridMultifractal {
            lacunarity: 0.0, // invalid
            ..Default::default()
        }),
        ..Default::default()
    };
    let err = Terrain::generate(config).unwrap_err();
    assert_eq!(error_fields(err), vec!["algorithm"]);
}

#[test]
fn test_lsystem_config_validation() {
    let config = LSystemConfig {
        turtle: TurtleConfig {
            angles: AngleSet {
                yaw: Sampled::Range(NumRange::new(40.0, 20.0)), // invalid
                ..AngleSet::uniform(25.0)
            },
            step: Sampled::Fixed(f64::NAN), // invalid
            ..Default::default()
        },
        ..Default::default()
    };

    let err = Drawing::generate(config).unwrap_err();
    // Nested errors are keyed by the outer field
    assert_eq!(error_fields(err), vec!["turtle"]);
}

#[test]
fn test_config_from_toml() {
    let config: LSystemConfig = toml::from_str(
        r#"
        seed = "fern"
        axiom = "X"
        generations = 2

        [rules]
        X = "F[+X]F[-X]+X"
        F = "FF"

        [turtle]
        step = { min = 1.0, max = 2.0 }
        angles = { pitch = 20.0, yaw = { min = 20.0, max = 30.0 }, roll = 20.0 }
        "#,
    )
    .unwrap();
    assert_eq!(config.rules.get('X'), Some("F[+X]F[-X]+X"));
    assert_eq!(config.rules.get('F'), Some("FF"));
    assert_eq!(config.turtle.step, Sampled::Range(NumRange::new(1.0, 2.0)));
    assert_eq!(config.turtle.angles.pitch, Sampled::Fixed(20.0));
    assert!(Drawing::generate(config).is_ok());
}

/// Bounds that are finite on their own, but whose span overflows
#[test]
fn test_overflowing_range_validation() {
    let huge = NumRange::new(-1e308, 1e308);
    let config = TerrainConfig {
        elevation: huge,
        algorithm: Algorithm::Random(RandomMap::default()),
        ..Default::default()
    };
    let err = Terrain::generate(config).unwrap_err();
    assert_eq!(error_fields(err), vec!["elevation"]);

    let config = LSystemConfig {
        turtle: TurtleConfig {
            step: Sampled::Range(huge),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = Drawing::generate(config).unwrap_err();
    assert_eq!(error_fields(err), vec!["turtle"]);
}

#[test]
fn test_mesh_placement_validation() {
    let config = TerrainConfig {
        cell_width: f64::NAN,              // invalid
        origin: [0.0, f64::INFINITY, 0.0], // invalid
        ..Default::default()
    };
    let err = Terrain::generate(config).unwrap_err();
    assert_eq!(error_fields(err), vec!["cell_width", "origin"]);

    let config = LSystemConfig {
        turtle: TurtleConfig {
            origin: [f64::NAN, 0.0, 0.0], // invalid
            ..Default::default()
        },
        ..Default::default()
    };
    let err = Drawing::generate(config).unwrap_err();
    assert_eq!(error_fields(err), vec!["turtle"]);

    // TOML can spell out non-finite floats, so they have to be caught here
    let config: TerrainConfig = toml::from_str(
        r#"
        rows = 10
        cols = 10
        cell_width = nan
        origin = [0.0, 0.0, inf]
        "#,
    )
    .unwrap();
    let err = Terrain::generate(config).unwrap_err();
    assert_eq!(error_fields(err), vec!["cell_width", "origin"]);
}
