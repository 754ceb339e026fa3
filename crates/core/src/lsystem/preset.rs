use crate::{
    config::{AngleSet, Capabilities, LSystemConfig, Sampled, Seed, TurtleConfig},
    lsystem::RuleSet,
    util::range::NumRange,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Built-in L-systems. Each one is a complete config, grammar and turtle, that
/// can be generated directly or used as a starting point for a custom config.
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
pub enum Preset {
    /// The triadic Koch curve, turning 60 degrees
    Koch,
    /// Koch islands separated by lakes. Needs pen-up moves.
    IslandsAndLakes,
    /// A flat bracketed plant
    Tree2d,
    /// A bushy 3D tree with fixed angles
    Tree3d,
    /// The same tree grammar as [Self::Tree3d], but every angle and step is
    /// drawn from a range so each seed grows a different tree
    StochasticTree3d,
}

impl Preset {
    /// Build the full config for this preset. The seed is fixed, so a preset
    /// always produces the same drawing.
    pub fn config(self) -> LSystemConfig {
        match self {
            Self::Koch => LSystemConfig {
                seed: self.seed(),
                ..Default::default()
            },
            Self::IslandsAndLakes => LSystemConfig {
                seed: self.seed(),
                axiom: "F+F+F+F".into(),
                rules: rules(&[
                    ('F', "F+f-FF+F+FF+Ff+FF-f+FF-F-FF-Ff-FFF"),
                    ('f', "ffffff"),
                ]),
                generations: 2,
                turtle: TurtleConfig {
                    capabilities: Capabilities::SKIP_2D,
                    angles: AngleSet::uniform(90.0),
                    step: Sampled::Fixed(1.0),
                    ..Default::default()
                },
            },
            Self::Tree2d => LSystemConfig {
                seed: self.seed(),
                axiom: "X".into(),
                rules: rules(&[('X', "F[+X][-X]FX"), ('F', "FF")]),
                generations: 5,
                turtle: TurtleConfig {
                    capabilities: Capabilities::BRANCHING_2D,
                    angles: AngleSet::uniform(22.5),
                    step: Sampled::Fixed(1.0),
                    ..Default::default()
                },
            },
            Self::Tree3d => LSystemConfig {
                seed: self.seed(),
                axiom: "F".into(),
                rules: tree_3d_rules(),
                generations: 3,
                turtle: TurtleConfig {
                    capabilities: Capabilities::FULL_3D,
                    angles: AngleSet::uniform(22.5),
                    step: Sampled::Fixed(10.0),
                    ..Default::default()
                },
            },
            Self::StochasticTree3d => LSystemConfig {
                seed: self.seed(),
                axiom: "F".into(),
                rules: tree_3d_rules(),
                generations: 3,
                turtle: TurtleConfig {
                    capabilities: Capabilities::FULL_3D,
                    angles: AngleSet {
                        pitch: NumRange::new(30.0, 60.0).into(),
                        yaw: NumRange::new(20.0, 40.0).into(),
                        roll: NumRange::new(30.0, 60.0).into(),
                    },
                    step: NumRange::new(10.0, 30.0).into(),
                    ..Default::default()
                },
            },
        }
    }

    fn seed(self) -> Seed {
        Seed::Text(self.to_string())
    }
}

fn rules(pairs: &[(char, &str)]) -> RuleSet {
    pairs.iter().copied().collect()
}

fn tree_3d_rules() -> RuleSet {
    rules(&[('F', "F[-&\\F][\\++&F][/--^F]||F[--&/F][++^\\F][+&F]")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsystem::{turtle::Turtle, LSystem};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use std::str::FromStr;
    use strum::IntoEnumIterator;
    use validator::Validate;

    #[test]
    fn test_names() {
        assert_eq!(Preset::from_str("koch").unwrap(), Preset::Koch);
        assert_eq!(
            Preset::from_str("islands_and_lakes").unwrap(),
            Preset::IslandsAndLakes
        );
        assert!(Preset::from_str("fern").is_err());
        for preset in Preset::iter() {
            assert_eq!(Preset::from_str(&preset.to_string()).unwrap(), preset);
        }
    }

    #[test]
    fn test_presets_valid() {
        for preset in Preset::iter() {
            assert!(preset.config().validate().is_ok(), "{}", preset);
        }
    }

    #[test]
    fn test_koch_expansion() {
        let config = Preset::Koch.config();
        let expanded = LSystem::from(&config).expand();
        assert_eq!(expanded.matches('F').count(), 4usize.pow(3));
    }

    #[test]
    fn test_tree_2d_expansion() {
        let config = Preset::Tree2d.config();
        let lsystem = LSystem { generations: 1, ..LSystem::from(&config) };
        assert_eq!(lsystem.expand(), "F[+X][-X]FX");

        // Branches are balanced, so the turtle ends on the trunk
        let run = LSystem::from(&config).draw(
            &Turtle::new(config.turtle),
            &mut Pcg64::seed_from_u64(0),
        );
        assert_eq!(run.unmatched_pops, 0);
        assert!(run.polylines.len() > 1);
    }

    #[test]
    fn test_islands_pen_up() {
        let config = Preset::IslandsAndLakes.config();
        let run = LSystem::from(&config).draw(
            &Turtle::new(config.turtle),
            &mut Pcg64::seed_from_u64(0),
        );
        // Every pen-up run breaks the line
        assert!(run.polylines.len() > 1);
    }
}
