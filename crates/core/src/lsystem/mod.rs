//! L-systems: parallel string rewriting, plus a turtle that turns the
//! rewritten string into geometry.

mod preset;
pub mod symbol;
pub mod turtle;

pub use self::preset::Preset;

use crate::{
    config::LSystemConfig,
    lsystem::turtle::{PolylineSet, Turtle, TurtleRun},
    timed,
};
use anyhow::Context;
use log::{info, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, iter::FromIterator};
use validator::Validate;

/// Production rules for an L-system. Each rule maps a single predecessor
/// symbol to its successor string. There's at most one rule per symbol:
/// inserting a rule for a symbol that already has one replaces it. Symbols
/// without a rule are copied through unchanged during rewriting.
///
/// Serializes as a map of one-character strings to strings. A key with more
/// (or fewer) than one character fails to deserialize.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<char, String>,
}

impl RuleSet {
    /// Add a rule, replacing any existing rule for the same predecessor
    pub fn insert(&mut self, predecessor: char, successor: impl Into<String>) {
        self.rules.insert(predecessor, successor.into());
    }

    /// Get the successor for a symbol, if it has a rule
    pub fn get(&self, predecessor: char) -> Option<&str> {
        self.rules.get(&predecessor).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// Later pairs win over earlier ones with the same predecessor
impl<S: Into<String>> FromIterator<(char, S)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (char, S)>>(iter: I) -> Self {
        let mut rules = Self::default();
        for (predecessor, successor) in iter {
            rules.insert(predecessor, successor);
        }
        rules
    }
}

/// Expand an axiom by applying the rules `generations` times. Each generation
/// is one simultaneous left-to-right pass over the whole string: every symbol
/// is replaced by its successor (or copied if it has no rule), and the output
/// of one pass is the input of the next. Zero generations returns the axiom
/// unchanged.
///
/// There's no bound on output length here. Most interesting grammars grow
/// exponentially, so it's on the caller to keep `generations` sane.
pub fn rewrite(axiom: &str, rules: &RuleSet, generations: u32) -> String {
    let mut current = axiom.to_owned();
    for generation in 1..=generations {
        let mut next = String::with_capacity(current.len());
        for c in current.chars() {
            match rules.get(c) {
                Some(successor) => next.push_str(successor),
                None => next.push(c),
            }
        }
        trace!("Generation {}: {} symbols", generation, next.len());
        current = next;
    }
    current
}

/// The grammar half of an L-system: everything needed to produce the control
/// string, without any notion of how it gets drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LSystem {
    pub axiom: String,
    pub rules: RuleSet,
    pub generations: u32,
}

impl LSystem {
    pub fn new(
        axiom: impl Into<String>,
        rules: RuleSet,
        generations: u32,
    ) -> Self {
        Self {
            axiom: axiom.into(),
            rules,
            generations,
        }
    }

    /// Run the rewriting and return the final control string
    pub fn expand(&self) -> String {
        timed!(
            "L-system rewriting",
            rewrite(&self.axiom, &self.rules, self.generations)
        )
    }

    /// Expand the grammar, then trace the result with the given turtle
    pub fn draw<R: Rng + ?Sized>(
        &self,
        turtle: &Turtle,
        rng: &mut R,
    ) -> TurtleRun {
        let commands = self.expand();
        timed!("Turtle interpretation", turtle.interpret(rng, &commands))
    }
}

impl From<&LSystemConfig> for LSystem {
    fn from(config: &LSystemConfig) -> Self {
        Self::new(config.axiom.clone(), config.rules.clone(), config.generations)
    }
}

/// A fully generated L-system drawing: the polylines traced by the turtle,
/// plus the config that produced them. Generation is deterministic based on
/// the config, so the config alone is enough to reproduce the drawing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Drawing {
    config: LSystemConfig,
    /// Number of `]` symbols that were ignored because no branch was open
    unmatched_pops: usize,
    polylines: PolylineSet,
}

impl Drawing {
    /// Generate a drawing from the given config. Returns an error if the
    /// config is invalid.
    pub fn generate(config: LSystemConfig) -> anyhow::Result<Self> {
        info!("Generating L-system with config {:#?}", config);
        config.validate().context("invalid config")?;

        let lsystem = LSystem::from(&config);
        let turtle = Turtle::new(config.turtle);
        let mut rng = config.seed.rng();
        let run = timed!(
            "L-system generation",
            log::Level::Info,
            lsystem.draw(&turtle, &mut rng)
        );

        Ok(Self {
            config,
            unmatched_pops: run.unmatched_pops,
            polylines: run.polylines,
        })
    }

    /// Get a reference to the config that defines this drawing
    pub fn config(&self) -> &LSystemConfig {
        &self.config
    }

    pub fn polylines(&self) -> &PolylineSet {
        &self.polylines
    }

    pub fn into_polylines(self) -> PolylineSet {
        self.polylines
    }

    pub fn unmatched_pops(&self) -> usize {
        self.unmatched_pops
    }

    /// Serialize this drawing, config included, into JSON. Points are written
    /// as `[x, y, z]` arrays.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("error serializing drawing")
    }

    /// Deserialize a drawing from JSON, as written by [Drawing::to_json]
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("error deserializing drawing")
    }
}
