use derive_more::Display;
use fnv::FnvHasher;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    convert::TryInto,
    fmt,
    hash::{Hash, Hasher},
};

/// Seed for the random stream that drives every stochastic step of a
/// generation run: sampled turtle angles and step lengths, random elevation
/// maps, diamond-square displacement, and noise function seeds. Two runs with
/// the same config and the same seed produce identical geometry.
///
/// A seed is either a plain integer or arbitrary text. Text is hashed (FNV-1a)
/// into a `u64` when the RNG is built, which lets configs use memorable seeds
/// like `"bonsai forest"`.
///
/// When deserializing, integers that fit in a `u64` are used as-is, strings
/// that parse as a `u64` become integer seeds, and any other string is kept
/// as text. Anything else (negative numbers, floats, bools, ...) is an error.
///
/// Seeds always serialize as a **string**, since JSON and TOML can't reliably
/// carry a full 64-bit unsigned integer. The string parses back into the same
/// seed on the next load.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum Seed {
    /// An integer seed, which can be used directly
    Int(u64),
    /// A textual seed, which will be hashed into a u64 before use
    Text(String),
}

impl Seed {
    /// Convert the seed to a `u64`, so it can actually be used to seed an RNG
    pub fn to_u64(&self) -> u64 {
        match self {
            Self::Int(seed) => *seed,
            Self::Text(text) => {
                let mut hasher = FnvHasher::default();
                text.hash(&mut hasher);
                hasher.finish()
            }
        }
    }

    /// Build a fresh random stream from this seed. Every generation run owns
    /// exactly one of these and threads it through all of its steps.
    pub fn rng(&self) -> Pcg64 {
        Pcg64::seed_from_u64(self.to_u64())
    }
}

/// A random seed. Danger! This means the default varies between calls, so any
/// config built from defaults is not reproducible unless the seed is logged.
impl Default for Seed {
    fn default() -> Self {
        Self::Int(rand::random())
    }
}

impl From<u64> for Seed {
    fn from(seed: u64) -> Self {
        Self::Int(seed)
    }
}

// Parse as an int if possible, otherwise keep the raw text to be hashed later
impl From<&str> for Seed {
    fn from(seed_str: &str) -> Self {
        match seed_str.parse::<u64>() {
            Ok(seed) => Self::Int(seed),
            Err(_) => Self::Text(seed_str.into()),
        }
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        // Seeds can come from several input types, so no type hint here
        deserializer.deserialize_any(SeedVisitor)
    }
}

/// Generates a visit method for an integer type, rejecting values that don't
/// fit in a `u64`
macro_rules! impl_visit_int {
    ($fname:ident, $type:ty) => {
        fn $fname<E>(self, value: $type) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value
                .try_into()
                .map(Seed::Int)
                .map_err(|_| E::custom(format!("u64 out of range: {}", value)))
        }
    };
}

struct SeedVisitor;

impl<'de> Visitor<'de> for SeedVisitor {
    type Value = Seed;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a positive integer or string")
    }

    impl_visit_int!(visit_u8, u8);
    impl_visit_int!(visit_u16, u16);
    impl_visit_int!(visit_u32, u32);
    impl_visit_int!(visit_u64, u64);
    impl_visit_int!(visit_u128, u128);
    impl_visit_int!(visit_i8, i8);
    impl_visit_int!(visit_i16, i16);
    impl_visit_int!(visit_i32, i32);
    impl_visit_int!(visit_i64, i64);
    impl_visit_int!(visit_i128, i128);

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use serde_test::{
        assert_de_tokens, assert_de_tokens_error, assert_ser_tokens, Token,
    };

    #[test]
    fn test_from_str() {
        assert_eq!(Seed::from("100"), Seed::Int(100));
        assert_eq!(Seed::from("koch"), Seed::Text("koch".into()));
        // Doesn't fit in a u64, so it's just text
        assert_eq!(Seed::from("-5"), Seed::Text("-5".into()));
    }

    #[test]
    fn test_to_u64() {
        assert_eq!(Seed::Int(100).to_u64(), 100);
        assert_eq!(Seed::Text("koch".into()).to_u64(), 17362166698525318673);
        assert_eq!(
            Seed::Text("bonsai forest".into()).to_u64(),
            17107330663728670833
        );
    }

    fn first_draws(seed: &Seed) -> Vec<u32> {
        let mut rng = seed.rng();
        (0..8).map(|_| rng.gen()).collect()
    }

    /// Same seed has to give the same stream, or nothing is reproducible
    #[test]
    fn test_rng_reproducible() {
        let seed = Seed::from("bonsai forest");
        assert_eq!(first_draws(&seed), first_draws(&seed));
        assert_ne!(first_draws(&seed), first_draws(&Seed::Int(1)));
    }

    #[test]
    fn test_serialize() {
        assert_ser_tokens(&Seed::Int(100), &[Token::String("100")]);
        assert_ser_tokens(&Seed::Text("koch".into()), &[Token::String("koch")]);
    }

    #[test]
    fn test_deserialize() {
        assert_de_tokens(&Seed::Int(100), &[Token::U64(100)]);
        assert_de_tokens(&Seed::Int(100), &[Token::String("100")]);
        assert_de_tokens(&Seed::Text("koch".into()), &[Token::String("koch")]);

        assert_de_tokens_error::<Seed>(
            &[Token::I64(-3)],
            "u64 out of range: -3",
        );
        assert_de_tokens_error::<Seed>(
            &[Token::Bool(true)],
            "invalid type: boolean `true`, \
            expected a positive integer or string",
        );
    }
}
