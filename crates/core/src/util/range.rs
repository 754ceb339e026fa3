use anyhow::anyhow;
use derive_more::Display;
use rand::{
    distributions::uniform::{SampleRange, SampleUniform, UniformSampler},
    RngCore,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Debug, Display},
    ops,
};

/// A type of value that we can create ranges of, where a range has a min and
/// max. In practice this is just the float types, but keeping it generic lets
/// the range math stay agnostic of precision.
pub trait Rangeable:
    Copy
    + Debug
    + Display
    + PartialOrd
    + ops::Add<Self, Output = Self>
    + ops::Sub<Self, Output = Self>
    + ops::Mul<Self, Output = Self>
    + ops::Div<Self, Output = Self>
{
    fn zero() -> Self;
    fn one() -> Self;
}

impl Rangeable for f32 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }
}

impl Rangeable for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }
}

/// A range between two numeric values, inclusive on both ends. Used for
/// elevation bounds, and as the `[min, max]` interval that stochastic
/// parameters (angles, step distances, noise amplitudes) are drawn from.
///
/// Serializes as `{ min, max }`.
#[derive(Copy, Clone, Debug, Display, PartialEq, Serialize, Deserialize)]
#[display(fmt = "[{}, {}]", min, max)]
pub struct NumRange<T: Rangeable = f64> {
    pub min: T,
    pub max: T,
}

impl<T: Rangeable> NumRange<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Get a [0,1] range for this type.
    pub fn normal_range() -> Self {
        Self::new(T::zero(), T::one())
    }

    /// Create a [RangeValue] in this range, which is convenient for chaining
    /// operations on a single value.
    pub fn value(self, value: T) -> RangeValue<T> {
        RangeValue { value, range: self }
    }

    /// Max minus min
    pub fn span(&self) -> T {
        self.max - self.min
    }

    /// Is the lower bound at or below the upper bound?
    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    /// Check if a value is in this range. Ranges are inclusive on both ends.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Checks if the value is in this range. If it isn't, return an error.
    pub fn ensure_contains(&self, value: T) -> anyhow::Result<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(anyhow!("value {} is not in range {}", value, self))
        }
    }

    /// Scale both bounds by the same factor.
    pub fn scale(&self, factor: T) -> Self {
        Self::new(self.min * factor, self.max * factor)
    }

    /// Map a value from this range to the target range. If the span of this
    /// range is zero, we can't properly map the value because we don't know
    /// where on the target range it should fall. In that case, we just always
    /// return the **minimum** of the target range.
    pub fn map_to(&self, dest_range: &Self, value: T) -> T {
        let span = self.span();
        if span > T::zero() {
            // Map down to [0,1], then map back up to the target range
            let normalized = (value - self.min) / span;
            dest_range.min + (normalized * dest_range.span())
        } else {
            dest_range.min
        }
    }

    /// Map a value from this range to the range [0, 1]
    pub fn normalize(&self, value: T) -> T {
        self.map_to(&Self::normal_range(), value)
    }

    /// Force a value into this range. If it's already in the range, return
    /// that value. If it's outside the range, return the bound (lower or upper)
    /// that's closest to the value.
    pub fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Smallest range that covers every value in the iterator. Returns `None`
    /// for an empty iterator.
    pub fn covering(values: impl IntoIterator<Item = T>) -> Option<Self> {
        values.into_iter().fold(None, |acc, value| match acc {
            None => Some(Self::new(value, value)),
            Some(range) => Some(Self::new(
                if value < range.min { value } else { range.min },
                if value > range.max { value } else { range.max },
            )),
        })
    }
}

// allow generating samples in the range
impl<T: Rangeable + SampleUniform> SampleRange<T> for NumRange<T> {
    #[inline]
    fn sample_single<R: RngCore + ?Sized>(self, rng: &mut R) -> T {
        T::Sampler::sample_single_inclusive(self.min, self.max, rng)
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

/// An alternative interface for [NumRange] that makes it easy to chain
/// operations on a single value.
///
/// ```
/// use morphogen::NumRange;
///
/// let range: NumRange<f64> = NumRange::new(10.0, 20.0);
/// let value = range.value(15.0).normalize().apply(|x| x + 1.0).inner();
/// assert_eq!(value, 1.5);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct RangeValue<T: Rangeable> {
    value: T,
    range: NumRange<T>,
}

impl<T: Rangeable> RangeValue<T> {
    /// Get the value from this struct
    pub fn inner(self) -> T {
        self.value
    }

    /// Map this value to the range [0,1]
    pub fn normalize(self) -> Self {
        self.map_to(NumRange::normal_range())
    }

    /// Map this value from the current range to a new range.
    pub fn map_to(self, range: NumRange<T>) -> Self {
        let new_value = self.range.map_to(&range, self.value);
        Self {
            range,
            value: new_value,
        }
    }

    /// Force the given value into this range. If it falls outside the range,
    /// it will be set to the nearer of the two bounds.
    pub fn clamp(self) -> Self {
        Self {
            value: self.range.clamp(self.value),
            range: self.range,
        }
    }

    /// Apply the given mapping function to this value. The value will be
    /// replaced with the output of the function.
    pub fn apply(self, f: impl FnOnce(T) -> T) -> Self {
        Self {
            value: f(self.value),
            range: self.range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    #[test]
    fn test_span() {
        let range: NumRange<f64> = NumRange::new(-10.0, 30.0);
        assert_approx_eq!(range.span(), 40.0);
        assert!(range.is_ordered());
        assert!(!NumRange::new(1.0, 0.0).is_ordered());
    }

    #[test]
    fn test_contains() {
        let range: NumRange<f64> = NumRange::new(1.0, 3.0);
        assert!(!range.contains(0.9));
        assert!(range.contains(1.0));
        assert!(range.contains(3.0));
        assert!(!range.contains(3.1));
        assert!(range.ensure_contains(2.0).is_ok());
        assert!(range.ensure_contains(5.0).is_err());
    }

    #[test]
    fn test_map_to() {
        let input_range: NumRange<f64> = NumRange::new(-1.0, 1.0);
        let output_range: NumRange<f64> = NumRange::new(-50.0, 50.0);
        assert_approx_eq!(input_range.map_to(&output_range, -1.0), -50.0);
        assert_approx_eq!(input_range.map_to(&output_range, 0.0), 0.0);
        assert_approx_eq!(input_range.map_to(&output_range, 0.5), 25.0);
        assert_approx_eq!(input_range.map_to(&output_range, 2.0), 100.0);

        // Zero-length source span always maps to the min of the target
        let flat: NumRange<f64> = NumRange::new(4.0, 4.0);
        assert_approx_eq!(flat.map_to(&output_range, 4.0), -50.0);
        assert_approx_eq!(flat.normalize(7.0), 0.0);
    }

    #[test]
    fn test_clamp_and_chain() {
        let range: NumRange<f64> = NumRange::new(-1.0, 1.0);
        assert_approx_eq!(range.clamp(-3.0), -1.0);
        assert_approx_eq!(range.clamp(0.25), 0.25);
        let value = range
            .value(1.4)
            .clamp()
            .map_to(NumRange::new(0.0, 10.0))
            .inner();
        assert_approx_eq!(value, 10.0);
    }

    #[test]
    fn test_covering() {
        assert_eq!(NumRange::<f64>::covering(vec![]), None);
        assert_eq!(
            NumRange::covering(vec![2.0, -3.0, 7.5, 0.0]),
            Some(NumRange::new(-3.0, 7.5))
        );
        assert_eq!(
            NumRange::covering(vec![1.0]),
            Some(NumRange::new(1.0, 1.0))
        );
    }

    #[test]
    fn test_sample() {
        let mut rng = Pcg64::seed_from_u64(7);
        let range: NumRange<f64> = NumRange::new(20.0, 40.0);
        for _ in 0..1000 {
            assert!(range.contains(rng.gen_range(range)));
        }

        // Degenerate range always yields its only value
        let point: NumRange<f64> = NumRange::new(2.5, 2.5);
        assert_approx_eq!(rng.gen_range(point), 2.5);
    }
}
