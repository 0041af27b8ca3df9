use std::fmt;

use derive_more::{Display, Into};

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn saturating_add(self, value: u32) -> Self {
        Self(self.0.saturating_add(value).min(999))
    }
}

impl From<Reps> for f32 {
    fn from(value: Reps) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let reps = value.0 as f32;
        reps
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
}

/// Load of a set in the user's unit of choice.
#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd, serde::Serialize)]
pub struct Weight(f32);

impl Weight {
    pub const ZERO: Weight = Weight(0.0);
    const MAX: f32 = 999.75;

    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !value.is_finite() || !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        Ok(Self(value))
    }

    /// A weight from an arbitrary value, clamped to the valid range.
    #[must_use]
    pub fn clamped(value: f32) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, Self::MAX))
    }

    /// Round to the nearest multiple of `step`, staying within the valid range.
    #[must_use]
    pub fn rounded(self, step: f32) -> Self {
        if step <= 0.0 {
            return self;
        }
        Self(((self.0 / step).round() * step).clamp(0.0, Self::MAX))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9")]
    OutOfRange,
}

/// Rate of perceived exertion, stored in tenths.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RPE(u8);

impl RPE {
    pub const ZERO: RPE = RPE(0);
    pub const ONE: RPE = RPE(10);
    pub const TWO: RPE = RPE(20);
    pub const THREE: RPE = RPE(30);
    pub const FOUR: RPE = RPE(40);
    pub const FIVE: RPE = RPE(50);
    pub const SIX: RPE = RPE(60);
    pub const SEVEN: RPE = RPE(70);
    pub const EIGHT: RPE = RPE(80);
    pub const NINE: RPE = RPE(90);
    pub const TEN: RPE = RPE(100);

    pub fn new(value: f32) -> Result<Self, RPEError> {
        if !(0.0..=10.0).contains(&value) {
            return Err(RPEError::OutOfRange);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let v = (value * 10.0).round() as u8;

        if v % 5 != 0 {
            return Err(RPEError::InvalidResolution);
        }

        Ok(Self(v))
    }

    /// The closest valid RPE to an arbitrary value, clamped to the scale.
    #[must_use]
    pub fn nearest(value: f32) -> Self {
        if value.is_nan() {
            return RPE::ZERO;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let halves = (value.clamp(0.0, 10.0) * 2.0).round() as u8;
        Self(halves * 5)
    }
}

impl From<RPE> for f32 {
    fn from(value: RPE) -> Self {
        f32::from(value.0) / 10.0
    }
}

impl fmt::Display for RPE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", f32::from(*self))
    }
}

impl serde::Serialize for RPE {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(f32::from(*self))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RPEError {
    #[error("RPE must be in the range 0.0 to 10.0")]
    OutOfRange,
    #[error("RPE must be a multiple of 0.5")]
    InvalidResolution,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, Ok(Reps(0)))]
    #[case(999, Ok(Reps(999)))]
    #[case(1000, Err(RepsError::OutOfRange))]
    fn test_reps_new(#[case] input: u32, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::new(input), expected);
    }

    #[rstest]
    #[case(Reps(8), 1, Reps(9))]
    #[case(Reps(999), 1, Reps(999))]
    fn test_reps_saturating_add(#[case] reps: Reps, #[case] value: u32, #[case] expected: Reps) {
        assert_eq!(reps.saturating_add(value), expected);
    }

    #[rstest]
    #[case(0.0, Ok(Weight(0.0)))]
    #[case(137.5, Ok(Weight(137.5)))]
    #[case(999.9, Ok(Weight(999.9)))]
    #[case(1000.0, Err(WeightError::OutOfRange))]
    #[case(-2.5, Err(WeightError::OutOfRange))]
    #[case(f32::NAN, Err(WeightError::OutOfRange))]
    fn test_weight_new(#[case] input: f32, #[case] expected: Result<Weight, WeightError>) {
        assert_eq!(Weight::new(input), expected);
    }

    #[rstest]
    #[case(137.5, Weight(137.5))]
    #[case(-1.0, Weight(0.0))]
    #[case(2000.0, Weight(999.75))]
    #[case(f32::NAN, Weight(0.0))]
    fn test_weight_clamped(#[case] value: f32, #[case] expected: Weight) {
        assert_eq!(Weight::clamped(value), expected);
    }

    #[rstest]
    #[case(Weight(121.5), 0.25, Weight(121.5))]
    #[case(Weight(121.6), 0.25, Weight(121.5))]
    #[case(Weight(121.4), 0.25, Weight(121.5))]
    #[case(Weight(40.5), 2.5, Weight(40.0))]
    #[case(Weight(40.5), 0.0, Weight(40.5))]
    fn test_weight_rounded(#[case] weight: Weight, #[case] step: f32, #[case] expected: Weight) {
        assert_eq!(weight.rounded(step), expected);
    }

    #[rstest]
    #[case(Weight(2.0), "2")]
    #[case(Weight(137.5), "137.5")]
    fn test_weight_display(#[case] input: Weight, #[case] expected: &str) {
        assert_eq!(input.to_string(), expected);
    }

    #[rstest]
    #[case(0.0, Ok(RPE::ZERO))]
    #[case(8.0, Ok(RPE::EIGHT))]
    #[case(9.5, Ok(RPE(95)))]
    #[case(10.0, Ok(RPE::TEN))]
    #[case(10.5, Err(RPEError::OutOfRange))]
    #[case(7.2, Err(RPEError::InvalidResolution))]
    fn test_rpe_new(#[case] input: f32, #[case] expected: Result<RPE, RPEError>) {
        assert_eq!(RPE::new(input), expected);
    }

    #[rstest]
    #[case(8.0, RPE::EIGHT)]
    #[case(7.4, RPE(75))]
    #[case(7.2, RPE::SEVEN)]
    #[case(12.0, RPE::TEN)]
    #[case(-1.0, RPE::ZERO)]
    fn test_rpe_nearest(#[case] input: f32, #[case] expected: RPE) {
        assert_eq!(RPE::nearest(input), expected);
    }

    #[rstest]
    #[case(RPE::EIGHT, "8")]
    #[case(RPE(95), "9.5")]
    fn test_rpe_display(#[case] input: RPE, #[case] expected: &str) {
        assert_eq!(input.to_string(), expected);
    }
}
