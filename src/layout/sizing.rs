// Weight-to-font-size mapping. Every function works on the normalized
// interval [0, 1] and is monotone there.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeFunction {
    /// Scales font 1:1 with weight.
    #[default]
    Linear,
    /// `sqrt(x)`: large sizes are reached early.
    Sqrt,
    /// `1 - sqrt(1 - x)`: large sizes are reached late.
    SqrtInverse,
}

impl SizeFunction {
    pub fn apply(self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        match self {
            SizeFunction::Linear => x,
            SizeFunction::Sqrt => x.sqrt(),
            SizeFunction::SqrtInverse => 1.0 - (1.0 - x).sqrt(),
        }
    }

    /// Font size for `weight` relative to the heaviest word in the set,
    /// clamped below at `min_size`.
    pub fn font_size(self, weight: u32, max_weight: u32, max_size: f32, min_size: f32) -> f32 {
        let normalized = if max_weight == 0 {
            0.0
        } else {
            weight as f32 / max_weight as f32
        };
        (max_size * self.apply(normalized)).max(min_size)
    }

    pub fn name(self) -> &'static str {
        match self {
            SizeFunction::Linear => "linear",
            SizeFunction::Sqrt => "sqrt",
            SizeFunction::SqrtInverse => "sqrtinverse",
        }
    }
}

impl FromStr for SizeFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(SizeFunction::Linear),
            "sqrt" => Ok(SizeFunction::Sqrt),
            "sqrtinverse" | "sqrt-inverse" | "sqrt_inverse" => Ok(SizeFunction::SqrtInverse),
            _ => Err(Error::UnknownSizeFunction(s.to_string())),
        }
    }
}

impl fmt::Display for SizeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SizeFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SizeFunction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_sizes_are_proportional_to_root_weight() {
        let big = SizeFunction::Sqrt.font_size(100, 100, 100.0, 0.0);
        let small = SizeFunction::Sqrt.font_size(25, 100, 100.0, 0.0);
        assert!((big - 100.0).abs() < 1e-4);
        assert!((small - 50.0).abs() < 1e-4);
    }

    #[test]
    fn min_size_clamps_small_weights() {
        let size = SizeFunction::Linear.font_size(1, 1000, 500.0, 10.0);
        assert_eq!(size, 10.0);
    }

    #[test]
    fn functions_are_monotone_and_pinned_at_ends() {
        for func in [
            SizeFunction::Linear,
            SizeFunction::Sqrt,
            SizeFunction::SqrtInverse,
        ] {
            assert_eq!(func.apply(0.0), 0.0, "{func}");
            assert!((func.apply(1.0) - 1.0).abs() < 1e-6, "{func}");
            let mut prev = 0.0;
            for i in 1..=20 {
                let value = func.apply(i as f32 / 20.0);
                assert!(value >= prev, "{func} not monotone at step {i}");
                prev = value;
            }
        }
    }

    #[test]
    fn sqrt_inverse_grows_late() {
        assert!(SizeFunction::SqrtInverse.apply(0.25) < SizeFunction::Linear.apply(0.25));
        assert!(SizeFunction::Sqrt.apply(0.25) > SizeFunction::Linear.apply(0.25));
    }

    #[test]
    fn parses_names_and_rejects_unknown() {
        assert_eq!("sqrt".parse::<SizeFunction>().unwrap(), SizeFunction::Sqrt);
        assert_eq!(
            "SqrtInverse".parse::<SizeFunction>().unwrap(),
            SizeFunction::SqrtInverse
        );
        assert!(matches!(
            "cubic".parse::<SizeFunction>(),
            Err(Error::UnknownSizeFunction(name)) if name == "cubic"
        ));
    }
}
