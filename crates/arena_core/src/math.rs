//! Fixed-point math utilities for deterministic combat resolution.
//!
//! Multipliers, chances and rule factors are fractional, but every
//! resolved quantity (damage, healing, HP, resources) is an integer. Using
//! fixed-point for the fractional side keeps floor/ceil behaviour identical
//! on every platform.

use fixed::types::I32F32;

/// Fixed-point number type for all fractional combat math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Template and rule files are edited by hand, so values are written as
/// plain decimal numbers (`1.5`, `0.05`) rather than raw bits. Every value
/// below 2^21 survives the round trip through `f64` exactly.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| serde::de::Error::custom(format!("value {value} out of range")))
    }
}

/// Serde support for `Option<Fixed>`.
pub mod option_fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&v.to_num::<f64>()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<f64>::deserialize(deserializer)?;
        opt.map(|value| {
            Fixed::checked_from_num(value)
                .ok_or_else(|| serde::de::Error::custom(format!("value {value} out of range")))
        })
        .transpose()
    }
}

/// `floor(value)` as an integer, saturating at the `i32` range.
#[must_use]
pub fn floor_i32(value: Fixed) -> i32 {
    value.floor().saturating_to_num::<i32>()
}

/// `ceil(value)` as an unsigned integer, saturating at the `u32` range.
#[must_use]
pub fn ceil_u32(value: Fixed) -> u32 {
    value
        .checked_ceil()
        .map_or(u32::MAX, |v| v.saturating_to_num::<u32>())
}

/// Multiply an integer by a fixed-point factor and floor the result.
#[must_use]
pub fn scale_floor(amount: i32, factor: Fixed) -> i32 {
    floor_i32(Fixed::from_num(amount).saturating_mul(factor))
}

/// Convert a percentage (`0..=100`) to a fraction (`0..=1`).
#[must_use]
pub fn percent_to_fraction(percent: Fixed) -> Fixed {
    percent / Fixed::from_num(100)
}
