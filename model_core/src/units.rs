//! # Unit Types
//!
//! Type-safe wrappers for the length units a request may arrive in. The
//! generator works in metres internally; everything else is converted once,
//! in the normalizer, and never again.
//!
//! ## Example
//!
//! ```rust
//! use model_core::units::{Feet, LengthUnit, Meters, Millimeters};
//!
//! let wall: Meters = Millimeters(250.0).into();
//! assert_eq!(wall.0, 0.25);
//!
//! let bay: Meters = Feet(20.0).into();
//! assert!((bay.0 - 6.096).abs() < 1e-9);
//!
//! assert_eq!(LengthUnit::Millimeters.to_meters(3500.0), Meters(3.5));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Metres per international foot
pub const METERS_PER_FOOT: f64 = 0.3048;

// ============================================================================
// Length Units
// ============================================================================

/// Length in metres (canonical unit)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

impl From<Feet> for Meters {
    fn from(ft: Feet) -> Self {
        Meters(ft.0 * METERS_PER_FOOT)
    }
}

impl From<Meters> for Feet {
    fn from(m: Meters) -> Self {
        Feet(m.0 / METERS_PER_FOOT)
    }
}

/// Unit a request's lengths are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "ft")]
    Feet,
}

impl LengthUnit {
    pub const ALL: [LengthUnit; 3] = [LengthUnit::Meters, LengthUnit::Millimeters, LengthUnit::Feet];

    /// Unit symbol as used in requests
    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Meters => "m",
            LengthUnit::Millimeters => "mm",
            LengthUnit::Feet => "ft",
        }
    }

    /// Convert a raw value in this unit to metres
    pub fn to_meters(&self, value: f64) -> Meters {
        match self {
            LengthUnit::Meters => Meters(value),
            LengthUnit::Millimeters => Millimeters(value).into(),
            LengthUnit::Feet => Feet(value).into(),
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => Some(LengthUnit::Meters),
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => Some(LengthUnit::Millimeters),
            "ft" | "foot" | "feet" => Some(LengthUnit::Feet),
            _ => None,
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(Feet);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millimeters_to_meters() {
        let m: Meters = Millimeters(3500.0).into();
        assert_eq!(m.0, 3.5);
        let back: Millimeters = m.into();
        assert_eq!(back.0, 3500.0);
    }

    #[test]
    fn test_feet_to_meters() {
        let m: Meters = Feet(10.0).into();
        assert!((m.0 - 3.048).abs() < 1e-12);
    }

    #[test]
    fn test_unit_symbols_roundtrip() {
        for unit in LengthUnit::ALL {
            assert_eq!(LengthUnit::from_str_flexible(unit.symbol()), Some(unit));
        }
        assert_eq!(LengthUnit::from_str_flexible("furlong"), None);
    }

    #[test]
    fn test_arithmetic() {
        let a = Meters(6.0);
        let b = Meters(2.0);
        assert_eq!((a + b).0, 8.0);
        assert_eq!((a - b).0, 4.0);
        assert_eq!((a * 2.0).value(), 12.0);
        assert_eq!((a / 2.0).value(), 3.0);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&LengthUnit::Millimeters).unwrap();
        assert_eq!(json, "\"mm\"");
        let m: Meters = serde_json::from_str("12.5").unwrap();
        assert_eq!(m, Meters(12.5));
    }
}
