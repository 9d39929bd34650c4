//! # Materials and Sections
//!
//! Concrete grades per EN 1992-1-1 Table 3.1 and the rectangular section
//! definitions members are assigned to.
//!
//! Elastic moduli are stored in kN/m² so the values drop straight into the
//! analysis tables without further conversion.
//!
//! ## Example
//!
//! ```rust
//! use model_core::materials::{ConcreteGrade, SectionKind, Section};
//!
//! let grade = ConcreteGrade::from_str_flexible("c30/37").unwrap();
//! assert_eq!(grade.properties().fck_mpa, 30.0);
//!
//! let wall = Section::rectangle(SectionKind::Wall, grade.code(), 1.0, 0.25);
//! assert_eq!(wall.id, "SW250");
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{GenError, GenResult};
use crate::units::{Meters, Millimeters};

/// Poisson's ratio for uncracked concrete
pub const CONCRETE_POISSON: f64 = 0.2;

/// Coefficient of thermal expansion (1/°C)
pub const CONCRETE_THERMAL_COEFF: f64 = 1.0e-5;

/// Unit weight of reinforced concrete (kN/m³)
pub const CONCRETE_UNIT_WEIGHT: f64 = 25.0;

/// Concrete strength classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConcreteGrade {
    #[serde(rename = "C25/30")]
    C25,
    #[default]
    #[serde(rename = "C30/37")]
    C30,
    #[serde(rename = "C35/45")]
    C35,
    #[serde(rename = "C40/50")]
    C40,
    #[serde(rename = "C50/60")]
    C50,
}

/// Mechanical properties of a concrete grade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcreteProperties {
    /// Characteristic cylinder strength fck (MPa)
    pub fck_mpa: f64,
    /// Secant modulus of elasticity Ecm (kN/m²)
    pub e_kn_m2: f64,
    /// Shear modulus G (kN/m²)
    pub g_kn_m2: f64,
    /// Poisson's ratio
    pub poisson: f64,
    /// Thermal expansion coefficient (1/°C)
    pub thermal_coeff: f64,
    /// Unit weight (kN/m³)
    pub unit_weight_kn_m3: f64,
}

impl ConcreteGrade {
    /// All grades for listing
    pub const ALL: [ConcreteGrade; 5] = [
        ConcreteGrade::C25,
        ConcreteGrade::C30,
        ConcreteGrade::C35,
        ConcreteGrade::C40,
        ConcreteGrade::C50,
    ];

    /// Grade identifier, also used as the material id in exported tables
    pub fn code(&self) -> &'static str {
        match self {
            ConcreteGrade::C25 => "C25/30",
            ConcreteGrade::C30 => "C30/37",
            ConcreteGrade::C35 => "C35/45",
            ConcreteGrade::C40 => "C40/50",
            ConcreteGrade::C50 => "C50/60",
        }
    }

    /// Parse from common string representations ("C30/37", "c30", "C30-37")
    pub fn from_str_flexible(s: &str) -> GenResult<Self> {
        let normalized = s.trim().to_uppercase().replace(['-', '_', ' '], "/");
        let head = normalized.split('/').next().unwrap_or("");
        match head {
            "C25" => Ok(ConcreteGrade::C25),
            "C30" => Ok(ConcreteGrade::C30),
            "C35" => Ok(ConcreteGrade::C35),
            "C40" => Ok(ConcreteGrade::C40),
            "C50" => Ok(ConcreteGrade::C50),
            _ => Err(GenError::validation(
                "concrete_grade",
                s,
                format!(
                    "Unknown concrete grade; expected one of {}",
                    Self::ALL.iter().map(|g| g.code()).collect::<Vec<_>>().join(", ")
                ),
            )),
        }
    }

    /// Reference properties (EN 1992-1-1 Table 3.1)
    pub fn properties(&self) -> ConcreteProperties {
        let (fck_mpa, ecm_gpa) = match self {
            ConcreteGrade::C25 => (25.0, 31.0),
            ConcreteGrade::C30 => (30.0, 33.0),
            ConcreteGrade::C35 => (35.0, 34.0),
            ConcreteGrade::C40 => (40.0, 35.0),
            ConcreteGrade::C50 => (50.0, 37.0),
        };
        let e_kn_m2 = ecm_gpa * 1.0e6;
        ConcreteProperties {
            fck_mpa,
            e_kn_m2,
            g_kn_m2: e_kn_m2 / (2.0 * (1.0 + CONCRETE_POISSON)),
            poisson: CONCRETE_POISSON,
            thermal_coeff: CONCRETE_THERMAL_COEFF,
            unit_weight_kn_m3: CONCRETE_UNIT_WEIGHT,
        }
    }
}

impl std::fmt::Display for ConcreteGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A material row in the assembled model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub grade: ConcreteGrade,
    pub properties: ConcreteProperties,
}

impl Material {
    pub fn concrete(grade: ConcreteGrade) -> Self {
        Material {
            id: grade.code().to_string(),
            grade,
            properties: grade.properties(),
        }
    }
}

/// Member family a section is defined for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Wall,
    Slab,
    Column,
    Beam,
}

impl SectionKind {
    /// Section type label used in the exported tables
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Wall => "Shell-Wall",
            SectionKind::Slab => "Shell-Slab",
            SectionKind::Column => "Frame-Column",
            SectionKind::Beam => "Frame-Beam",
        }
    }
}

/// Rectangular section definition.
///
/// For shells `depth_m` is the thickness and `width_m` is a unit strip (1 m);
/// for frames it is the full cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub kind: SectionKind,
    /// Material id (foreign key into the material table)
    pub material: String,
    pub width_m: f64,
    pub depth_m: f64,
}

impl Section {
    /// Build a rectangular section with a deterministic id derived from its
    /// dimensions in whole millimetres.
    pub fn rectangle(kind: SectionKind, material: &str, width_m: f64, depth_m: f64) -> Self {
        let mm = |m: f64| Millimeters::from(Meters(m)).value().round() as i64;
        let id = match kind {
            SectionKind::Wall => format!("SW{}", mm(depth_m)),
            SectionKind::Slab => format!("SLAB{}", mm(depth_m)),
            SectionKind::Column => format!("COL{}X{}", mm(width_m), mm(depth_m)),
            SectionKind::Beam => format!("BM{}X{}", mm(width_m), mm(depth_m)),
        };
        Section {
            id,
            kind,
            material: material.to_string(),
            width_m,
            depth_m,
        }
    }

    /// Cross-section area (m²; per metre run for shells)
    pub fn area(&self) -> f64 {
        self.width_m * self.depth_m
    }

    /// Strong-axis second moment of area I33 (m⁴)
    pub fn i33(&self) -> f64 {
        self.width_m * self.depth_m.powi(3) / 12.0
    }

    /// Weak-axis second moment of area I22 (m⁴)
    pub fn i22(&self) -> f64 {
        self.depth_m * self.width_m.powi(3) / 12.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_parsing() {
        assert_eq!(ConcreteGrade::from_str_flexible("C30/37").unwrap(), ConcreteGrade::C30);
        assert_eq!(ConcreteGrade::from_str_flexible("c40").unwrap(), ConcreteGrade::C40);
        assert_eq!(ConcreteGrade::from_str_flexible("C25-30").unwrap(), ConcreteGrade::C25);

        match ConcreteGrade::from_str_flexible("C99") {
            Err(GenError::Validation { field, .. }) => assert_eq!(field, "concrete_grade"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_grade_codes_roundtrip() {
        for grade in ConcreteGrade::ALL {
            assert_eq!(ConcreteGrade::from_str_flexible(grade.code()).unwrap(), grade);
            let json = serde_json::to_string(&grade).unwrap();
            assert_eq!(json, format!("\"{}\"", grade.code()));
        }
    }

    #[test]
    fn test_shear_modulus() {
        let props = ConcreteGrade::C30.properties();
        assert_eq!(props.e_kn_m2, 33.0e6);
        assert!((props.g_kn_m2 - 13.75e6).abs() < 1.0);
    }

    #[test]
    fn test_section_ids() {
        assert_eq!(Section::rectangle(SectionKind::Wall, "C30/37", 1.0, 0.25).id, "SW250");
        assert_eq!(Section::rectangle(SectionKind::Slab, "C30/37", 1.0, 0.2).id, "SLAB200");
        assert_eq!(Section::rectangle(SectionKind::Column, "C30/37", 0.4, 0.4).id, "COL400X400");
        assert_eq!(Section::rectangle(SectionKind::Beam, "C30/37", 0.3, 0.6).id, "BM300X600");
    }

    #[test]
    fn test_section_properties() {
        let beam = Section::rectangle(SectionKind::Beam, "C30/37", 0.3, 0.6);
        assert!((beam.area() - 0.18).abs() < 1e-12);
        assert!((beam.i33() - 0.0054).abs() < 1e-12);
        assert!((beam.i22() - 0.00135).abs() < 1e-12);
    }
}
