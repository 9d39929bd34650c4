//! # Building Parameters
//!
//! The request a caller hands to the generator, and the normalizer that turns
//! it into the canonical, validated copy every downstream component consumes.
//!
//! Normalization is a pure function: it converts all lengths to metres,
//! resolves the material grade, and rejects anything out of range with a
//! [`GenError::Validation`] naming the offending field.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "floors": 7,
//!   "length": 30.0,
//!   "width": 12.0,
//!   "floor_height": 3.5,
//!   "wall_thickness": 0.25,
//!   "structural_system": "shear_wall",
//!   "shear_wall_ratio": 0.25,
//!   "concrete_grade": "C30/37",
//!   "design_code": "ASCE7-22-LRFD"
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use model_core::params::{normalize, BuildingParameters};
//!
//! let params = BuildingParameters {
//!     floors: 0,
//!     ..BuildingParameters::default()
//! };
//! let err = normalize(&params).unwrap_err();
//! assert!(err.to_string().contains("floors"));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{GenError, GenResult};
use crate::materials::ConcreteGrade;
use crate::units::LengthUnit;

/// Upper bound on the floor count; anything above is a configuration error
pub const MAX_FLOORS: i64 = 500;

/// Largest accepted plan dimension (m); beyond this the grid would not fit
/// in memory
pub const MAX_PLAN_DIMENSION_M: f64 = 300.0;

/// Slab thickness used when the request does not give one (m)
pub const DEFAULT_SLAB_THICKNESS_M: f64 = 0.20;

/// Lateral-load-resisting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralSystem {
    /// Reinforced concrete shear walls carry all lateral load
    #[default]
    ShearWall,
    /// Beams and columns with rigid joints, no walls
    MomentFrame,
    /// Shear walls plus a moment frame
    Dual,
}

impl StructuralSystem {
    pub const ALL: [StructuralSystem; 3] = [
        StructuralSystem::ShearWall,
        StructuralSystem::MomentFrame,
        StructuralSystem::Dual,
    ];

    /// Identifier as used in requests
    pub fn code(&self) -> &'static str {
        match self {
            StructuralSystem::ShearWall => "shear_wall",
            StructuralSystem::MomentFrame => "moment_frame",
            StructuralSystem::Dual => "dual",
        }
    }

    /// Whether the system places shear walls (and therefore needs a ratio)
    pub fn has_walls(&self) -> bool {
        matches!(self, StructuralSystem::ShearWall | StructuralSystem::Dual)
    }

    /// Whether the system places columns and beams
    pub fn has_frame(&self) -> bool {
        matches!(self, StructuralSystem::MomentFrame | StructuralSystem::Dual)
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> GenResult<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "shear_wall" | "shearwall" | "wall" => Ok(StructuralSystem::ShearWall),
            "moment_frame" | "momentframe" | "frame" => Ok(StructuralSystem::MomentFrame),
            "dual" | "dual_system" => Ok(StructuralSystem::Dual),
            _ => Err(GenError::validation(
                "structural_system",
                s,
                "Expected one of shear_wall, moment_frame, dual",
            )),
        }
    }
}

impl std::fmt::Display for StructuralSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Surface load intensities (kN/m²) used to describe the load cases
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadIntensities {
    /// Superimposed dead load on top of self-weight
    pub superimposed_dead: f64,
    /// Floor live load
    pub live: f64,
    /// Design wind pressure on the facade
    pub wind_pressure: f64,
}

impl Default for LoadIntensities {
    fn default() -> Self {
        LoadIntensities {
            superimposed_dead: 1.5,
            live: 2.0,
            wind_pressure: 1.0,
        }
    }
}

/// Raw generation request.
///
/// Lengths are in `units`; `slab_thickness` falls back to 0.20 m.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingParameters {
    /// Number of floors (stories above base)
    pub floors: i64,
    /// Plan dimension along X
    pub length: f64,
    /// Plan dimension along Y
    pub width: f64,
    /// Floor-to-floor height
    pub floor_height: f64,
    /// Shear wall thickness
    pub wall_thickness: f64,
    /// Floor slab thickness
    #[serde(default)]
    pub slab_thickness: Option<f64>,
    /// Unit of every length above
    #[serde(default)]
    pub units: LengthUnit,
    #[serde(default)]
    pub structural_system: StructuralSystem,
    /// Target coverage ratio; required for shear_wall and dual
    #[serde(default)]
    pub shear_wall_ratio: Option<f64>,
    /// Concrete grade identifier (e.g. "C30/37")
    #[serde(default = "default_concrete_grade")]
    pub concrete_grade: String,
    /// Design-code profile identifier (e.g. "ASCE7-22-LRFD")
    #[serde(default = "default_design_code")]
    pub design_code: String,
    #[serde(default)]
    pub loads: LoadIntensities,
}

fn default_concrete_grade() -> String {
    ConcreteGrade::default().code().to_string()
}

fn default_design_code() -> String {
    crate::loads::DEFAULT_PROFILE_ID.to_string()
}

impl BuildingParameters {
    /// The predefined reference building: 10 floors, 36 m x 12 m, 4.0 m
    /// floor height, 0.30 m walls, 0.20 m slabs, ratio 0.25.
    pub fn reference_building() -> Self {
        BuildingParameters {
            floors: 10,
            length: 36.0,
            width: 12.0,
            floor_height: 4.0,
            wall_thickness: 0.30,
            slab_thickness: Some(0.20),
            units: LengthUnit::Meters,
            structural_system: StructuralSystem::ShearWall,
            shear_wall_ratio: Some(0.25),
            concrete_grade: default_concrete_grade(),
            design_code: default_design_code(),
            loads: LoadIntensities::default(),
        }
    }
}

impl Default for BuildingParameters {
    fn default() -> Self {
        BuildingParameters::reference_building()
    }
}

/// Validated, canonical parameters (all lengths in metres).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedParameters {
    pub floors: u32,
    pub length_m: f64,
    pub width_m: f64,
    pub floor_height_m: f64,
    pub wall_thickness_m: f64,
    pub slab_thickness_m: f64,
    pub structural_system: StructuralSystem,
    /// Present exactly when the system places walls
    pub shear_wall_ratio: Option<f64>,
    pub concrete_grade: ConcreteGrade,
    pub design_code: String,
    pub loads: LoadIntensities,
}

impl NormalizedParameters {
    /// Floor plate area (m²)
    pub fn plan_area(&self) -> f64 {
        self.length_m * self.width_m
    }

    /// Building perimeter (m)
    pub fn perimeter(&self) -> f64 {
        2.0 * (self.length_m + self.width_m)
    }

    /// Area of a wall band running the full perimeter (m²); the reference
    /// area the coverage ratio is measured against.
    pub fn perimeter_band_area(&self) -> f64 {
        self.perimeter() * self.wall_thickness_m
    }
}

fn require_positive_length(field: &str, value: f64) -> GenResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GenError::validation(
            field,
            value.to_string(),
            "Length must be a finite positive number",
        ));
    }
    Ok(())
}

fn require_intensity(field: &str, value: f64) -> GenResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(GenError::validation(
            field,
            value.to_string(),
            "Load intensity must be finite and non-negative",
        ));
    }
    Ok(())
}

/// Validate and canonicalize a request.
///
/// Checks run in field order so the first offending field is the one named.
pub fn normalize(params: &BuildingParameters) -> GenResult<NormalizedParameters> {
    if params.floors < 1 {
        return Err(GenError::validation(
            "floors",
            params.floors.to_string(),
            "Floor count must be at least 1",
        ));
    }
    if params.floors > MAX_FLOORS {
        return Err(GenError::validation(
            "floors",
            params.floors.to_string(),
            format!("Floor count exceeds the supported maximum of {}", MAX_FLOORS),
        ));
    }

    let unit = params.units;
    let slab_raw = params.slab_thickness;

    require_positive_length("length", params.length)?;
    require_positive_length("width", params.width)?;
    require_positive_length("floor_height", params.floor_height)?;
    require_positive_length("wall_thickness", params.wall_thickness)?;
    if let Some(slab) = slab_raw {
        require_positive_length("slab_thickness", slab)?;
    }

    let length_m = unit.to_meters(params.length).value();
    let width_m = unit.to_meters(params.width).value();
    let floor_height_m = unit.to_meters(params.floor_height).value();
    let wall_thickness_m = unit.to_meters(params.wall_thickness).value();
    let slab_thickness_m = slab_raw
        .map(|s| unit.to_meters(s).value())
        .unwrap_or(DEFAULT_SLAB_THICKNESS_M);

    for (field, raw, value_m) in [("length", params.length, length_m), ("width", params.width, width_m)] {
        if value_m > MAX_PLAN_DIMENSION_M {
            return Err(GenError::validation(
                field,
                raw.to_string(),
                format!("Plan dimension exceeds the supported maximum of {} m", MAX_PLAN_DIMENSION_M),
            ));
        }
    }

    if wall_thickness_m >= length_m.min(width_m) {
        return Err(GenError::validation(
            "wall_thickness",
            params.wall_thickness.to_string(),
            "Wall thickness must be smaller than both plan dimensions",
        ));
    }
    if slab_thickness_m >= floor_height_m {
        return Err(GenError::validation(
            "slab_thickness",
            slab_thickness_m.to_string(),
            "Slab thickness must be smaller than the floor height",
        ));
    }

    let shear_wall_ratio = if params.structural_system.has_walls() {
        let ratio = params.shear_wall_ratio.ok_or_else(|| {
            GenError::validation(
                "shear_wall_ratio",
                "missing",
                format!("Required for structural_system '{}'", params.structural_system),
            )
        })?;
        // Zero passes here; the layout engine reports it as infeasible.
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            return Err(GenError::validation(
                "shear_wall_ratio",
                ratio.to_string(),
                "Ratio must lie in [0, 1]",
            ));
        }
        Some(ratio)
    } else {
        None
    };

    let concrete_grade = ConcreteGrade::from_str_flexible(&params.concrete_grade)?;

    if params.design_code.trim().is_empty() {
        return Err(GenError::validation(
            "design_code",
            "",
            "Design-code profile identifier must not be empty",
        ));
    }

    require_intensity("loads.superimposed_dead", params.loads.superimposed_dead)?;
    require_intensity("loads.live", params.loads.live)?;
    require_intensity("loads.wind_pressure", params.loads.wind_pressure)?;

    Ok(NormalizedParameters {
        floors: params.floors as u32,
        length_m,
        width_m,
        floor_height_m,
        wall_thickness_m,
        slab_thickness_m,
        structural_system: params.structural_system,
        shear_wall_ratio,
        concrete_grade,
        design_code: params.design_code.trim().to_string(),
        loads: params.loads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seven_storey() -> BuildingParameters {
        BuildingParameters {
            floors: 7,
            length: 30.0,
            width: 12.0,
            floor_height: 3.5,
            wall_thickness: 0.25,
            shear_wall_ratio: Some(0.25),
            ..BuildingParameters::default()
        }
    }

    fn field_of(err: GenError) -> String {
        match err {
            GenError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_seven_storey() {
        let n = normalize(&seven_storey()).unwrap();
        assert_eq!(n.floors, 7);
        assert_eq!(n.length_m, 30.0);
        assert_eq!(n.slab_thickness_m, DEFAULT_SLAB_THICKNESS_M);
        assert_eq!(n.shear_wall_ratio, Some(0.25));
        assert_eq!(n.concrete_grade, ConcreteGrade::C30);
        assert!((n.perimeter_band_area() - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_floors_names_floors() {
        let params = BuildingParameters { floors: 0, ..seven_storey() };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "floors");
    }

    #[test]
    fn test_absurd_floor_count_rejected() {
        let params = BuildingParameters { floors: 501, ..seven_storey() };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "floors");
        let params = BuildingParameters { floors: 500, ..seven_storey() };
        assert!(normalize(&params).is_ok());
    }

    #[test]
    fn test_huge_plan_rejected_before_layout() {
        let params = BuildingParameters { length: 1e20, ..BuildingParameters::reference_building() };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "length");

        // 1000 ft is just over the limit once converted
        let params = BuildingParameters {
            units: LengthUnit::Feet,
            length: 100.0,
            width: 1000.0,
            floor_height: 12.0,
            wall_thickness: 1.0,
            ..seven_storey()
        };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "width");

        let params = BuildingParameters { length: MAX_PLAN_DIMENSION_M, ..seven_storey() };
        assert!(normalize(&params).is_ok());
    }

    #[test]
    fn test_non_positive_lengths_rejected() {
        let params = BuildingParameters { width: 0.0, ..seven_storey() };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "width");
        let params = BuildingParameters { floor_height: -3.0, ..seven_storey() };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "floor_height");
        let params = BuildingParameters { length: f64::NAN, ..seven_storey() };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "length");
    }

    #[test]
    fn test_ratio_required_only_for_wall_systems() {
        let params = BuildingParameters { shear_wall_ratio: None, ..seven_storey() };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "shear_wall_ratio");

        let frame = BuildingParameters {
            shear_wall_ratio: None,
            structural_system: StructuralSystem::MomentFrame,
            ..seven_storey()
        };
        assert_eq!(normalize(&frame).unwrap().shear_wall_ratio, None);

        let frame_with_ratio = BuildingParameters {
            structural_system: StructuralSystem::MomentFrame,
            shear_wall_ratio: Some(7.0),
            ..seven_storey()
        };
        assert_eq!(normalize(&frame_with_ratio).unwrap().shear_wall_ratio, None);
    }

    #[test]
    fn test_ratio_range() {
        let params = BuildingParameters { shear_wall_ratio: Some(1.2), ..seven_storey() };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "shear_wall_ratio");
        let params = BuildingParameters { shear_wall_ratio: Some(-0.1), ..seven_storey() };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "shear_wall_ratio");
        let params = BuildingParameters { shear_wall_ratio: Some(0.0), ..seven_storey() };
        assert_eq!(normalize(&params).unwrap().shear_wall_ratio, Some(0.0));
    }

    #[test]
    fn test_millimetre_input_canonicalized() {
        let params = BuildingParameters {
            units: LengthUnit::Millimeters,
            length: 30000.0,
            width: 12000.0,
            floor_height: 3500.0,
            wall_thickness: 250.0,
            slab_thickness: Some(180.0),
            ..seven_storey()
        };
        let n = normalize(&params).unwrap();
        assert_eq!(n.length_m, 30.0);
        assert_eq!(n.floor_height_m, 3.5);
        assert_eq!(n.wall_thickness_m, 0.25);
        assert!((n.slab_thickness_m - 0.18).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_grade_rejected() {
        let params = BuildingParameters { concrete_grade: "C12".into(), ..seven_storey() };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "concrete_grade");
    }

    #[test]
    fn test_thick_wall_rejected() {
        let params = BuildingParameters { wall_thickness: 12.0, ..seven_storey() };
        assert_eq!(field_of(normalize(&params).unwrap_err()), "wall_thickness");
    }

    #[test]
    fn test_negative_load_rejected() {
        let mut params = seven_storey();
        params.loads.live = -1.0;
        assert_eq!(field_of(normalize(&params).unwrap_err()), "loads.live");
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "floors": 3, "length": 18.0, "width": 12.0,
            "floor_height": 3.0, "wall_thickness": 0.2,
            "shear_wall_ratio": 0.3
        }"#;
        let params: BuildingParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.structural_system, StructuralSystem::ShearWall);
        assert_eq!(params.units, LengthUnit::Meters);
        assert_eq!(params.concrete_grade, "C30/37");
        assert_eq!(params.design_code, "ASCE7-22-LRFD");
        assert!(normalize(&params).is_ok());
    }

    #[test]
    fn test_structural_system_parsing() {
        assert_eq!(StructuralSystem::from_str_flexible("Moment-Frame").unwrap(), StructuralSystem::MomentFrame);
        assert_eq!(field_of(StructuralSystem::from_str_flexible("tube").unwrap_err()), "structural_system");
    }
}
