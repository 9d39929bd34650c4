//! Load type and load case definitions
//!
//! Load cases are the unfactored patterns exported to the analysis tables.
//! Lateral cases come in one per plan direction (WINDX, WINDY, EQX, EQY).

use serde::{Deserialize, Serialize};

use crate::layout::Axis;
use crate::params::LoadIntensities;

/// Load categories the generator emits
///
/// # Example
/// ```
/// use model_core::loads::LoadType;
///
/// let dead = LoadType::Dead;
/// assert_eq!(dead.code(), "D");
/// assert_eq!(dead.description(), "Dead load");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoadType {
    /// D - Dead load (self-weight plus superimposed dead)
    Dead,
    /// L - Floor live load
    Live,
    /// W - Wind load
    Wind,
    /// E - Seismic (earthquake) load
    Seismic,
}

impl LoadType {
    pub const ALL: [LoadType; 4] = [LoadType::Dead, LoadType::Live, LoadType::Wind, LoadType::Seismic];

    /// Standard abbreviation (D, L, W, E)
    pub fn code(&self) -> &'static str {
        match self {
            LoadType::Dead => "D",
            LoadType::Live => "L",
            LoadType::Wind => "W",
            LoadType::Seismic => "E",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            LoadType::Dead => "Dead load",
            LoadType::Live => "Live load",
            LoadType::Wind => "Wind load",
            LoadType::Seismic => "Seismic load",
        }
    }

    /// Design type label used in the load case table
    pub fn design_type(&self) -> &'static str {
        match self {
            LoadType::Dead => "Dead",
            LoadType::Live => "Live",
            LoadType::Wind => "Wind",
            LoadType::Seismic => "Seismic",
        }
    }

    /// Whether this load type acts in a plan direction (one case per axis, +/- in combinations)
    pub fn is_directional(&self) -> bool {
        matches!(self, LoadType::Wind | LoadType::Seismic)
    }

    /// Load case id, e.g. `DEAD`, `WINDX`, `EQY`
    pub fn case_id(&self, direction: Option<Axis>) -> String {
        let base = match self {
            LoadType::Dead => "DEAD",
            LoadType::Live => "LIVE",
            LoadType::Wind => "WIND",
            LoadType::Seismic => "EQ",
        };
        match direction {
            Some(axis) if self.is_directional() => format!("{}{}", base, axis.code()),
            _ => base.to_string(),
        }
    }
}

impl std::fmt::Display for LoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An unfactored load pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    pub id: String,
    pub load_type: LoadType,
    /// Plan direction for lateral cases
    pub direction: Option<Axis>,
    /// Self-weight multiplier (1.0 on DEAD only)
    pub self_weight_multiplier: f64,
    /// Surface intensity (kN/m²); 0 for cases generated by the analysis program
    pub magnitude: f64,
    /// How the analysis program should apply the case
    pub method: String,
}

impl LoadCase {
    pub fn dead(loads: &LoadIntensities) -> Self {
        LoadCase {
            id: LoadType::Dead.case_id(None),
            load_type: LoadType::Dead,
            direction: None,
            self_weight_multiplier: 1.0,
            magnitude: loads.superimposed_dead,
            method: "Uniform area load plus self-weight".to_string(),
        }
    }

    pub fn live(loads: &LoadIntensities) -> Self {
        LoadCase {
            id: LoadType::Live.case_id(None),
            load_type: LoadType::Live,
            direction: None,
            self_weight_multiplier: 0.0,
            magnitude: loads.live,
            method: "Uniform area load".to_string(),
        }
    }

    pub fn wind(axis: Axis, loads: &LoadIntensities) -> Self {
        LoadCase {
            id: LoadType::Wind.case_id(Some(axis)),
            load_type: LoadType::Wind,
            direction: Some(axis),
            self_weight_multiplier: 0.0,
            magnitude: loads.wind_pressure,
            method: format!("Facade pressure in {}", axis),
        }
    }

    /// Seismic case; `standard` names the code the auto-lateral load follows
    pub fn seismic(axis: Axis, standard: &str) -> Self {
        LoadCase {
            id: LoadType::Seismic.case_id(Some(axis)),
            load_type: LoadType::Seismic,
            direction: Some(axis),
            self_weight_multiplier: 0.0,
            magnitude: 0.0,
            method: format!("Equivalent lateral force per {} in {}", standard, axis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_type_codes() {
        assert_eq!(LoadType::Dead.code(), "D");
        assert_eq!(LoadType::Live.code(), "L");
        assert_eq!(LoadType::Wind.code(), "W");
        assert_eq!(LoadType::Seismic.code(), "E");
    }

    #[test]
    fn test_case_ids() {
        assert_eq!(LoadType::Dead.case_id(None), "DEAD");
        assert_eq!(LoadType::Dead.case_id(Some(Axis::X)), "DEAD");
        assert_eq!(LoadType::Wind.case_id(Some(Axis::Y)), "WINDY");
        assert_eq!(LoadType::Seismic.case_id(Some(Axis::X)), "EQX");
    }

    #[test]
    fn test_only_dead_carries_self_weight() {
        let loads = LoadIntensities::default();
        assert_eq!(LoadCase::dead(&loads).self_weight_multiplier, 1.0);
        assert_eq!(LoadCase::live(&loads).self_weight_multiplier, 0.0);
        assert_eq!(LoadCase::wind(Axis::X, &loads).self_weight_multiplier, 0.0);
        assert_eq!(LoadCase::live(&loads).magnitude, 2.0);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&LoadType::Seismic).unwrap();
        assert_eq!(json, "\"Seismic\"");
        let parsed: LoadType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, LoadType::Seismic);
    }
}
