//! Load cases and design-code load combinations
//!
//! Combinations are a pure lookup: a design-code profile is a fixed list of
//! templates, expanded over the plan directions for the structural system.
//! There is no search and no per-project tuning.
//!
//! # Overview
//!
//! - [`LoadType`] - load categories (D, L, W, E)
//! - [`LoadCase`] - unfactored load patterns exported with the model
//! - [`DesignProfile`] - named, fixed set of combination templates
//! - [`LoadCombination`] - concrete combination over case ids
//!
//! # Supported profiles
//!
//! | Id | Standard | Hazards |
//! |----|----------|---------|
//! | `ASCE7-22-LRFD` | ASCE 7-22 §2.3.1 strength design | wind, seismic |
//! | `ASCE7-22-ASD` | ASCE 7-22 §2.4.1 allowable stress design | wind, seismic |
//! | `EN1990` | EN 1990 eq. 6.10, persistent situation | wind |
//! | `EN1990-EN1998` | EN 1990 plus EN 1998 seismic situation | wind, seismic |
//!
//! # Example
//!
//! ```
//! use model_core::loads::{combinations_for, DesignProfile};
//! use model_core::params::StructuralSystem;
//!
//! let profile = DesignProfile::from_id("ASCE7-22-LRFD").unwrap();
//! let combos = combinations_for(profile, StructuralSystem::ShearWall);
//! assert_eq!(combos[0].id, "LRFD1");
//!
//! assert!(DesignProfile::from_id("BS8110").is_err());
//! ```

pub mod combinations;
pub mod load_types;

pub use combinations::{expand, ComboTemplate, ComboTerm, LimitState, LoadCombination};
pub use load_types::{LoadCase, LoadType};

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::errors::{GenError, GenResult};
use crate::layout::Axis;
use crate::params::{LoadIntensities, StructuralSystem};

/// Profile used when a request does not name one
pub const DEFAULT_PROFILE_ID: &str = "ASCE7-22-LRFD";

/// Plan directions lateral cases are generated for
const DIRECTIONS: [Axis; 2] = [Axis::X, Axis::Y];

/// Named, fixed set of load-combination rules
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignProfile {
    pub id: &'static str,
    pub name: &'static str,
    /// Standard the seismic cases follow
    pub seismic_standard: &'static str,
    pub templates: Vec<ComboTemplate>,
}

impl DesignProfile {
    /// Look up a profile by identifier (case-insensitive)
    pub fn from_id(id: &str) -> GenResult<&'static DesignProfile> {
        let wanted = id.trim();
        PROFILES
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GenError::unsupported_profile(id))
    }

    /// All registered profiles in listing order
    pub fn all() -> &'static [DesignProfile] {
        &PROFILES
    }

    /// Whether any template uses the given load type
    pub fn covers(&self, load_type: LoadType) -> bool {
        self.templates.iter().any(|t| t.load_types().any(|l| l == load_type))
    }
}

static PROFILES: Lazy<Vec<DesignProfile>> = Lazy::new(|| {
    vec![
        asce7_lrfd(),
        asce7_asd(),
        en1990(),
        en1990_en1998(),
    ]
});

/// ASCE 7-22 §2.3.1 basic strength combinations (no roof, snow or rain loads)
fn asce7_lrfd() -> DesignProfile {
    use LoadType::*;
    let s = LimitState::Strength;
    DesignProfile {
        id: "ASCE7-22-LRFD",
        name: "ASCE 7-22 LRFD strength design",
        seismic_standard: "ASCE 7-22",
        templates: vec![
            ComboTemplate::new("LRFD1", "1.4D", s).with_factor(Dead, 1.4),
            ComboTemplate::new("LRFD2", "1.2D + 1.6L", s)
                .with_factor(Dead, 1.2)
                .with_factor(Live, 1.6),
            ComboTemplate::new("LRFD3", "1.2D + 1.0W + L", s)
                .with_factor(Dead, 1.2)
                .with_factor(Live, 1.0)
                .with_lateral(Wind, 1.0),
            ComboTemplate::new("LRFD4", "0.9D + 1.0W", s)
                .with_factor(Dead, 0.9)
                .with_lateral(Wind, 1.0),
            ComboTemplate::new("LRFD5", "1.2D + 1.0E + L", s)
                .with_factor(Dead, 1.2)
                .with_factor(Live, 1.0)
                .with_lateral(Seismic, 1.0),
            ComboTemplate::new("LRFD6", "0.9D + 1.0E", s)
                .with_factor(Dead, 0.9)
                .with_lateral(Seismic, 1.0),
        ],
    }
}

/// ASCE 7-22 §2.4.1 basic allowable stress combinations
fn asce7_asd() -> DesignProfile {
    use LoadType::*;
    let s = LimitState::AllowableStress;
    DesignProfile {
        id: "ASCE7-22-ASD",
        name: "ASCE 7-22 ASD allowable stress design",
        seismic_standard: "ASCE 7-22",
        templates: vec![
            ComboTemplate::new("ASD1", "D", s).with_factor(Dead, 1.0),
            ComboTemplate::new("ASD2", "D + L", s)
                .with_factor(Dead, 1.0)
                .with_factor(Live, 1.0),
            ComboTemplate::new("ASD3", "D + 0.6W", s)
                .with_factor(Dead, 1.0)
                .with_lateral(Wind, 0.6),
            ComboTemplate::new("ASD4", "D + 0.75L + 0.45W", s)
                .with_factor(Dead, 1.0)
                .with_factor(Live, 0.75)
                .with_lateral(Wind, 0.45), // 0.75 * 0.6
            ComboTemplate::new("ASD5", "0.6D + 0.6W", s)
                .with_factor(Dead, 0.6)
                .with_lateral(Wind, 0.6),
            ComboTemplate::new("ASD6", "D + 0.7E", s)
                .with_factor(Dead, 1.0)
                .with_lateral(Seismic, 0.7),
            ComboTemplate::new("ASD7", "D + 0.75L + 0.525E", s)
                .with_factor(Dead, 1.0)
                .with_factor(Live, 0.75)
                .with_lateral(Seismic, 0.525), // 0.75 * 0.7
            ComboTemplate::new("ASD8", "0.6D + 0.7E", s)
                .with_factor(Dead, 0.6)
                .with_lateral(Seismic, 0.7),
        ],
    }
}

fn en1990_templates() -> Vec<ComboTemplate> {
    use LoadType::*;
    let s = LimitState::Ultimate;
    vec![
        ComboTemplate::new("ULS1", "1.35G", s).with_factor(Dead, 1.35),
        ComboTemplate::new("ULS2", "1.35G + 1.5Q", s)
            .with_factor(Dead, 1.35)
            .with_factor(Live, 1.5),
        // wind leading, psi0 = 0.7 on imposed load
        ComboTemplate::new("ULS3", "1.35G + 1.5W + 1.05Q", s)
            .with_factor(Dead, 1.35)
            .with_factor(Live, 1.05)
            .with_lateral(Wind, 1.5),
        // imposed leading, psi0 = 0.6 on wind
        ComboTemplate::new("ULS4", "1.35G + 1.5Q + 0.9W", s)
            .with_factor(Dead, 1.35)
            .with_factor(Live, 1.5)
            .with_lateral(Wind, 0.9),
        ComboTemplate::new("ULS5", "1.0G + 1.5W", s)
            .with_factor(Dead, 1.0)
            .with_lateral(Wind, 1.5),
    ]
}

/// EN 1990 eq. 6.10, persistent and transient design situation
fn en1990() -> DesignProfile {
    DesignProfile {
        id: "EN1990",
        name: "EN 1990 ULS fundamental combinations",
        seismic_standard: "EN 1998-1",
        templates: en1990_templates(),
    }
}

/// EN 1990 plus the EN 1998 seismic design situation (psi2 = 0.3 on imposed)
fn en1990_en1998() -> DesignProfile {
    let mut templates = en1990_templates();
    templates.push(
        ComboTemplate::new("SEIS1", "G + 0.3Q + E", LimitState::Seismic)
            .with_factor(LoadType::Dead, 1.0)
            .with_factor(LoadType::Live, 0.3)
            .with_lateral(LoadType::Seismic, 1.0),
    );
    DesignProfile {
        id: "EN1990-EN1998",
        name: "EN 1990 ULS with EN 1998 seismic situation",
        seismic_standard: "EN 1998-1",
        templates,
    }
}

/// Canonical load cases for a profile: DEAD and LIVE always, lateral cases
/// for each hazard the profile's combinations refer to
pub fn load_cases_for(profile: &DesignProfile, loads: &LoadIntensities) -> Vec<LoadCase> {
    let mut cases = vec![LoadCase::dead(loads), LoadCase::live(loads)];
    if profile.covers(LoadType::Wind) {
        cases.extend(DIRECTIONS.iter().map(|&axis| LoadCase::wind(axis, loads)));
    }
    if profile.covers(LoadType::Seismic) {
        cases.extend(
            DIRECTIONS
                .iter()
                .map(|&axis| LoadCase::seismic(axis, profile.seismic_standard)),
        );
    }
    cases
}

/// Ordered combinations for a profile and structural system
pub fn combinations_for(profile: &DesignProfile, system: StructuralSystem) -> Vec<LoadCombination> {
    profile
        .templates
        .iter()
        .flat_map(|t| expand(t, system, &DIRECTIONS))
        .collect()
}
