//! Load combination templates and their expansion
//!
//! A profile lists combinations as templates with one generic lateral term
//! (`W` or `E`). Expansion turns each template into concrete combinations over
//! the case ids of the model:
//!
//! - wind acts in X or Y, with + and - sign (4 combinations);
//! - seismic acts the same way for moment frames; for wall systems each
//!   combination adds 30 % of the orthogonal direction with either sign
//!   (100/30 rule, 8 combinations).
//!
//! Names are derived from the template label and the lateral term, e.g.
//! `LRFD3-WX+` or `LRFD5-EX+Y-`.

use serde::{Deserialize, Serialize};

use super::load_types::LoadType;
use crate::layout::Axis;
use crate::params::StructuralSystem;

/// Share of the orthogonal seismic effect under the 100/30 rule
pub const ORTHOGONAL_SEISMIC_SHARE: f64 = 0.3;

/// Limit state / design situation a combination belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitState {
    /// Factored strength (LRFD)
    Strength,
    /// Allowable stress (ASD service-level)
    AllowableStress,
    /// Eurocode ULS, persistent and transient situation
    Ultimate,
    /// Eurocode seismic design situation
    Seismic,
}

impl LimitState {
    /// Short code written to the combination table
    pub fn code(&self) -> &'static str {
        match self {
            LimitState::Strength => "Strength",
            LimitState::AllowableStress => "Allowable",
            LimitState::Ultimate => "ULS",
            LimitState::Seismic => "Seismic",
        }
    }
}

impl std::fmt::Display for LimitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Static combination rule of a design-code profile
///
/// # Example
/// ```
/// use model_core::loads::{ComboTemplate, LimitState, LoadType};
///
/// let template = ComboTemplate::new("LRFD3", "1.2D + 1.0W + L", LimitState::Strength)
///     .with_factor(LoadType::Dead, 1.2)
///     .with_factor(LoadType::Live, 1.0)
///     .with_lateral(LoadType::Wind, 1.0);
///
/// assert_eq!(template.lateral, Some((LoadType::Wind, 1.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboTemplate {
    /// Label combinations are named after (e.g. "LRFD3")
    pub label: String,
    /// Code equation as printed in the standard
    pub equation: String,
    pub limit_state: LimitState,
    /// Gravity terms in order
    pub gravity: Vec<(LoadType, f64)>,
    /// Directional term, if any
    pub lateral: Option<(LoadType, f64)>,
}

impl ComboTemplate {
    pub fn new(label: impl Into<String>, equation: impl Into<String>, limit_state: LimitState) -> Self {
        ComboTemplate {
            label: label.into(),
            equation: equation.into(),
            limit_state,
            gravity: Vec::new(),
            lateral: None,
        }
    }

    /// Add a gravity factor (builder pattern)
    pub fn with_factor(mut self, load_type: LoadType, factor: f64) -> Self {
        self.gravity.push((load_type, factor));
        self
    }

    /// Set the directional term (builder pattern)
    pub fn with_lateral(mut self, load_type: LoadType, factor: f64) -> Self {
        self.lateral = Some((load_type, factor));
        self
    }

    /// Load types the template refers to
    pub fn load_types(&self) -> impl Iterator<Item = LoadType> + '_ {
        self.gravity
            .iter()
            .map(|(t, _)| *t)
            .chain(self.lateral.iter().map(|(t, _)| *t))
    }
}

/// One (load case, factor) pair of a combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboTerm {
    pub case: String,
    pub factor: f64,
}

/// A concrete load combination over the model's load cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCombination {
    pub id: String,
    pub limit_state: LimitState,
    /// Code equation of the template it was expanded from
    pub equation: String,
    pub terms: Vec<ComboTerm>,
}

impl LoadCombination {
    /// Factor applied to `case` (0.0 if absent)
    pub fn factor_for(&self, case: &str) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.case == case)
            .map(|t| t.factor)
            .sum()
    }

    /// Expanded equation in terms of case ids, e.g. `1.2 DEAD + 1.0 LIVE - 1.0 WINDX`
    pub fn expanded_equation(&self) -> String {
        let mut out = String::new();
        for (i, term) in self.terms.iter().enumerate() {
            let sign = if term.factor < 0.0 { "-" } else { "+" };
            if i == 0 {
                if term.factor < 0.0 {
                    out.push('-');
                }
            } else {
                out.push_str(&format!(" {} ", sign));
            }
            out.push_str(&format!("{} {}", format_factor(term.factor.abs()), term.case));
        }
        out
    }
}

fn format_factor(value: f64) -> String {
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0');
    if text.ends_with('.') {
        format!("{}0", text)
    } else {
        text.to_string()
    }
}

fn sign_char(positive: bool) -> char {
    if positive {
        '+'
    } else {
        '-'
    }
}

fn signed(factor: f64, positive: bool) -> f64 {
    if positive {
        factor
    } else {
        -factor
    }
}

/// Expand a template for the given structural system.
///
/// `directions` lists the plan axes lateral cases exist for, normally X then Y.
pub fn expand(template: &ComboTemplate, system: StructuralSystem, directions: &[Axis]) -> Vec<LoadCombination> {
    let gravity: Vec<ComboTerm> = template
        .gravity
        .iter()
        .map(|(load_type, factor)| ComboTerm {
            case: load_type.case_id(None),
            factor: *factor,
        })
        .collect();

    let build = |suffix: String, lateral: Vec<ComboTerm>| {
        let mut terms = gravity.clone();
        terms.extend(lateral);
        LoadCombination {
            id: format!("{}{}", template.label, suffix),
            limit_state: template.limit_state,
            equation: template.equation.clone(),
            terms,
        }
    };

    let Some((load_type, factor)) = template.lateral else {
        return vec![build(String::new(), Vec::new())];
    };

    let orthogonal_rule = load_type == LoadType::Seismic && system.has_walls();
    let mut result = Vec::new();
    for &axis in directions {
        for positive in [true, false] {
            let primary = ComboTerm {
                case: load_type.case_id(Some(axis)),
                factor: signed(factor, positive),
            };
            let suffix = format!("-{}{}{}", load_type.code(), axis.code(), sign_char(positive));
            if orthogonal_rule && directions.contains(&axis.orthogonal()) {
                let other = axis.orthogonal();
                for other_positive in [true, false] {
                    let secondary = ComboTerm {
                        case: load_type.case_id(Some(other)),
                        factor: signed(factor * ORTHOGONAL_SEISMIC_SHARE, other_positive),
                    };
                    result.push(build(
                        format!("{}{}{}", suffix, other.code(), sign_char(other_positive)),
                        vec![primary.clone(), secondary],
                    ));
                }
            } else {
                result.push(build(suffix, vec![primary]));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const XY: [Axis; 2] = [Axis::X, Axis::Y];

    fn wind_template() -> ComboTemplate {
        ComboTemplate::new("LRFD3", "1.2D + 1.0W + L", LimitState::Strength)
            .with_factor(LoadType::Dead, 1.2)
            .with_factor(LoadType::Live, 1.0)
            .with_lateral(LoadType::Wind, 1.0)
    }

    fn seismic_template() -> ComboTemplate {
        ComboTemplate::new("LRFD6", "0.9D + 1.0E", LimitState::Strength)
            .with_factor(LoadType::Dead, 0.9)
            .with_lateral(LoadType::Seismic, 1.0)
    }

    #[test]
    fn test_gravity_only_template() {
        let template = ComboTemplate::new("LRFD1", "1.4D", LimitState::Strength).with_factor(LoadType::Dead, 1.4);
        let combos = expand(&template, StructuralSystem::ShearWall, &XY);
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].id, "LRFD1");
        assert_eq!(combos[0].factor_for("DEAD"), 1.4);
    }

    #[test]
    fn test_wind_expands_direction_and_sign() {
        let combos = expand(&wind_template(), StructuralSystem::ShearWall, &XY);
        let ids: Vec<&str> = combos.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["LRFD3-WX+", "LRFD3-WX-", "LRFD3-WY+", "LRFD3-WY-"]);
        assert_eq!(combos[1].factor_for("WINDX"), -1.0);
        assert_eq!(combos[1].factor_for("WINDY"), 0.0);
        assert_eq!(combos[1].factor_for("LIVE"), 1.0);
    }

    #[test]
    fn test_seismic_orthogonal_rule_for_walls() {
        let combos = expand(&seismic_template(), StructuralSystem::ShearWall, &XY);
        assert_eq!(combos.len(), 8);
        assert_eq!(combos[0].id, "LRFD6-EX+Y+");
        assert_eq!(combos[0].factor_for("EQX"), 1.0);
        assert!((combos[0].factor_for("EQY") - 0.3).abs() < 1e-12);
        assert_eq!(combos[7].id, "LRFD6-EY-X-");
        assert!((combos[7].factor_for("EQX") + 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_seismic_single_direction_for_frames() {
        let combos = expand(&seismic_template(), StructuralSystem::MomentFrame, &XY);
        assert_eq!(combos.len(), 4);
        assert!(combos.iter().all(|c| c.terms.len() == 2));
        assert_eq!(combos[2].id, "LRFD6-EY+");
    }

    #[test]
    fn test_expanded_equation() {
        let combos = expand(&wind_template(), StructuralSystem::Dual, &XY);
        assert_eq!(combos[1].expanded_equation(), "1.2 DEAD + 1.0 LIVE - 1.0 WINDX");
    }

    #[test]
    fn test_format_factor() {
        assert_eq!(format_factor(1.0), "1.0");
        assert_eq!(format_factor(0.525), "0.525");
        assert_eq!(format_factor(1.35), "1.35");
    }
}
