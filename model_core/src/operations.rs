//! # Operation Registry
//!
//! The closed set of requests a caller can make, each a typed variant of
//! [`Request`]. [`dispatch`] matches on the variant; there is no lookup by
//! name at runtime, so adding an operation means adding a variant and the
//! compiler points at every match that needs it.
//!
//! Requests and responses are JSON-serializable, tagged by `"op"` and
//! `"result"` respectively:
//!
//! ```json
//! { "op": "load_combinations", "profile": "EN1990", "structural_system": "dual" }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use model_core::config::GeneratorConfig;
//! use model_core::operations::{dispatch, Request, Response};
//!
//! let request: Request = serde_json::from_str(r#"{"op":"list_profiles"}"#).unwrap();
//! match dispatch(&request, &GeneratorConfig::default()).unwrap() {
//!     Response::Profiles { profiles } => assert!(!profiles.is_empty()),
//!     other => panic!("unexpected response {:?}", other),
//! }
//! ```

use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::errors::GenResult;
use crate::export::{ExportBundle, TableFormat};
use crate::file_io::{default_stem, validate_stem, write_artifacts};
use crate::loads::{combinations_for, load_cases_for, DesignProfile, LoadCase, LoadCombination};
use crate::materials::{ConcreteGrade, Material};
use crate::model::{generate_model, GenerationSummary};
use crate::params::{normalize, BuildingParameters, LoadIntensities, NormalizedParameters, StructuralSystem};

// ============================================================================
// Requests
// ============================================================================

fn default_write() -> bool {
    true
}

/// A typed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Build the model and, unless `write` is false, export its artifacts
    Generate {
        parameters: BuildingParameters,
        /// Overrides the configured output directory
        #[serde(default)]
        output_dir: Option<PathBuf>,
        /// Artifact file stem; a timestamped stem is used when absent
        #[serde(default)]
        stem: Option<String>,
        #[serde(default)]
        table_format: Option<TableFormat>,
        #[serde(default = "default_write")]
        write: bool,
    },
    /// Normalize parameters without building anything
    ValidateParameters { parameters: BuildingParameters },
    /// Load cases and expanded combinations of one profile
    LoadCombinations {
        /// Falls back to the configured default profile
        #[serde(default)]
        profile: Option<String>,
        #[serde(default)]
        structural_system: StructuralSystem,
    },
    ListProfiles,
    ListMaterials,
    /// Parameters of the predefined reference building
    ReferenceBuilding,
}

impl Request {
    pub fn kind(&self) -> OperationKind {
        match self {
            Request::Generate { .. } => OperationKind::Generate,
            Request::ValidateParameters { .. } => OperationKind::ValidateParameters,
            Request::LoadCombinations { .. } => OperationKind::LoadCombinations,
            Request::ListProfiles => OperationKind::ListProfiles,
            Request::ListMaterials => OperationKind::ListMaterials,
            Request::ReferenceBuilding => OperationKind::ReferenceBuilding,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Listing entry for a design-code profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub id: String,
    pub name: String,
    pub seismic_standard: String,
    /// Number of combination templates before directional expansion
    pub templates: usize,
}

impl From<&DesignProfile> for ProfileInfo {
    fn from(p: &DesignProfile) -> Self {
        ProfileInfo {
            id: p.id.to_string(),
            name: p.name.to_string(),
            seismic_standard: p.seismic_standard.to_string(),
            templates: p.templates.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Response {
    Generated { summary: GenerationSummary },
    Validated { parameters: NormalizedParameters },
    Combinations {
        profile: String,
        structural_system: StructuralSystem,
        load_cases: Vec<LoadCase>,
        combinations: Vec<LoadCombination>,
    },
    Profiles { profiles: Vec<ProfileInfo> },
    Materials { materials: Vec<Material> },
    Reference { parameters: BuildingParameters },
}

// ============================================================================
// Metadata
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Generate,
    ValidateParameters,
    LoadCombinations,
    ListProfiles,
    ListMaterials,
    ReferenceBuilding,
}

/// Description of an operation for callers building requests
#[derive(Debug, Clone, Serialize)]
pub struct OperationMetadata {
    /// Value of the `"op"` tag
    pub op: &'static str,
    pub description: &'static str,
    pub writes_files: bool,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Generate,
        OperationKind::ValidateParameters,
        OperationKind::LoadCombinations,
        OperationKind::ListProfiles,
        OperationKind::ListMaterials,
        OperationKind::ReferenceBuilding,
    ];

    pub fn metadata(&self) -> OperationMetadata {
        match self {
            OperationKind::Generate => OperationMetadata {
                op: "generate",
                description: "Build the structural model and export the drawing and analysis tables",
                writes_files: true,
            },
            OperationKind::ValidateParameters => OperationMetadata {
                op: "validate_parameters",
                description: "Normalize building parameters to metres and report the first invalid field",
                writes_files: false,
            },
            OperationKind::LoadCombinations => OperationMetadata {
                op: "load_combinations",
                description: "Load cases and expanded combinations for a profile and structural system",
                writes_files: false,
            },
            OperationKind::ListProfiles => OperationMetadata {
                op: "list_profiles",
                description: "Registered design-code profiles",
                writes_files: false,
            },
            OperationKind::ListMaterials => OperationMetadata {
                op: "list_materials",
                description: "Supported concrete grades with their properties",
                writes_files: false,
            },
            OperationKind::ReferenceBuilding => OperationMetadata {
                op: "reference_building",
                description: "Parameters of the predefined 10-storey reference building",
                writes_files: false,
            },
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Name recorded in the output directory lock
fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "bayline".to_string())
}

/// Run one request.
///
/// `Generate` only touches the filesystem after the model has been built, so
/// a request that fails validation, layout or profile lookup writes nothing.
pub fn dispatch(request: &Request, config: &GeneratorConfig) -> GenResult<Response> {
    log::debug!("Dispatching {}", request.kind().metadata().op);
    match request {
        Request::Generate {
            parameters,
            output_dir,
            stem,
            table_format,
            write,
        } => {
            if let Some(stem) = stem {
                validate_stem(stem)?;
            }
            let model = generate_model(parameters, config)?;
            let mut summary = GenerationSummary::from_model(&model);

            if *write {
                let mut export = config.export.clone();
                if let Some(format) = table_format {
                    export.table_format = *format;
                }
                let stem = stem
                    .clone()
                    .unwrap_or_else(|| default_stem(&model.parameters, Local::now()));
                let dir = output_dir.as_ref().unwrap_or(&export.output_dir);

                let bundle = ExportBundle::render(&model, &export, &stem)?;
                let paths = write_artifacts(&bundle, dir, &current_user())?;
                summary.artifacts = paths.iter().map(|p| p.display().to_string()).collect();
            }
            Ok(Response::Generated { summary })
        }

        Request::ValidateParameters { parameters } => Ok(Response::Validated {
            parameters: normalize(parameters)?,
        }),

        Request::LoadCombinations {
            profile,
            structural_system,
        } => {
            let id = profile.as_deref().unwrap_or(&config.default_profile);
            let profile = DesignProfile::from_id(id)?;
            Ok(Response::Combinations {
                profile: profile.id.to_string(),
                structural_system: *structural_system,
                load_cases: load_cases_for(profile, &LoadIntensities::default()),
                combinations: combinations_for(profile, *structural_system),
            })
        }

        Request::ListProfiles => Ok(Response::Profiles {
            profiles: DesignProfile::all().iter().map(ProfileInfo::from).collect(),
        }),

        Request::ListMaterials => Ok(Response::Materials {
            materials: ConcreteGrade::ALL.iter().map(|g| Material::concrete(*g)).collect(),
        }),

        Request::ReferenceBuilding => Ok(Response::Reference {
            parameters: BuildingParameters::reference_building(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GenError;
    use std::collections::HashSet;

    fn generate(parameters: BuildingParameters, dir: PathBuf, write: bool) -> GenResult<Response> {
        let request = Request::Generate {
            parameters,
            output_dir: Some(dir),
            stem: Some("tower".into()),
            table_format: None,
            write,
        };
        dispatch(&request, &GeneratorConfig::default())
    }

    #[test]
    fn test_generate_writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        match generate(BuildingParameters::reference_building(), out.clone(), true).unwrap() {
            Response::Generated { summary } => {
                assert_eq!(summary.floors, 10);
                assert_eq!(summary.artifacts.len(), 2);
                assert!(out.join("tower.dxf").exists());
                assert!(out.join("tower_tables.json").exists());
            }
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn test_generate_without_write_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        match generate(BuildingParameters::reference_building(), out.clone(), false).unwrap() {
            Response::Generated { summary } => assert!(summary.artifacts.is_empty()),
            other => panic!("unexpected response {:?}", other),
        }
        assert!(!out.exists());
    }

    #[test]
    fn test_unknown_profile_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let params = BuildingParameters {
            design_code: "NOPE-1".into(),
            ..BuildingParameters::reference_building()
        };
        let err = generate(params, out.clone(), true).unwrap_err();
        assert_eq!(err, GenError::unsupported_profile("NOPE-1"));
        assert!(!out.exists());
    }

    #[test]
    fn test_stem_outside_output_dir_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let request = Request::Generate {
            parameters: BuildingParameters::reference_building(),
            output_dir: Some(out.clone()),
            stem: Some("../escaped".into()),
            table_format: None,
            write: true,
        };
        match dispatch(&request, &GeneratorConfig::default()) {
            Err(GenError::Validation { field, .. }) => assert_eq!(field, "stem"),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(!dir.path().join("escaped.dxf").exists());
        assert!(!out.exists());
    }

    #[test]
    fn test_validate_reports_field() {
        let request = Request::ValidateParameters {
            parameters: BuildingParameters {
                floors: 0,
                ..BuildingParameters::default()
            },
        };
        match dispatch(&request, &GeneratorConfig::default()) {
            Err(GenError::Validation { field, .. }) => assert_eq!(field, "floors"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_combinations_use_configured_default() {
        let request: Request =
            serde_json::from_str(r#"{"op":"load_combinations","structural_system":"moment_frame"}"#).unwrap();
        match dispatch(&request, &GeneratorConfig::default()).unwrap() {
            Response::Combinations {
                profile,
                combinations,
                load_cases,
                ..
            } => {
                assert_eq!(profile, "ASCE7-22-LRFD");
                assert_eq!(combinations.len(), 18);
                assert!(load_cases.iter().any(|c| c.id == "DEAD"));
            }
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn test_listings() {
        let config = GeneratorConfig::default();
        match dispatch(&Request::ListMaterials, &config).unwrap() {
            Response::Materials { materials } => assert_eq!(materials.len(), ConcreteGrade::ALL.len()),
            other => panic!("unexpected response {:?}", other),
        }
        match dispatch(&Request::ListProfiles, &config).unwrap() {
            Response::Profiles { profiles } => {
                assert!(profiles.iter().any(|p| p.id == crate::loads::DEFAULT_PROFILE_ID));
            }
            other => panic!("unexpected response {:?}", other),
        }
        match dispatch(&Request::ReferenceBuilding, &config).unwrap() {
            Response::Reference { parameters } => assert_eq!(parameters.floors, 10),
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn test_metadata_matches_serde_tags() {
        let ops: HashSet<_> = OperationKind::ALL.iter().map(|k| k.metadata().op).collect();
        assert_eq!(ops.len(), OperationKind::ALL.len());

        let json = serde_json::to_string(&Request::ReferenceBuilding).unwrap();
        assert_eq!(json, r#"{"op":"reference_building"}"#);
        assert_eq!(Request::ReferenceBuilding.kind().metadata().op, "reference_building");
        for kind in OperationKind::ALL {
            let tag = serde_json::to_value(kind).unwrap();
            assert_eq!(tag, kind.metadata().op);
        }
    }
}
