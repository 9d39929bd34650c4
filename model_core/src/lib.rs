//! # model_core - Parametric Structural Model Generator
//!
//! `model_core` turns a handful of building parameters (floor count, plan
//! dimensions, heights, wall thickness, structural system, target shear-wall
//! ratio, design-code profile) into a complete analytical model of a
//! reinforced-concrete building, and serializes it as a DXF drawing plus the
//! analysis import tables.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: every stage is a function of its inputs; no global handle
//! - **Deterministic**: identical requests give byte-identical artifacts
//! - **JSON-First**: requests, responses and the model are serde types
//! - **Rich Errors**: failures name the field, constraint or id involved
//!
//! ## Pipeline
//!
//! ```text
//! BuildingParameters -> normalize -> compute_layout -> assemble -> ExportBundle -> write_artifacts
//!                                          ^                ^
//!                                    LayoutConfig      DesignProfile
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use model_core::config::GeneratorConfig;
//! use model_core::model::{generate_model, GenerationSummary};
//! use model_core::params::BuildingParameters;
//!
//! let model = generate_model(&BuildingParameters::reference_building(), &GeneratorConfig::default()).unwrap();
//! let summary = GenerationSummary::from_model(&model);
//! assert_eq!(summary.floors, 10);
//! assert!(summary.total_walls > 0);
//! ```
//!
//! ## Modules
//!
//! - [`params`] - Request parameters and the normalizer
//! - [`layout`] - Grid, wall placement and frame layout
//! - [`loads`] - Load cases and design-code combination profiles
//! - [`model`] - Model assembly, integrity checks and summaries
//! - [`export`] - DXF drawing and analysis table serializers
//! - [`file_io`] - Atomic artifact writes with directory locking
//! - [`operations`] - Typed request registry
//! - [`config`] - Layout constants and export settings
//! - [`materials`] - Concrete grades and member sections
//! - [`units`] - Length units
//! - [`errors`] - Structured error types

pub mod config;
pub mod errors;
pub mod export;
pub mod file_io;
pub mod layout;
pub mod loads;
pub mod materials;
pub mod model;
pub mod operations;
pub mod params;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use config::GeneratorConfig;
pub use errors::{GenError, GenResult};
pub use export::ExportBundle;
pub use file_io::{write_artifacts, OutputLock};
pub use model::{generate_model, GenerationSummary, StructuralModel};
pub use operations::{dispatch, Request, Response};
pub use params::{normalize, BuildingParameters, NormalizedParameters, StructuralSystem};
