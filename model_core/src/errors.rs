//! # Error Types
//!
//! Structured error types for model_core. Every failure names the field,
//! constraint, identifier or path involved so a caller (human or program)
//! can tell what to fix without parsing the message.
//!
//! The variants split into two families:
//!
//! - **model errors** (`Validation`, `Layout`, `UnsupportedProfile`,
//!   `Assembly`) - no valid model could be built from the request
//! - **export errors** (`Export`, `ExportLocked`, `Serialization`) - a valid
//!   model exists but its artifacts could not be persisted
//!
//! ## Example
//!
//! ```rust
//! use model_core::errors::{GenError, GenResult};
//!
//! fn validate_floor_height(height_m: f64) -> GenResult<()> {
//!     if height_m <= 0.0 {
//!         return Err(GenError::validation(
//!             "floor_height",
//!             height_m.to_string(),
//!             "Floor height must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for model_core operations
pub type GenResult<T> = Result<T, GenError>;

/// Structured error type for model generation and export.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum GenError {
    /// A request parameter is invalid (out of range, wrong unit, unknown enum)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },

    /// The request is valid but no layout satisfies the placement rules
    #[error("Layout infeasible ({constraint}): {reason}")]
    Layout { constraint: String, reason: String },

    /// Design-code profile identifier is not in the combination tables
    #[error("Unsupported design-code profile: '{profile}'")]
    UnsupportedProfile { profile: String },

    /// Internal consistency fault: a reference inside the model does not resolve
    #[error("Assembly fault in {entity}: reference '{reference}' - {reason}")]
    Assembly {
        entity: String,
        reference: String,
        reason: String,
    },

    /// Artifact could not be written
    #[error("Export error: {operation} on '{path}' - {reason}")]
    Export {
        operation: String,
        path: String,
        reason: String,
    },

    /// Output directory is locked by another request
    #[error("Export locked: '{path}' is locked by {locked_by} since {locked_at}")]
    ExportLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error in '{path}': {reason}")]
    Config { path: String, reason: String },
}

impl GenError {
    /// Create a Validation error
    pub fn validation(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        GenError::Validation {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a Layout error
    pub fn layout(constraint: impl Into<String>, reason: impl Into<String>) -> Self {
        GenError::Layout {
            constraint: constraint.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedProfile error
    pub fn unsupported_profile(profile: impl Into<String>) -> Self {
        GenError::UnsupportedProfile {
            profile: profile.into(),
        }
    }

    /// Create an Assembly error
    pub fn assembly(entity: impl Into<String>, reference: impl Into<String>, reason: impl Into<String>) -> Self {
        GenError::Assembly {
            entity: entity.into(),
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Create an Export error
    pub fn export(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        GenError::Export {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an ExportLocked error
    pub fn export_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        GenError::ExportLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GenError::ExportLocked { .. })
    }

    /// True when no valid model could be built from the request
    pub fn is_model_error(&self) -> bool {
        matches!(
            self,
            GenError::Validation { .. }
                | GenError::Layout { .. }
                | GenError::UnsupportedProfile { .. }
                | GenError::Assembly { .. }
        )
    }

    /// True when the model was valid but persisting it failed
    pub fn is_export_error(&self) -> bool {
        matches!(
            self,
            GenError::Export { .. } | GenError::ExportLocked { .. } | GenError::Serialization { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            GenError::Validation { .. } => "VALIDATION_ERROR",
            GenError::Layout { .. } => "LAYOUT_ERROR",
            GenError::UnsupportedProfile { .. } => "UNSUPPORTED_PROFILE",
            GenError::Assembly { .. } => "ASSEMBLY_ERROR",
            GenError::Export { .. } => "EXPORT_ERROR",
            GenError::ExportLocked { .. } => "EXPORT_LOCKED",
            GenError::Serialization { .. } => "SERIALIZATION_ERROR",
            GenError::Config { .. } => "CONFIG_ERROR",
        }
    }
}

impl From<serde_json::Error> for GenError {
    fn from(e: serde_json::Error) -> Self {
        GenError::Serialization { reason: e.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = GenError::validation("floors", "0", "Floor count must be at least 1");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"Validation\""));
        let roundtrip: GenError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(GenError::layout("min_wall_count", "x").error_code(), "LAYOUT_ERROR");
        assert_eq!(GenError::unsupported_profile("XYZ").error_code(), "UNSUPPORTED_PROFILE");
        assert_eq!(GenError::assembly("W1-1", "Story9", "x").error_code(), "ASSEMBLY_ERROR");
    }

    #[test]
    fn test_model_and_export_families_are_disjoint() {
        let model = GenError::validation("floors", "0", "x");
        let export = GenError::export("rename", "/tmp/a.dxf", "denied");
        assert!(model.is_model_error() && !model.is_export_error());
        assert!(export.is_export_error() && !export.is_model_error());
        assert!(!GenError::unsupported_profile("X").is_recoverable());
        assert!(GenError::export_locked("/tmp", "someone", "now").is_recoverable());
    }

    #[test]
    fn test_display_names_field() {
        let msg = GenError::validation("floors", "0", "Floor count must be at least 1").to_string();
        assert!(msg.contains("'floors'"));
    }
}
