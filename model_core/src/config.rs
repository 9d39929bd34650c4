//! # Generator Configuration
//!
//! Design constants the layout engine and exporters work with. None of these
//! come from the request; they are fixed per deployment and may be
//! overridden from a TOML file.
//!
//! ```toml
//! default_profile = "EN1990"
//!
//! [layout]
//! min_span_m = 4.0
//! max_span_m = 8.0
//! preferred_span_m = 6.0
//! min_walls = 4
//!
//! [export]
//! output_dir = "exports"
//! table_format = "text"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{GenError, GenResult};
use crate::export::tables::TableFormat;

/// Grid and wall placement constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Shortest bay span the grid aims for (m)
    pub min_span_m: f64,
    /// Longest bay span the grid allows (m)
    pub max_span_m: f64,
    /// Span the bay count is rounded towards (m)
    pub preferred_span_m: f64,
    /// Minimum number of walls per story under the symmetric policy
    pub min_walls: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            min_span_m: 4.0,
            max_span_m: 8.0,
            preferred_span_m: 6.0,
            min_walls: 4,
        }
    }
}

/// Frame member sizes for moment-frame and dual systems
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Square column side (m)
    pub column_size_m: f64,
    pub beam_width_m: f64,
    pub beam_depth_m: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        FrameConfig {
            column_size_m: 0.4,
            beam_width_m: 0.3,
            beam_depth_m: 0.6,
        }
    }
}

/// Artifact output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub table_format: TableFormat,
    /// Decimal places for coordinates in the DXF drawing
    pub dxf_precision: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            output_dir: PathBuf::from("exports"),
            table_format: TableFormat::Json,
            dxf_precision: 6,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Profile used by callers that do not name one
    pub default_profile: String,
    pub layout: LayoutConfig,
    pub frame: FrameConfig,
    pub export: ExportConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            default_profile: crate::loads::DEFAULT_PROFILE_ID.to_string(),
            layout: LayoutConfig::default(),
            frame: FrameConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str, origin: &str) -> GenResult<Self> {
        let config: GeneratorConfig = toml::from_str(text).map_err(|e| GenError::Config {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> GenResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| GenError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text, &path.display().to_string())?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> GenResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Check the constants are usable by the layout engine
    pub fn validate(&self, origin: &str) -> GenResult<()> {
        let fail = |reason: String| {
            Err(GenError::Config {
                path: origin.to_string(),
                reason,
            })
        };
        let l = &self.layout;
        if !(l.min_span_m > 0.0 && l.min_span_m <= l.max_span_m) {
            return fail(format!(
                "layout spans must satisfy 0 < min_span_m <= max_span_m (got {} / {})",
                l.min_span_m, l.max_span_m
            ));
        }
        if !(l.min_span_m..=l.max_span_m).contains(&l.preferred_span_m) {
            return fail(format!(
                "layout.preferred_span_m {} is outside [{}, {}]",
                l.preferred_span_m, l.min_span_m, l.max_span_m
            ));
        }
        if l.min_walls < 2 || l.min_walls % 2 != 0 {
            return fail(format!("layout.min_walls must be an even number >= 2 (got {})", l.min_walls));
        }
        let f = &self.frame;
        if f.column_size_m <= 0.0 || f.beam_width_m <= 0.0 || f.beam_depth_m <= 0.0 {
            return fail("frame member sizes must be positive".to_string());
        }
        if self.export.dxf_precision == 0 || self.export.dxf_precision > 12 {
            return fail(format!(
                "export.dxf_precision must be within 1..=12 (got {})",
                self.export.dxf_precision
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate("default").is_ok());
        assert_eq!(config.layout.min_walls, 4);
        assert_eq!(config.default_profile, "ASCE7-22-LRFD");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            default_profile = "EN1990"

            [layout]
            max_span_m = 9.0

            [export]
            table_format = "text"
        "#;
        let config = GeneratorConfig::from_toml_str(text, "inline").unwrap();
        assert_eq!(config.default_profile, "EN1990");
        assert_eq!(config.layout.max_span_m, 9.0);
        assert_eq!(config.layout.min_span_m, 4.0);
        assert_eq!(config.export.table_format, TableFormat::Text);
        assert_eq!(config.frame, FrameConfig::default());
    }

    #[test]
    fn test_odd_min_walls_rejected() {
        let text = "[layout]\nmin_walls = 3\n";
        match GeneratorConfig::from_toml_str(text, "inline") {
            Err(GenError::Config { reason, .. }) => assert!(reason.contains("min_walls")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_toml_reports_origin() {
        match GeneratorConfig::from_toml_str("layout = [", "bad.toml") {
            Err(GenError::Config { path, .. }) => assert_eq!(path, "bad.toml"),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bayline.toml");
        fs::write(&path, "[frame]\ncolumn_size_m = 0.5\n").unwrap();
        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.frame.column_size_m, 0.5);

        let missing = GeneratorConfig::load(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(GenError::Config { .. })));
    }
}
