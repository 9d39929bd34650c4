//! Export serializers
//!
//! Both serializers are pure functions of the assembled model: identical
//! models give byte-identical artifacts. Writing them to disk is the job of
//! [`crate::file_io`].
//!
//! - [`dxf`] - geometric drawing (ASCII DXF)
//! - [`tables`] - the seven analysis import tables

pub mod dxf;
pub mod tables;

pub use dxf::{coverage_from_dxf, read_entities, read_faces, write_dxf, DxfEntity, LevelCoverage};
pub use tables::{Cell, Sheet, TableFormat, Workbook};

use serde::{Deserialize, Serialize};

use crate::config::ExportConfig;
use crate::errors::GenResult;
use crate::model::StructuralModel;

/// A rendered file, not yet on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl Artifact {
    /// Contents as UTF-8, `None` for binary formats
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }
}

/// Drawing plus tables for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub drawing: Artifact,
    pub tables: Artifact,
}

impl ExportBundle {
    /// Render both artifacts, named `<stem>.dxf` and `<stem>_tables.<ext>`
    pub fn render(model: &StructuralModel, config: &ExportConfig, stem: &str) -> GenResult<Self> {
        let workbook = Workbook::from_model(model);
        workbook.check_references()?;

        Ok(ExportBundle {
            drawing: Artifact {
                file_name: format!("{}.dxf", stem),
                contents: write_dxf(model, config.dxf_precision)?.into_bytes(),
            },
            tables: Artifact {
                file_name: format!("{}_tables.{}", stem, config.table_format.extension()),
                contents: workbook.render(config.table_format)?,
            },
        })
    }

    pub fn artifacts(&self) -> [&Artifact; 2] {
        [&self.drawing, &self.tables]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::model::generate_model;
    use crate::params::BuildingParameters;

    #[test]
    fn test_bundle_names() {
        let config = GeneratorConfig::default();
        let model = generate_model(&BuildingParameters::reference_building(), &config).unwrap();
        let bundle = ExportBundle::render(&model, &config.export, "tower").unwrap();
        assert_eq!(bundle.drawing.file_name, "tower.dxf");
        assert_eq!(bundle.tables.file_name, "tower_tables.json");

        let text = ExportConfig {
            table_format: TableFormat::Text,
            ..config.export.clone()
        };
        let bundle = ExportBundle::render(&model, &text, "tower").unwrap();
        assert_eq!(bundle.tables.file_name, "tower_tables.txt");
        assert!(bundle.tables.text().unwrap().starts_with("TABLE:"));

        let xlsx = ExportConfig {
            table_format: TableFormat::Xlsx,
            ..config.export.clone()
        };
        let bundle = ExportBundle::render(&model, &xlsx, "tower").unwrap();
        assert_eq!(bundle.tables.file_name, "tower_tables.xlsx");
        // zip container
        assert!(bundle.tables.contents.starts_with(b"PK"));
        assert!(bundle.drawing.text().unwrap().ends_with("EOF\n"));
    }
}
