//! Analysis import tables
//!
//! Seven sheets, always in this order:
//!
//! 1. `Grid` - grid line ids and ordinates
//! 2. `Stories` - story ids and elevations
//! 3. `Materials` - concrete grade properties
//! 4. `Sections` - wall, slab, column and beam sections
//! 5. `Assignments` - every member with its story, section and grid endpoints
//! 6. `LoadCases` - unfactored load patterns
//! 7. `LoadCombinations` - one row per (combination, load case)
//!
//! Columns that reference another sheet are listed in [`FOREIGN_KEYS`] and
//! checked by [`Workbook::check_references`].
//!
//! The workbook renders as JSON, as `TABLE:` text blocks, or as an `.xlsx`
//! spreadsheet with one worksheet per sheet (rust_xlsxwriter).
//!
//! # JSON Format
//! ```json
//! {
//!   "sheets": [
//!     {
//!       "name": "Grid",
//!       "columns": ["Grid", "Axis", "Coordinate_m"],
//!       "rows": [["1", "X", 0.0], ["2", "X", 6.0]]
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fmt::Write as _;

use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, XlsxError};
use serde::{Deserialize, Serialize};

use crate::errors::{GenError, GenResult};
use crate::layout::Axis;
use crate::model::{GridPoint, StructuralModel};

/// Rendering of the workbook on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Pretty-printed JSON document
    #[default]
    Json,
    /// `TABLE:` blocks of `Column=value` rows
    Text,
    /// Excel workbook, one worksheet per sheet
    Xlsx,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Json => "json",
            TableFormat::Text => "txt",
            TableFormat::Xlsx => "xlsx",
        }
    }

    pub fn from_str_flexible(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(TableFormat::Json),
            "text" | "txt" => Some(TableFormat::Text),
            "xlsx" | "excel" => Some(TableFormat::Xlsx),
            _ => None,
        }
    }
}

/// Sheet names in workbook order
pub const SHEET_ORDER: [&str; 7] = [
    "Grid",
    "Stories",
    "Materials",
    "Sections",
    "Assignments",
    "LoadCases",
    "LoadCombinations",
];

/// A column whose values must appear in another sheet's column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub sheet: &'static str,
    pub column: &'static str,
    pub target: &'static str,
    pub target_column: &'static str,
    /// Only target rows whose (column, value) matches are candidates
    pub target_filter: Option<(&'static str, &'static str)>,
}

const fn fk(sheet: &'static str, column: &'static str, target: &'static str, target_column: &'static str) -> ForeignKey {
    ForeignKey {
        sheet,
        column,
        target,
        target_column,
        target_filter: None,
    }
}

const fn grid_fk(column: &'static str, axis: &'static str) -> ForeignKey {
    ForeignKey {
        sheet: "Assignments",
        column,
        target: "Grid",
        target_column: "Grid",
        target_filter: Some(("Axis", axis)),
    }
}

pub const FOREIGN_KEYS: [ForeignKey; 9] = [
    fk("Sections", "Material", "Materials", "Material"),
    fk("Assignments", "Story", "Stories", "Story"),
    fk("Assignments", "Section", "Sections", "Section"),
    fk("Assignments", "Material", "Materials", "Material"),
    grid_fk("StartGridX", "X"),
    grid_fk("StartGridY", "Y"),
    grid_fk("EndGridX", "X"),
    grid_fk("EndGridY", "Y"),
    fk("LoadCombinations", "LoadCase", "LoadCases", "LoadCase"),
];

/// A table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<u32> for Cell {
    fn from(v: u32) -> Self {
        Cell::Int(v as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new(name: &str, columns: &[&str]) -> Self {
        Sheet {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width for sheet {}", self.name);
        self.rows.push(row);
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Text values of one column
    pub fn column_values(&self, column: &str) -> Vec<&str> {
        self.column_values_where(column, None)
    }

    /// Text values of one column, restricted to rows where `filter.0`
    /// holds `filter.1`
    pub fn column_values_where(&self, column: &str, filter: Option<(&str, &str)>) -> Vec<&str> {
        let Some(i) = self.column_index(column) else {
            return Vec::new();
        };
        let filter = match filter {
            Some((col, value)) => match self.column_index(col) {
                Some(j) => Some((j, value)),
                None => return Vec::new(),
            },
            None => None,
        };
        self.rows
            .iter()
            .filter(|r| filter.map_or(true, |(j, value)| r.get(j).and_then(Cell::as_text) == Some(value)))
            .filter_map(|r| r.get(i).and_then(Cell::as_text))
            .collect()
    }
}

/// The seven analysis tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

macro_rules! row {
    ($($cell:expr),* $(,)?) => {
        vec![$(Cell::from($cell)),*]
    };
}

fn endpoints(start: &GridPoint, end: &GridPoint) -> [Cell; 4] {
    [
        start.x.as_str().into(),
        start.y.as_str().into(),
        end.x.as_str().into(),
        end.y.as_str().into(),
    ]
}

impl Workbook {
    /// Build the tables from an assembled model
    pub fn from_model(model: &StructuralModel) -> Self {
        let mut grid = Sheet::new("Grid", &["Grid", "Axis", "Coordinate_m"]);
        for g in &model.grid_lines {
            grid.push(row![g.id.as_str(), g.axis.code(), g.coordinate]);
        }

        let mut stories = Sheet::new("Stories", &["Story", "Index", "Elevation_m", "Height_m"]);
        for s in &model.stories {
            stories.push(row![s.id.as_str(), s.index, s.elevation_m, s.height_m]);
        }

        let mut materials = Sheet::new(
            "Materials",
            &["Material", "Type", "Fck_MPa", "E_kN_m2", "G_kN_m2", "U", "A", "UnitWeight_kN_m3"],
        );
        for m in &model.materials {
            let p = &m.properties;
            materials.push(row![
                m.id.as_str(),
                "Concrete",
                p.fck_mpa,
                p.e_kn_m2,
                p.g_kn_m2,
                p.poisson,
                p.thermal_coeff,
                p.unit_weight_kn_m3,
            ]);
        }

        let mut sections = Sheet::new(
            "Sections",
            &[
                "Section", "Type", "Material", "Width_m", "Depth_m", "Area_m2", "I33_m4", "I22_m4",
            ],
        );
        for s in &model.sections {
            sections.push(row![
                s.id.as_str(),
                s.kind.label(),
                s.material.as_str(),
                s.width_m,
                s.depth_m,
                s.area(),
                s.i33(),
                s.i22()
            ]);
        }

        let mut assignments = Sheet::new(
            "Assignments",
            &[
                "Element",
                "Kind",
                "Story",
                "Section",
                "Material",
                "StartGridX",
                "StartGridY",
                "EndGridX",
                "EndGridY",
            ],
        );
        let mut assign = |id: &str, kind: &str, story: &str, section: &str, material: &str, ends: [Cell; 4]| {
            let mut r = row![id, kind, story, section, material];
            r.extend(ends);
            assignments.push(r);
        };
        for w in &model.walls {
            assign(&w.id, "Wall", &w.story, &w.section, &w.material, endpoints(&w.start, &w.end));
        }
        for c in &model.columns {
            assign(&c.id, "Column", &c.story, &c.section, &c.material, endpoints(&c.at, &c.at));
        }
        for b in &model.beams {
            assign(&b.id, "Beam", &b.story, &b.section, &b.material, endpoints(&b.start, &b.end));
        }
        // slabs span the plan from the first to the last grid intersection
        let first = GridPoint {
            x: model.grid_ids(Axis::X).next().unwrap_or_default().to_string(),
            y: model.grid_ids(Axis::Y).next().unwrap_or_default().to_string(),
        };
        let last = GridPoint {
            x: model.grid_ids(Axis::X).last().unwrap_or_default().to_string(),
            y: model.grid_ids(Axis::Y).last().unwrap_or_default().to_string(),
        };
        for s in &model.slabs {
            assign(&s.id, "Slab", &s.story, &s.section, &s.material, endpoints(&first, &last));
        }

        let mut cases = Sheet::new(
            "LoadCases",
            &["LoadCase", "Type", "Direction", "SelfWtMult", "Magnitude_kN_m2", "Method"],
        );
        for c in &model.load_cases {
            cases.push(row![
                c.id.as_str(),
                c.load_type.design_type(),
                c.direction.map_or("", |a| a.code()),
                c.self_weight_multiplier,
                c.magnitude,
                c.method.as_str(),
            ]);
        }

        let mut combos = Sheet::new("LoadCombinations", &["Combo", "Type", "LoadCase", "Factor"]);
        for combo in &model.load_combinations {
            for term in &combo.terms {
                combos.push(row![
                    combo.id.as_str(),
                    combo.limit_state.code(),
                    term.case.as_str(),
                    term.factor,
                ]);
            }
        }

        Workbook {
            sheets: vec![grid, stories, materials, sections, assignments, cases, combos],
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Sheet names in order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Every foreign-key column holds only ids present in the referenced
    /// sheet, and the sheets are in the fixed order.
    pub fn check_references(&self) -> GenResult<()> {
        if self.sheet_names() != SHEET_ORDER {
            return Err(GenError::assembly(
                "workbook",
                self.sheet_names().join(","),
                "Sheets out of order",
            ));
        }
        for key in FOREIGN_KEYS {
            let missing = |name: &str| GenError::assembly("workbook", name, "Missing sheet");
            let source = self.sheet(key.sheet).ok_or_else(|| missing(key.sheet))?;
            let referenced = self.sheet(key.target).ok_or_else(|| missing(key.target))?;
            let known: HashSet<&str> = referenced
                .column_values_where(key.target_column, key.target_filter)
                .into_iter()
                .collect();
            for value in source.column_values(key.column) {
                if !known.contains(value) {
                    let scope = match key.target_filter {
                        Some((col, v)) => format!(" where {}={}", col, v),
                        None => String::new(),
                    };
                    return Err(GenError::assembly(
                        format!("{}.{}", key.sheet, key.column),
                        value,
                        format!("Not found in {}.{}{}", key.target, key.target_column, scope),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> GenResult<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    /// `TABLE:  "Name"` blocks, one `Column=value` line per row
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for sheet in &self.sheets {
            let _ = writeln!(out, "TABLE:  \"{}\"", sheet.name);
            for row in &sheet.rows {
                let mut line = String::new();
                for (column, cell) in sheet.columns.iter().zip(row) {
                    let value = cell.to_string();
                    if value.contains(char::is_whitespace) || value.is_empty() {
                        let _ = write!(line, "   {}=\"{}\"", column, value);
                    } else {
                        let _ = write!(line, "   {}={}", column, value);
                    }
                }
                let _ = writeln!(out, "{}", line);
            }
            out.push('\n');
        }
        out
    }

    /// Excel workbook bytes, one worksheet per sheet with a bold header row.
    ///
    /// The document creation date is pinned so identical models give
    /// identical bytes.
    pub fn to_xlsx(&self) -> GenResult<Vec<u8>> {
        self.build_xlsx().map_err(|e| GenError::Serialization {
            reason: format!("xlsx: {}", e),
        })
    }

    fn build_xlsx(&self) -> Result<Vec<u8>, XlsxError> {
        let mut book = rust_xlsxwriter::Workbook::new();
        let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
        book.set_properties(&DocProperties::new().set_creation_datetime(&created));
        let header = Format::new().set_bold();

        for sheet in &self.sheets {
            let ws = book.add_worksheet();
            ws.set_name(&sheet.name)?;
            for (c, column) in sheet.columns.iter().enumerate() {
                ws.write_string_with_format(0, c as u16, column, &header)?;
            }
            for (r, row) in sheet.rows.iter().enumerate() {
                let r = r as u32 + 1;
                for (c, cell) in row.iter().enumerate() {
                    let c = c as u16;
                    match cell {
                        Cell::Int(v) => ws.write_number(r, c, *v as f64)?,
                        Cell::Number(v) => ws.write_number(r, c, *v)?,
                        Cell::Text(v) => ws.write_string(r, c, v)?,
                    };
                }
            }
        }
        book.save_to_buffer()
    }

    /// Bytes of the artifact in the requested format
    pub fn render(&self, format: TableFormat) -> GenResult<Vec<u8>> {
        match format {
            TableFormat::Json => Ok(self.to_json()?.into_bytes()),
            TableFormat::Text => Ok(self.to_text().into_bytes()),
            TableFormat::Xlsx => self.to_xlsx(),
        }
    }
}
