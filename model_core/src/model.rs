//! # Structural Model
//!
//! The aggregate root both exporters read from. The assembler turns a
//! [`Layout`] (grid indices only) into named entities, attaches the material,
//! sections, load cases and combinations, and then checks that every
//! cross-reference resolves inside the model.
//!
//! Identifiers are deterministic:
//!
//! | Entity | Id |
//! |--------|----|
//! | X grid line | `1`, `2`, … |
//! | Y grid line | `A`, `B`, … `AA` |
//! | Story | `Story1`, `Story2`, … |
//! | Wall | `W{story}-{n}` |
//! | Column | `C{story}-{n}` |
//! | Beam | `B{story}-{n}` |
//! | Slab | `S{story}` |
//!
//! `n` counts from 1 in (direction, line, bay) order within a story.
//!
//! ## Example
//!
//! ```rust
//! use model_core::config::GeneratorConfig;
//! use model_core::model::generate_model;
//! use model_core::params::BuildingParameters;
//!
//! let model = generate_model(&BuildingParameters::reference_building(), &GeneratorConfig::default()).unwrap();
//! assert_eq!(model.stories.len(), 10);
//! assert_eq!(model.slabs.len(), 10);
//! assert!(model.check_integrity().is_ok());
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::{FrameConfig, GeneratorConfig};
use crate::errors::{GenError, GenResult};
use crate::layout::{compute_layout, Axis, AxisGrid, Layout, Node};
use crate::loads::{combinations_for, load_cases_for, DesignProfile, LoadCase, LoadCombination};
use crate::materials::{Material, Section, SectionKind};
use crate::params::{normalize, BuildingParameters, NormalizedParameters};

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub id: String,
    pub axis: Axis,
    /// x-ordinate for X lines, y-ordinate for Y lines (m)
    pub coordinate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub index: u32,
    /// Floor elevation at the top of the story (m)
    pub elevation_m: f64,
    pub height_m: f64,
}

impl Story {
    pub fn base_m(&self) -> f64 {
        self.elevation_m - self.height_m
    }
}

/// Grid intersection by line ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: String,
    pub y: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub id: String,
    pub story: String,
    pub direction: Axis,
    pub start: GridPoint,
    pub end: GridPoint,
    pub thickness_m: f64,
    pub section: String,
    pub material: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub story: String,
    pub at: GridPoint,
    pub section: String,
    pub material: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub id: String,
    pub story: String,
    pub direction: Axis,
    pub start: GridPoint,
    pub end: GridPoint,
    pub section: String,
    pub material: String,
}

/// Full-plan floor slab at the top of a story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    pub id: String,
    pub story: String,
    pub thickness_m: f64,
    pub section: String,
    pub material: String,
}

/// Wall coverage achieved by the layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub target_ratio: f64,
    pub achieved_ratio: f64,
    /// Coverage of one wall; the allowed deviation from the target
    pub tolerance: f64,
    pub wall_area_per_story_m2: f64,
    /// Perimeter wall-band area the ratio is measured against (m²)
    pub reference_area_m2: f64,
    /// Wall plan area over floor plate area
    pub floor_plate_ratio: f64,
}

/// Complete structural model; built once per request, never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralModel {
    pub parameters: NormalizedParameters,
    pub profile: String,
    pub grid_lines: Vec<GridLine>,
    pub stories: Vec<Story>,
    pub materials: Vec<Material>,
    pub sections: Vec<Section>,
    pub walls: Vec<WallSegment>,
    pub columns: Vec<Column>,
    pub beams: Vec<Beam>,
    pub slabs: Vec<Slab>,
    pub load_cases: Vec<LoadCase>,
    pub load_combinations: Vec<LoadCombination>,
    pub coverage: Option<Coverage>,
}

// ============================================================================
// Assembly
// ============================================================================

fn grid_lines(grid: &AxisGrid) -> Vec<GridLine> {
    grid.coordinates
        .iter()
        .enumerate()
        .map(|(i, &coordinate)| GridLine {
            id: grid.label(i),
            axis: grid.axis,
            coordinate,
        })
        .collect()
}

fn point(x: &AxisGrid, y: &AxisGrid, node: Node) -> GridPoint {
    GridPoint {
        x: x.label(node.0),
        y: y.label(node.1),
    }
}

/// Assign identifiers and attach material, sections and loads.
pub fn assemble(
    params: &NormalizedParameters,
    layout: Layout,
    profile: &DesignProfile,
    frame: &FrameConfig,
) -> GenResult<StructuralModel> {
    let material = Material::concrete(params.concrete_grade);
    let mat = material.id.clone();

    let slab_section = Section::rectangle(SectionKind::Slab, &mat, 1.0, params.slab_thickness_m);
    let wall_section = layout
        .walls
        .as_ref()
        .map(|_| Section::rectangle(SectionKind::Wall, &mat, 1.0, params.wall_thickness_m));
    let frame_sections = layout.frame.as_ref().map(|_| {
        (
            Section::rectangle(SectionKind::Column, &mat, frame.column_size_m, frame.column_size_m),
            Section::rectangle(SectionKind::Beam, &mat, frame.beam_width_m, frame.beam_depth_m),
        )
    });

    let (x, y) = (&layout.x_grid, &layout.y_grid);
    let mut grid = grid_lines(x);
    grid.extend(grid_lines(y));

    let stories: Vec<Story> = layout
        .stories
        .iter()
        .map(|s| Story {
            id: format!("Story{}", s.index),
            index: s.index,
            elevation_m: s.elevation_m,
            height_m: s.height_m,
        })
        .collect();

    let mut walls = Vec::new();
    let mut columns = Vec::new();
    let mut beams = Vec::new();
    let mut slabs = Vec::new();

    for story in &stories {
        if let (Some(wall_layout), Some(section)) = (&layout.walls, &wall_section) {
            for (k, edge) in wall_layout.edges.iter().enumerate() {
                let (start, end) = edge.endpoints();
                walls.push(WallSegment {
                    id: format!("W{}-{}", story.index, k + 1),
                    story: story.id.clone(),
                    direction: edge.run,
                    start: point(x, y, start),
                    end: point(x, y, end),
                    thickness_m: params.wall_thickness_m,
                    section: section.id.clone(),
                    material: mat.clone(),
                });
            }
        }

        if let (Some(frame_layout), Some((col_section, beam_section))) = (&layout.frame, &frame_sections) {
            for (k, &node) in frame_layout.columns.iter().enumerate() {
                columns.push(Column {
                    id: format!("C{}-{}", story.index, k + 1),
                    story: story.id.clone(),
                    at: point(x, y, node),
                    section: col_section.id.clone(),
                    material: mat.clone(),
                });
            }
            for (k, edge) in frame_layout.beams.iter().enumerate() {
                let (start, end) = edge.endpoints();
                beams.push(Beam {
                    id: format!("B{}-{}", story.index, k + 1),
                    story: story.id.clone(),
                    direction: edge.run,
                    start: point(x, y, start),
                    end: point(x, y, end),
                    section: beam_section.id.clone(),
                    material: mat.clone(),
                });
            }
        }

        slabs.push(Slab {
            id: format!("S{}", story.index),
            story: story.id.clone(),
            thickness_m: params.slab_thickness_m,
            section: slab_section.id.clone(),
            material: mat.clone(),
        });
    }

    let coverage = layout.walls.as_ref().map(|w| Coverage {
        target_ratio: w.target_ratio,
        achieved_ratio: w.achieved_ratio,
        tolerance: w.tolerance,
        wall_area_per_story_m2: w.wall_area(),
        reference_area_m2: w.reference_area_m2,
        floor_plate_ratio: w.wall_area() / params.plan_area(),
    });

    let mut sections = Vec::new();
    sections.extend(wall_section);
    sections.push(slab_section);
    if let Some((col, beam)) = frame_sections {
        sections.push(col);
        sections.push(beam);
    }

    let model = StructuralModel {
        parameters: params.clone(),
        profile: profile.id.to_string(),
        grid_lines: grid,
        stories,
        materials: vec![material],
        sections,
        walls,
        columns,
        beams,
        slabs,
        load_cases: load_cases_for(profile, &params.loads),
        load_combinations: combinations_for(profile, params.structural_system),
        coverage,
    };
    model.check_integrity()?;

    log::info!(
        "Assembled {} model: {} stories, {} walls, {} columns, {} beams, {} combinations",
        params.structural_system,
        model.stories.len(),
        model.walls.len(),
        model.columns.len(),
        model.beams.len(),
        model.load_combinations.len()
    );
    Ok(model)
}

/// Normalize, resolve the profile, lay out and assemble.
///
/// The profile is resolved before any layout work so an unknown identifier
/// fails fast.
pub fn generate_model(params: &BuildingParameters, config: &GeneratorConfig) -> GenResult<StructuralModel> {
    let normalized = normalize(params)?;
    let profile = DesignProfile::from_id(&normalized.design_code)?;
    let layout = compute_layout(&normalized, &config.layout)?;
    assemble(&normalized, layout, profile, &config.frame)
}

// ============================================================================
// Queries and integrity
// ============================================================================

fn check_unique<'a>(entity: &str, ids: impl Iterator<Item = &'a str>) -> GenResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(GenError::assembly(entity, id, "Duplicate identifier"));
        }
    }
    Ok(())
}

fn check_ref(known: &HashSet<&str>, entity: &str, reference: &str, what: &str) -> GenResult<()> {
    if known.contains(reference) {
        Ok(())
    } else {
        Err(GenError::assembly(entity, reference, format!("Unknown {}", what)))
    }
}

impl StructuralModel {
    /// Grid line ids along one axis, in order
    pub fn grid_ids(&self, axis: Axis) -> impl Iterator<Item = &str> {
        self.grid_lines
            .iter()
            .filter(move |g| g.axis == axis)
            .map(|g| g.id.as_str())
    }

    /// Coordinate lookup for grid ids, keyed by (axis, id)
    pub fn grid_index(&self) -> HashMap<(Axis, &str), f64> {
        self.grid_lines
            .iter()
            .map(|g| ((g.axis, g.id.as_str()), g.coordinate))
            .collect()
    }

    /// Plan coordinates of a grid intersection
    pub fn locate(&self, index: &HashMap<(Axis, &str), f64>, p: &GridPoint) -> Option<(f64, f64)> {
        let x = index.get(&(Axis::X, p.x.as_str()))?;
        let y = index.get(&(Axis::Y, p.y.as_str()))?;
        Some((*x, *y))
    }

    pub fn story(&self, id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.id == id)
    }

    pub fn walls_in_story<'a>(&'a self, story: &'a str) -> impl Iterator<Item = &'a WallSegment> + 'a {
        self.walls.iter().filter(move |w| w.story == story)
    }

    /// Number of drawing entities (grid lines plus every member)
    pub fn entity_count(&self) -> usize {
        self.grid_lines.len() + self.walls.len() + self.columns.len() + self.beams.len() + self.slabs.len()
    }

    /// Every id unique within its table and every reference resolvable.
    pub fn check_integrity(&self) -> GenResult<()> {
        check_unique("grid_line", self.grid_lines.iter().map(|g| g.id.as_str()))?;
        check_unique("story", self.stories.iter().map(|s| s.id.as_str()))?;
        check_unique("material", self.materials.iter().map(|m| m.id.as_str()))?;
        check_unique("section", self.sections.iter().map(|s| s.id.as_str()))?;
        check_unique("wall", self.walls.iter().map(|w| w.id.as_str()))?;
        check_unique("column", self.columns.iter().map(|c| c.id.as_str()))?;
        check_unique("beam", self.beams.iter().map(|b| b.id.as_str()))?;
        check_unique("slab", self.slabs.iter().map(|s| s.id.as_str()))?;
        check_unique("load_case", self.load_cases.iter().map(|c| c.id.as_str()))?;
        check_unique("load_combination", self.load_combinations.iter().map(|c| c.id.as_str()))?;

        let stories: HashSet<&str> = self.stories.iter().map(|s| s.id.as_str()).collect();
        let materials: HashSet<&str> = self.materials.iter().map(|m| m.id.as_str()).collect();
        let sections: HashSet<&str> = self.sections.iter().map(|s| s.id.as_str()).collect();
        let cases: HashSet<&str> = self.load_cases.iter().map(|c| c.id.as_str()).collect();
        let x_lines: HashSet<&str> = self.grid_ids(Axis::X).collect();
        let y_lines: HashSet<&str> = self.grid_ids(Axis::Y).collect();

        let check_point = |entity: &str, p: &GridPoint| -> GenResult<()> {
            check_ref(&x_lines, entity, &p.x, "X grid line")?;
            check_ref(&y_lines, entity, &p.y, "Y grid line")
        };
        let check_member = |entity: &str, story: &str, section: &str, material: &str| -> GenResult<()> {
            check_ref(&stories, entity, story, "story")?;
            check_ref(&sections, entity, section, "section")?;
            check_ref(&materials, entity, material, "material")
        };

        for section in &self.sections {
            check_ref(&materials, &section.id, &section.material, "material")?;
        }
        for wall in &self.walls {
            check_member(&wall.id, &wall.story, &wall.section, &wall.material)?;
            check_point(&wall.id, &wall.start)?;
            check_point(&wall.id, &wall.end)?;
            if wall.start == wall.end {
                return Err(GenError::assembly(&wall.id, &wall.start.x, "Zero-length wall"));
            }
        }
        for column in &self.columns {
            check_member(&column.id, &column.story, &column.section, &column.material)?;
            check_point(&column.id, &column.at)?;
        }
        for beam in &self.beams {
            check_member(&beam.id, &beam.story, &beam.section, &beam.material)?;
            check_point(&beam.id, &beam.start)?;
            check_point(&beam.id, &beam.end)?;
        }
        for slab in &self.slabs {
            check_member(&slab.id, &slab.story, &slab.section, &slab.material)?;
        }
        for combo in &self.load_combinations {
            for term in &combo.terms {
                check_ref(&cases, &combo.id, &term.case, "load case")?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Headline numbers of a generated model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub floors: u32,
    pub structural_system: String,
    pub profile: String,
    pub bays_x: usize,
    pub bays_y: usize,
    pub span_x_m: f64,
    pub span_y_m: f64,
    pub walls_per_story: usize,
    pub total_walls: usize,
    pub columns: usize,
    pub beams: usize,
    pub slabs: usize,
    pub total_entities: usize,
    pub coverage_ratio: Option<f64>,
    pub target_ratio: Option<f64>,
    pub floor_plate_ratio: Option<f64>,
    pub load_cases: usize,
    pub load_combinations: usize,
    /// Written artifact paths; empty when nothing was exported
    #[serde(default)]
    pub artifacts: Vec<String>,
}

impl GenerationSummary {
    pub fn from_model(model: &StructuralModel) -> Self {
        let bays = |axis| model.grid_ids(axis).count().saturating_sub(1);
        let (bays_x, bays_y) = (bays(Axis::X), bays(Axis::Y));
        let p = &model.parameters;
        let floors = model.stories.len().max(1);
        GenerationSummary {
            floors: p.floors,
            structural_system: p.structural_system.code().to_string(),
            profile: model.profile.clone(),
            bays_x,
            bays_y,
            span_x_m: p.length_m / bays_x.max(1) as f64,
            span_y_m: p.width_m / bays_y.max(1) as f64,
            walls_per_story: model.walls.len() / floors,
            total_walls: model.walls.len(),
            columns: model.columns.len(),
            beams: model.beams.len(),
            slabs: model.slabs.len(),
            total_entities: model.entity_count(),
            coverage_ratio: model.coverage.map(|c| c.achieved_ratio),
            target_ratio: model.coverage.map(|c| c.target_ratio),
            floor_plate_ratio: model.coverage.map(|c| c.floor_plate_ratio),
            load_cases: model.load_cases.len(),
            load_combinations: model.load_combinations.len(),
            artifacts: Vec::new(),
        }
    }
}
