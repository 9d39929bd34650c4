//! Structural layout: grid, stories, shear walls and frame members
//!
//! The layout is expressed entirely in grid indices. Identifiers are assigned
//! later, by the model assembler.
//!
//! # Overview
//!
//! - [`AxisGrid`] - grid ordinates along one axis
//! - [`StoryLevel`] - story index and elevation
//! - [`WallLayout`] - symmetric shear-wall selection for a typical story
//! - [`FrameLayout`] - columns and beams for a typical story
//!
//! Every story repeats the same plan layout.
//!
//! # Example
//!
//! ```
//! use model_core::config::LayoutConfig;
//! use model_core::layout::compute_layout;
//! use model_core::params::{normalize, BuildingParameters};
//!
//! let params = normalize(&BuildingParameters::reference_building()).unwrap();
//! let layout = compute_layout(&params, &LayoutConfig::default()).unwrap();
//!
//! assert_eq!(layout.stories.len(), 10);
//! assert_eq!(layout.x_grid.bay_count(), 6);
//! ```

pub mod frame;
pub mod grid;
pub mod walls;

pub use frame::FrameLayout;
pub use grid::{bay_count, grid_label, Axis, AxisGrid, BayEdge, Node};
pub use walls::{place_walls, Orbit, WallLayout};

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::errors::GenResult;
use crate::params::NormalizedParameters;

/// One story of the building
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoryLevel {
    /// 1-based story index
    pub index: u32,
    /// Elevation of the floor at the top of the story (m)
    pub elevation_m: f64,
    pub height_m: f64,
}

impl StoryLevel {
    /// Elevation of the story base (m)
    pub fn base_m(&self) -> f64 {
        self.elevation_m - self.height_m
    }
}

/// Stories 1..=floors with `elevation = index × floor_height`
pub fn stories(floors: u32, floor_height_m: f64) -> Vec<StoryLevel> {
    (1..=floors)
        .map(|index| StoryLevel {
            index,
            elevation_m: index as f64 * floor_height_m,
            height_m: floor_height_m,
        })
        .collect()
}

/// Complete plan and elevation layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub x_grid: AxisGrid,
    pub y_grid: AxisGrid,
    pub stories: Vec<StoryLevel>,
    /// Present for shear-wall and dual systems
    pub walls: Option<WallLayout>,
    /// Present for moment-frame and dual systems
    pub frame: Option<FrameLayout>,
}

impl Layout {
    pub fn walls_per_story(&self) -> usize {
        self.walls.as_ref().map_or(0, |w| w.edges.len())
    }
}

/// Compute the layout for validated parameters
pub fn compute_layout(params: &NormalizedParameters, config: &LayoutConfig) -> GenResult<Layout> {
    let x_grid = AxisGrid::for_length(Axis::X, params.length_m, config);
    let y_grid = AxisGrid::for_length(Axis::Y, params.width_m, config);
    log::debug!(
        "Grid: {} x {} bays ({:.3} m x {:.3} m spans)",
        x_grid.bay_count(),
        y_grid.bay_count(),
        x_grid.nominal_span(),
        y_grid.nominal_span()
    );

    let walls = match params.shear_wall_ratio {
        Some(target) if params.structural_system.has_walls() => Some(place_walls(
            &x_grid,
            &y_grid,
            params.wall_thickness_m,
            target,
            params.perimeter_band_area(),
            config,
        )?),
        _ => None,
    };

    let frame = params
        .structural_system
        .has_frame()
        .then(|| FrameLayout::for_grid(&x_grid, &y_grid));

    Ok(Layout {
        stories: stories(params.floors, params.floor_height_m),
        x_grid,
        y_grid,
        walls,
        frame,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GenError;
    use crate::params::{normalize, BuildingParameters, StructuralSystem};

    fn seven_storey() -> NormalizedParameters {
        normalize(&BuildingParameters {
            floors: 7,
            length: 30.0,
            width: 12.0,
            floor_height: 3.5,
            wall_thickness: 0.25,
            shear_wall_ratio: Some(0.25),
            ..BuildingParameters::default()
        })
        .unwrap()
    }

    #[test]
    fn test_seven_storey_stories() {
        let layout = compute_layout(&seven_storey(), &LayoutConfig::default()).unwrap();
        assert_eq!(layout.stories.len(), 7);
        let expected = [3.5, 7.0, 10.5, 14.0, 17.5, 21.0, 24.5];
        for (story, want) in layout.stories.iter().zip(expected) {
            assert!((story.elevation_m - want).abs() < 1e-9);
        }
        assert!(layout.stories.windows(2).all(|w| w[1].elevation_m > w[0].elevation_m));
        assert_eq!(layout.stories[0].base_m(), 0.0);
    }

    #[test]
    fn test_seven_storey_walls_within_tolerance() {
        let layout = compute_layout(&seven_storey(), &LayoutConfig::default()).unwrap();
        let walls = layout.walls.as_ref().unwrap();
        assert!((walls.achieved_ratio - 0.25).abs() <= walls.tolerance);
        assert!(layout.frame.is_none());
        assert_eq!(layout.x_grid.bay_count(), 5);
        assert_eq!(layout.y_grid.bay_count(), 2);
    }

    #[test]
    fn test_zero_ratio_is_layout_error() {
        let mut params = seven_storey();
        params.shear_wall_ratio = Some(0.0);
        let err = compute_layout(&params, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, GenError::Layout { .. }));
    }

    #[test]
    fn test_moment_frame_has_no_walls() {
        let mut params = seven_storey();
        params.structural_system = StructuralSystem::MomentFrame;
        params.shear_wall_ratio = None;
        let layout = compute_layout(&params, &LayoutConfig::default()).unwrap();
        assert!(layout.walls.is_none());
        assert_eq!(layout.walls_per_story(), 0);
        assert_eq!(layout.frame.unwrap().columns.len(), 18);
    }

    #[test]
    fn test_dual_has_both() {
        let mut params = seven_storey();
        params.structural_system = StructuralSystem::Dual;
        let layout = compute_layout(&params, &LayoutConfig::default()).unwrap();
        assert!(layout.walls.is_some());
        assert!(layout.frame.is_some());
    }
}
