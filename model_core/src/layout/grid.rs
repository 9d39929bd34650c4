//! Structural grid: bay counts, grid-line ordinates and bay edges.
//!
//! X grid lines sit at x-ordinates and are numbered `1, 2, 3, …`; Y grid
//! lines sit at y-ordinates and are lettered `A, B, …, Z, AA, AB, …`.

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;

/// Plan axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn code(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
        }
    }

    /// The other plan axis
    pub fn orthogonal(&self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Grid-line label for the `index`-th line (0-based) on `axis`
pub fn grid_label(axis: Axis, index: usize) -> String {
    match axis {
        Axis::X => (index + 1).to_string(),
        Axis::Y => {
            // bijective base-26: 0 -> A, 25 -> Z, 26 -> AA
            let mut n = index + 1;
            let mut label = Vec::new();
            while n > 0 {
                let rem = (n - 1) % 26;
                label.push(b'A' + rem as u8);
                n = (n - 1) / 26;
            }
            label.reverse();
            String::from_utf8(label).unwrap_or_default()
        }
    }
}

/// Number of bays along a plan dimension.
///
/// Rounds `length / preferred_span` and clamps it so spans stay inside
/// `[min_span, max_span]` whenever the length allows. Lengths shorter than
/// `min_span` get a single bay.
pub fn bay_count(length_m: f64, config: &LayoutConfig) -> usize {
    let n_min = ((length_m / config.max_span_m).ceil() as usize).max(1);
    let n_max = ((length_m / config.min_span_m).floor() as usize).max(n_min);
    let preferred = (length_m / config.preferred_span_m).round() as usize;
    preferred.clamp(n_min, n_max)
}

/// Grid ordinates along one axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisGrid {
    pub axis: Axis,
    /// Strictly increasing; first is 0, last is the plan dimension
    pub coordinates: Vec<f64>,
}

impl AxisGrid {
    /// Equal bays; the last ordinate is placed at exactly `length_m` so the
    /// final bay absorbs any floating-point remainder.
    pub fn uniform(axis: Axis, length_m: f64, bays: usize) -> Self {
        let bays = bays.max(1);
        let span = length_m / bays as f64;
        let coordinates = (0..=bays)
            .map(|i| if i == bays { length_m } else { i as f64 * span })
            .collect();
        AxisGrid { axis, coordinates }
    }

    pub fn for_length(axis: Axis, length_m: f64, config: &LayoutConfig) -> Self {
        Self::uniform(axis, length_m, bay_count(length_m, config))
    }

    pub fn line_count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn bay_count(&self) -> usize {
        self.coordinates.len().saturating_sub(1)
    }

    /// Span of bay `i`
    pub fn span(&self, bay: usize) -> f64 {
        self.coordinates[bay + 1] - self.coordinates[bay]
    }

    /// Nominal (equal) span of every bay
    pub fn nominal_span(&self) -> f64 {
        self.extent() / self.bay_count().max(1) as f64
    }

    pub fn extent(&self) -> f64 {
        self.coordinates.last().copied().unwrap_or(0.0)
    }

    pub fn label(&self, index: usize) -> String {
        grid_label(self.axis, index)
    }
}

/// One bay-long edge along a grid line: the unit walls and beams occupy.
///
/// `run` is the direction the member runs in. A member running along X lies
/// on Y line `line` and spans X bay `bay`; a member running along Y lies on
/// X line `line` and spans Y bay `bay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BayEdge {
    pub run: Axis,
    pub line: usize,
    pub bay: usize,
}

/// Grid intersection as (x line index, y line index)
pub type Node = (usize, usize);

impl BayEdge {
    /// Start and end grid intersections
    pub fn endpoints(&self) -> (Node, Node) {
        match self.run {
            Axis::X => ((self.bay, self.line), (self.bay + 1, self.line)),
            Axis::Y => ((self.line, self.bay), (self.line, self.bay + 1)),
        }
    }

    /// Edge length given the two grids
    pub fn length(&self, x: &AxisGrid, y: &AxisGrid) -> f64 {
        match self.run {
            Axis::X => x.span(self.bay),
            Axis::Y => y.span(self.bay),
        }
    }

    /// Every bay edge of the grid running along `run`, row-major (line, bay)
    pub fn all(run: Axis, x: &AxisGrid, y: &AxisGrid) -> Vec<BayEdge> {
        let (lines, bays) = match run {
            Axis::X => (y.line_count(), x.bay_count()),
            Axis::Y => (x.line_count(), y.bay_count()),
        };
        (0..lines)
            .flat_map(|line| (0..bays).map(move |bay| BayEdge { run, line, bay }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_labels() {
        assert_eq!(grid_label(Axis::X, 0), "1");
        assert_eq!(grid_label(Axis::X, 11), "12");
        assert_eq!(grid_label(Axis::Y, 0), "A");
        assert_eq!(grid_label(Axis::Y, 25), "Z");
        assert_eq!(grid_label(Axis::Y, 26), "AA");
        assert_eq!(grid_label(Axis::Y, 27), "AB");
        assert_eq!(grid_label(Axis::Y, 701), "ZZ");
        assert_eq!(grid_label(Axis::Y, 702), "AAA");
    }

    #[test]
    fn test_bay_count_targets_preferred_span() {
        let config = LayoutConfig::default();
        assert_eq!(bay_count(30.0, &config), 5);
        assert_eq!(bay_count(12.0, &config), 2);
        assert_eq!(bay_count(36.0, &config), 6);
    }

    #[test]
    fn test_bay_count_keeps_span_in_range() {
        let config = LayoutConfig::default();
        for tenth in 40..=1200 {
            let length = tenth as f64 / 10.0;
            let span = length / bay_count(length, &config) as f64;
            assert!(
                span >= config.min_span_m - 1e-9 && span <= config.max_span_m + 1e-9,
                "length {} gave span {}",
                length,
                span
            );
        }
    }

    #[test]
    fn test_short_length_gets_one_bay() {
        let config = LayoutConfig::default();
        assert_eq!(bay_count(2.5, &config), 1);
        assert_eq!(bay_count(0.5, &config), 1);
    }

    #[test]
    fn test_uniform_grid_ends_exactly() {
        let grid = AxisGrid::uniform(Axis::X, 10.0, 3);
        assert_eq!(grid.coordinates.len(), 4);
        assert_eq!(grid.coordinates[0], 0.0);
        assert_eq!(*grid.coordinates.last().unwrap(), 10.0);
        assert!(grid.coordinates.windows(2).all(|w| w[1] > w[0]));
        let total: f64 = (0..grid.bay_count()).map(|b| grid.span(b)).sum();
        assert!((total - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_bay_edge_endpoints() {
        let along_x = BayEdge { run: Axis::X, line: 2, bay: 1 };
        assert_eq!(along_x.endpoints(), ((1, 2), (2, 2)));
        let along_y = BayEdge { run: Axis::Y, line: 4, bay: 0 };
        assert_eq!(along_y.endpoints(), ((4, 0), (4, 1)));
    }

    #[test]
    fn test_all_edges_count() {
        let x = AxisGrid::uniform(Axis::X, 30.0, 5);
        let y = AxisGrid::uniform(Axis::Y, 12.0, 2);
        assert_eq!(BayEdge::all(Axis::X, &x, &y).len(), 3 * 5);
        assert_eq!(BayEdge::all(Axis::Y, &x, &y).len(), 6 * 2);
    }
}
