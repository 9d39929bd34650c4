//! Moment-frame placement: a column at every grid intersection and a beam on
//! every bay edge.

use serde::{Deserialize, Serialize};

use super::grid::{Axis, AxisGrid, BayEdge, Node};

/// Column and beam positions for one (typical) story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameLayout {
    /// Grid intersections, row-major (y line, then x line)
    pub columns: Vec<Node>,
    /// Bay edges along X first, then along Y
    pub beams: Vec<BayEdge>,
}

impl FrameLayout {
    pub fn for_grid(x: &AxisGrid, y: &AxisGrid) -> Self {
        let columns = (0..y.line_count())
            .flat_map(|j| (0..x.line_count()).map(move |i| (i, j)))
            .collect();
        let mut beams = BayEdge::all(Axis::X, x, y);
        beams.extend(BayEdge::all(Axis::Y, x, y));
        FrameLayout { columns, beams }
    }
}
