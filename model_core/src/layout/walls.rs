//! Symmetric shear-wall placement.
//!
//! Candidate positions are the bay edges of every grid line. They are grouped
//! into orbits under mirroring about both plan centre lines, so whatever
//! subset of orbits is chosen the layout stays doubly symmetric. Orbits of
//! size 1 (an edge that is its own image in both mirrors) are never used,
//! which keeps the wall count even.
//!
//! Within one direction every edge has the same length, so an orbit's
//! contribution depends only on its size. Selection therefore reduces to
//! choosing a wall count per direction; the concrete orbits are then taken
//! in preference order: perimeter lines first, bays nearest the facade centre
//! first.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::grid::{Axis, AxisGrid, BayEdge};
use crate::config::LayoutConfig;
use crate::errors::{GenError, GenResult};

/// Deviations closer than this are treated as ties
const RATIO_EPS: f64 = 1e-9;

/// A set of bay edges that map onto each other under the plan mirrors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orbit {
    pub run: Axis,
    /// Distance (in lines) from the nearest parallel facade; 0 is perimeter
    pub line_rank: usize,
    /// Distance (in bays) from the nearest corner; larger is nearer centre
    pub bay_rank: usize,
    pub members: Vec<BayEdge>,
}

impl Orbit {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// All usable orbits running along `run`, in preference order.
pub fn orbits(run: Axis, x: &AxisGrid, y: &AxisGrid) -> Vec<Orbit> {
    let (lines, bays) = match run {
        Axis::X => (y.line_count(), x.bay_count()),
        Axis::Y => (x.line_count(), y.bay_count()),
    };
    if lines == 0 || bays == 0 {
        return Vec::new();
    }

    let mut result = Vec::new();
    for line_rank in 0..=(lines - 1) / 2 {
        // centre bays first
        for bay_rank in (0..=(bays - 1) / 2).rev() {
            let members: BTreeSet<BayEdge> = [line_rank, lines - 1 - line_rank]
                .into_iter()
                .flat_map(|line| {
                    [bay_rank, bays - 1 - bay_rank]
                        .into_iter()
                        .map(move |bay| BayEdge { run, line, bay })
                })
                .collect();
            if members.len() > 1 {
                result.push(Orbit {
                    run,
                    line_rank,
                    bay_rank,
                    members: members.into_iter().collect(),
                });
            }
        }
    }
    result
}

/// Orbits of one direction, split by size
#[derive(Debug, Clone)]
struct DirectionPool {
    fours: Vec<Orbit>,
    twos: Vec<Orbit>,
    /// Coverage contributed by a single wall in this direction
    wall_ratio: f64,
}

impl DirectionPool {
    fn new(run: Axis, x: &AxisGrid, y: &AxisGrid, thickness_m: f64, reference_area_m2: f64) -> Self {
        let (fours, twos): (Vec<Orbit>, Vec<Orbit>) =
            orbits(run, x, y).into_iter().partition(|o| o.size() == 4);
        let span = match run {
            Axis::X => x.nominal_span(),
            Axis::Y => y.nominal_span(),
        };
        DirectionPool {
            fours,
            twos,
            wall_ratio: span * thickness_m / reference_area_m2,
        }
    }

    fn is_empty(&self) -> bool {
        self.fours.is_empty() && self.twos.is_empty()
    }

    fn max_walls(&self) -> usize {
        4 * self.fours.len() + 2 * self.twos.len()
    }

    /// (size-4 orbits, size-2 orbits) giving exactly `walls`, using as many
    /// size-4 orbits as possible
    fn split(&self, walls: usize) -> Option<(usize, usize)> {
        if walls % 2 != 0 {
            return None;
        }
        let fours = self.fours.len().min(walls / 4);
        let twos = (walls - 4 * fours) / 2;
        (twos <= self.twos.len()).then_some((fours, twos))
    }

    fn achievable(&self) -> Vec<usize> {
        (0..=self.max_walls())
            .step_by(2)
            .filter(|&w| self.split(w).is_some())
            .collect()
    }

    fn take(&self, walls: usize) -> Vec<BayEdge> {
        let Some((fours, twos)) = self.split(walls) else {
            return Vec::new();
        };
        self.fours[..fours]
            .iter()
            .chain(self.twos[..twos].iter())
            .flat_map(|o| o.members.iter().copied())
            .collect()
    }
}

/// Wall counts per direction under evaluation
#[derive(Debug, Clone, Copy)]
struct Choice {
    walls_x: usize,
    walls_y: usize,
    ratio: f64,
    deviation: f64,
}

impl Choice {
    fn total(&self) -> usize {
        self.walls_x + self.walls_y
    }

    fn imbalance(&self) -> usize {
        self.walls_x.abs_diff(self.walls_y)
    }

    /// Closer to target, then fewer walls, then more balanced, then more X
    fn better_than(&self, other: &Choice) -> bool {
        if (self.deviation - other.deviation).abs() > RATIO_EPS {
            return self.deviation < other.deviation;
        }
        (self.total(), self.imbalance(), std::cmp::Reverse(self.walls_x))
            < (other.total(), other.imbalance(), std::cmp::Reverse(other.walls_x))
    }
}

/// Result of wall placement for one (typical) story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallLayout {
    /// Selected edges, sorted by (direction, line, bay)
    pub edges: Vec<BayEdge>,
    pub target_ratio: f64,
    pub achieved_ratio: f64,
    /// Coverage of the largest single wall; the allowed deviation
    pub tolerance: f64,
    /// Area the ratio is measured against (m²)
    pub reference_area_m2: f64,
}

impl WallLayout {
    pub fn count(&self, run: Axis) -> usize {
        self.edges.iter().filter(|e| e.run == run).count()
    }

    /// Plan area of all walls in one story (m²)
    pub fn wall_area(&self) -> f64 {
        self.achieved_ratio * self.reference_area_m2
    }
}

/// Choose the symmetric wall layout whose coverage is closest to `target`.
///
/// The layout has at least `config.min_walls` walls and never exceeds the
/// target by more than one wall. Fails with `Layout` when no symmetric
/// layout can meet the target within one wall.
pub fn place_walls(
    x: &AxisGrid,
    y: &AxisGrid,
    thickness_m: f64,
    target: f64,
    reference_area_m2: f64,
    config: &LayoutConfig,
) -> GenResult<WallLayout> {
    let pool_x = DirectionPool::new(Axis::X, x, y, thickness_m, reference_area_m2);
    let pool_y = DirectionPool::new(Axis::Y, x, y, thickness_m, reference_area_m2);

    let tolerance = [&pool_x, &pool_y]
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.wall_ratio)
        .fold(0.0, f64::max);
    let ceiling = target + tolerance + RATIO_EPS;

    let counts_y = pool_y.achievable();
    let mut best: Option<Choice> = None;
    for walls_x in pool_x.achievable() {
        let ratio_x = walls_x as f64 * pool_x.wall_ratio;
        if ratio_x > ceiling {
            break;
        }
        for &walls_y in &counts_y {
            let ratio = ratio_x + walls_y as f64 * pool_y.wall_ratio;
            if ratio > ceiling {
                break;
            }
            if walls_x + walls_y < config.min_walls {
                continue;
            }
            let choice = Choice {
                walls_x,
                walls_y,
                ratio,
                deviation: (ratio - target).abs(),
            };
            if best.as_ref().map_or(true, |b| choice.better_than(b)) {
                best = Some(choice);
            }
        }
    }

    let Some(best) = best else {
        return Err(GenError::layout(
            "min_wall_count",
            format!(
                "Target ratio {:.4} cannot be met: {} symmetric walls already exceed it by more than one wall ({:.4})",
                target, config.min_walls, tolerance
            ),
        ));
    };

    if target - best.ratio > tolerance + RATIO_EPS {
        return Err(GenError::layout(
            "available_positions",
            format!(
                "Target ratio {:.4} cannot be reached: all {} symmetric wall positions give {:.4}",
                target,
                best.total(),
                best.ratio
            ),
        ));
    }

    let mut edges = pool_x.take(best.walls_x);
    edges.extend(pool_y.take(best.walls_y));
    edges.sort();

    let wall_area: f64 = edges.iter().map(|e| e.length(x, y) * thickness_m).sum();
    let achieved_ratio = wall_area / reference_area_m2;

    log::debug!(
        "Placed {} walls ({} along X, {} along Y): ratio {:.4} for target {:.4}",
        edges.len(),
        best.walls_x,
        best.walls_y,
        achieved_ratio,
        target
    );

    Ok(WallLayout {
        edges,
        target_ratio: target,
        achieved_ratio,
        tolerance,
        reference_area_m2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thirty_by_twelve_grids() -> (AxisGrid, AxisGrid) {
        (
            AxisGrid::uniform(Axis::X, 30.0, 5),
            AxisGrid::uniform(Axis::Y, 12.0, 2),
        )
    }

    fn is_symmetric(edges: &[BayEdge], x: &AxisGrid, y: &AxisGrid) -> bool {
        let set: BTreeSet<BayEdge> = edges.iter().copied().collect();
        set.iter().all(|e| {
            let (lines, bays) = match e.run {
                Axis::X => (y.line_count(), x.bay_count()),
                Axis::Y => (x.line_count(), y.bay_count()),
            };
            let mirror_line = BayEdge { line: lines - 1 - e.line, ..*e };
            let mirror_bay = BayEdge { bay: bays - 1 - e.bay, ..*e };
            set.contains(&mirror_line) && set.contains(&mirror_bay)
        })
    }

    #[test]
    fn test_orbits_exclude_self_mirrored_edge() {
        let (x, y) = thirty_by_twelve_grids();
        let xs = orbits(Axis::X, &x, &y);
        // Y lines 0,1,2 (centre line 1), X bays 0..5 (centre bay 2)
        assert!(xs.iter().all(|o| o.size() >= 2));
        assert!(!xs.iter().any(|o| o.line_rank == 1 && o.bay_rank == 2));
        let covered: usize = xs.iter().map(|o| o.size()).sum();
        assert_eq!(covered, 3 * 5 - 1);
    }

    #[test]
    fn test_orbit_order_prefers_perimeter_centre() {
        let (x, y) = thirty_by_twelve_grids();
        let xs = orbits(Axis::X, &x, &y);
        assert_eq!((xs[0].line_rank, xs[0].bay_rank), (0, 2));
        assert_eq!(xs[0].size(), 2);
        assert_eq!((xs[1].line_rank, xs[1].bay_rank), (0, 1));
        assert_eq!(xs[1].size(), 4);
    }

    #[test]
    fn test_seven_storey_layout() {
        let (x, y) = thirty_by_twelve_grids();
        let reference = 2.0 * (30.0 + 12.0) * 0.25;
        let layout = place_walls(&x, &y, 0.25, 0.25, reference, &LayoutConfig::default()).unwrap();

        assert_eq!(layout.edges.len(), 4);
        assert!((layout.achieved_ratio - 4.0 * 6.0 * 0.25 / 21.0).abs() < 1e-9);
        assert!((layout.achieved_ratio - 0.25).abs() <= layout.tolerance);
        assert!(is_symmetric(&layout.edges, &x, &y));
    }

    #[test]
    fn test_zero_ratio_is_infeasible() {
        let (x, y) = thirty_by_twelve_grids();
        match place_walls(&x, &y, 0.25, 0.0, 21.0, &LayoutConfig::default()) {
            Err(GenError::Layout { constraint, .. }) => assert_eq!(constraint, "min_wall_count"),
            other => panic!("expected layout error, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_ratio_reports_positions() {
        // A single bay each way gives at most 4 walls (ratio 0.1 here)
        let x = AxisGrid::uniform(Axis::X, 5.0, 1);
        let y = AxisGrid::uniform(Axis::Y, 5.0, 1);
        let err = place_walls(&x, &y, 0.2, 1.0, 40.0, &LayoutConfig::default());
        match err {
            Err(GenError::Layout { constraint, .. }) => assert_eq!(constraint, "available_positions"),
            other => panic!("expected layout error, got {:?}", other),
        }
    }

    #[test]
    fn test_full_perimeter_coverage() {
        let x = AxisGrid::uniform(Axis::X, 24.0, 4);
        let y = AxisGrid::uniform(Axis::Y, 18.0, 3);
        let reference = 2.0 * (24.0 + 18.0) * 0.3;
        let layout = place_walls(&x, &y, 0.3, 1.0, reference, &LayoutConfig::default()).unwrap();
        assert!((layout.achieved_ratio - 1.0).abs() <= layout.tolerance);
        assert!(is_symmetric(&layout.edges, &x, &y));
    }

    #[test]
    fn test_ratio_within_one_wall_across_targets() {
        let config = LayoutConfig::default();
        let x = AxisGrid::uniform(Axis::X, 42.0, 7);
        let y = AxisGrid::uniform(Axis::Y, 18.0, 3);
        let reference = 2.0 * (42.0 + 18.0) * 0.3;
        for pct in 20..=100 {
            let target = pct as f64 / 100.0;
            let layout = place_walls(&x, &y, 0.3, target, reference, &config).unwrap();
            assert!(layout.edges.len() >= config.min_walls);
            assert_eq!(layout.edges.len() % 2, 0);
            assert!(
                (layout.achieved_ratio - target).abs() <= layout.tolerance + 1e-9,
                "target {} achieved {}",
                target,
                layout.achieved_ratio
            );
            assert!(is_symmetric(&layout.edges, &x, &y));
        }
    }

    #[test]
    fn test_placement_is_deterministic() {
        let (x, y) = thirty_by_twelve_grids();
        let a = place_walls(&x, &y, 0.25, 0.5, 21.0, &LayoutConfig::default()).unwrap();
        let b = place_walls(&x, &y, 0.25, 0.5, 21.0, &LayoutConfig::default()).unwrap();
        assert_eq!(a, b);
    }
}
