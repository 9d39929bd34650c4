//! ASCII DXF (R12) drawing of the model, plus a small reader.
//!
//! | Entity | Primitive | Layer |
//! |--------|-----------|-------|
//! | grid line | `LINE` at z = 0, overhanging the plan by 1 m | `S-GRID` |
//! | wall | plan-footprint `3DFACE` at the story base | `S-WALL` |
//! | slab | `3DFACE` over the full plan at the story elevation | `S-SLAB` |
//! | column | vertical `LINE` from story base to elevation | `S-COLUMN` |
//! | beam | `LINE` at the story elevation | `S-BEAM` |
//!
//! Output is a pure function of the model and the precision: no handles,
//! timestamps or other run-dependent data are written.
//!
//! The reader only understands what the writer produces. It exists so the
//! wall coverage can be recovered from the drawing and compared with the
//! model.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::errors::{GenError, GenResult};
use crate::layout::Axis;
use crate::model::StructuralModel;

pub const LAYER_GRID: &str = "S-GRID";
pub const LAYER_WALL: &str = "S-WALL";
pub const LAYER_SLAB: &str = "S-SLAB";
pub const LAYER_COLUMN: &str = "S-COLUMN";
pub const LAYER_BEAM: &str = "S-BEAM";

/// Layers with their ACI colour numbers
const LAYERS: [(&str, i32); 5] = [
    (LAYER_GRID, 8),
    (LAYER_WALL, 1),
    (LAYER_SLAB, 3),
    (LAYER_COLUMN, 5),
    (LAYER_BEAM, 4),
];

/// Distance grid lines extend past the plan edge (m)
const GRID_OVERHANG_M: f64 = 1.0;

type Point3 = [f64; 3];

/// Group-code writer
struct DxfWriter {
    out: String,
    precision: usize,
}

impl DxfWriter {
    fn new(precision: usize) -> Self {
        DxfWriter {
            out: String::new(),
            precision,
        }
    }

    fn pair(&mut self, code: i32, value: &str) {
        let _ = writeln!(self.out, "{:>3}", code);
        let _ = writeln!(self.out, "{}", value);
    }

    fn int(&mut self, code: i32, value: i32) {
        self.pair(code, &value.to_string());
    }

    fn real(&mut self, code: i32, value: f64) {
        let text = format_real(value, self.precision);
        self.pair(code, &text);
    }

    /// Point under base code `base` (10, 11, 12, 13)
    fn point(&mut self, base: i32, p: Point3) {
        self.real(base, p[0]);
        self.real(base + 10, p[1]);
        self.real(base + 20, p[2]);
    }

    fn line(&mut self, layer: &str, a: Point3, b: Point3) {
        self.pair(0, "LINE");
        self.pair(8, layer);
        self.point(10, a);
        self.point(11, b);
    }

    fn face(&mut self, layer: &str, corners: [Point3; 4]) {
        self.pair(0, "3DFACE");
        self.pair(8, layer);
        for (i, c) in corners.iter().enumerate() {
            self.point(10 + i as i32, *c);
        }
    }
}

/// Fixed-precision real without a negative zero
fn format_real(value: f64, precision: usize) -> String {
    let text = format!("{:.*}", precision, value);
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// Render the model as an ASCII DXF drawing.
pub fn write_dxf(model: &StructuralModel, precision: usize) -> GenResult<String> {
    let index = model.grid_index();
    let p = &model.parameters;
    let top = model.stories.last().map_or(0.0, |s| s.elevation_m);
    let mut w = DxfWriter::new(precision);

    // HEADER
    w.pair(0, "SECTION");
    w.pair(2, "HEADER");
    w.pair(9, "$ACADVER");
    w.pair(1, "AC1009");
    w.pair(9, "$INSUNITS");
    w.int(70, 6); // metres
    w.pair(9, "$EXTMIN");
    w.point(10, [-GRID_OVERHANG_M, -GRID_OVERHANG_M, 0.0]);
    w.pair(9, "$EXTMAX");
    w.point(10, [p.length_m + GRID_OVERHANG_M, p.width_m + GRID_OVERHANG_M, top]);
    w.pair(0, "ENDSEC");

    // TABLES
    w.pair(0, "SECTION");
    w.pair(2, "TABLES");
    w.pair(0, "TABLE");
    w.pair(2, "LAYER");
    w.int(70, LAYERS.len() as i32);
    for (name, colour) in LAYERS {
        w.pair(0, "LAYER");
        w.pair(2, name);
        w.int(70, 0);
        w.int(62, colour);
        w.pair(6, "CONTINUOUS");
    }
    w.pair(0, "ENDTAB");
    w.pair(0, "ENDSEC");

    // ENTITIES
    w.pair(0, "SECTION");
    w.pair(2, "ENTITIES");

    for g in &model.grid_lines {
        let c = g.coordinate;
        let (a, b) = match g.axis {
            Axis::X => ([c, -GRID_OVERHANG_M, 0.0], [c, p.width_m + GRID_OVERHANG_M, 0.0]),
            Axis::Y => ([-GRID_OVERHANG_M, c, 0.0], [p.length_m + GRID_OVERHANG_M, c, 0.0]),
        };
        w.line(LAYER_GRID, a, b);
    }

    let unresolved = |entity: &str, reference: &str| GenError::assembly(entity, reference, "Unresolved reference in drawing");

    for wall in &model.walls {
        let story = model.story(&wall.story).ok_or_else(|| unresolved(&wall.id, &wall.story))?;
        let (x0, y0) = model.locate(&index, &wall.start).ok_or_else(|| unresolved(&wall.id, &wall.start.x))?;
        let (x1, y1) = model.locate(&index, &wall.end).ok_or_else(|| unresolved(&wall.id, &wall.end.x))?;
        let z = story.base_m();
        let half = wall.thickness_m / 2.0;
        let corners = match wall.direction {
            Axis::X => [[x0, y0 - half, z], [x1, y1 - half, z], [x1, y1 + half, z], [x0, y0 + half, z]],
            Axis::Y => [[x0 + half, y0, z], [x1 + half, y1, z], [x1 - half, y1, z], [x0 - half, y0, z]],
        };
        w.face(LAYER_WALL, corners);
    }

    for slab in &model.slabs {
        let story = model.story(&slab.story).ok_or_else(|| unresolved(&slab.id, &slab.story))?;
        let z = story.elevation_m;
        w.face(
            LAYER_SLAB,
            [[0.0, 0.0, z], [p.length_m, 0.0, z], [p.length_m, p.width_m, z], [0.0, p.width_m, z]],
        );
    }

    for column in &model.columns {
        let story = model.story(&column.story).ok_or_else(|| unresolved(&column.id, &column.story))?;
        let (x, y) = model.locate(&index, &column.at).ok_or_else(|| unresolved(&column.id, &column.at.x))?;
        w.line(LAYER_COLUMN, [x, y, story.base_m()], [x, y, story.elevation_m]);
    }

    for beam in &model.beams {
        let story = model.story(&beam.story).ok_or_else(|| unresolved(&beam.id, &beam.story))?;
        let (x0, y0) = model.locate(&index, &beam.start).ok_or_else(|| unresolved(&beam.id, &beam.start.x))?;
        let (x1, y1) = model.locate(&index, &beam.end).ok_or_else(|| unresolved(&beam.id, &beam.end.x))?;
        let z = story.elevation_m;
        w.line(LAYER_BEAM, [x0, y0, z], [x1, y1, z]);
    }

    w.pair(0, "ENDSEC");
    w.pair(0, "EOF");
    Ok(w.out)
}

// ============================================================================
// Reader
// ============================================================================

/// An entity read back from the ENTITIES section
#[derive(Debug, Clone, PartialEq)]
pub struct DxfEntity {
    pub kind: String,
    pub layer: String,
    /// Points in group-code order (10, 11, 12, 13)
    pub points: Vec<Point3>,
}

impl DxfEntity {
    /// Plan area of a face by the shoelace formula
    pub fn plan_area(&self) -> f64 {
        let n = self.points.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a[0] * b[1] - b[0] * a[1]
            })
            .sum();
        twice.abs() / 2.0
    }
}

fn malformed(reason: impl Into<String>) -> GenError {
    GenError::Serialization {
        reason: format!("Malformed DXF: {}", reason.into()),
    }
}

/// Parse the ENTITIES section into entities
pub fn read_entities(text: &str) -> GenResult<Vec<DxfEntity>> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() % 2 != 0 {
        return Err(malformed("odd number of lines"));
    }
    let mut pairs = Vec::with_capacity(lines.len() / 2);
    for chunk in lines.chunks(2) {
        let code: i32 = chunk[0]
            .trim()
            .parse()
            .map_err(|_| malformed(format!("bad group code '{}'", chunk[0].trim())))?;
        pairs.push((code, chunk[1].trim()));
    }

    let start = pairs
        .windows(2)
        .position(|w| w[0] == (0, "SECTION") && w[1] == (2, "ENTITIES"))
        .ok_or_else(|| malformed("no ENTITIES section"))?;

    let mut entities = Vec::new();
    let mut current: Option<DxfEntity> = None;
    let mut coords: BTreeMap<i32, f64> = BTreeMap::new();

    let finish = |entity: Option<DxfEntity>, coords: &mut BTreeMap<i32, f64>, out: &mut Vec<DxfEntity>| {
        if let Some(mut e) = entity {
            let mut base = 10;
            while let (Some(x), Some(y)) = (coords.get(&base), coords.get(&(base + 10))) {
                let z = coords.get(&(base + 20)).copied().unwrap_or(0.0);
                e.points.push([*x, *y, z]);
                base += 1;
            }
            out.push(e);
        }
        coords.clear();
    };

    for &(code, value) in &pairs[start + 2..] {
        match code {
            0 => {
                finish(current.take(), &mut coords, &mut entities);
                match value {
                    "ENDSEC" => return Ok(entities),
                    kind => {
                        current = Some(DxfEntity {
                            kind: kind.to_string(),
                            layer: String::new(),
                            points: Vec::new(),
                        })
                    }
                }
            }
            8 => {
                if let Some(e) = current.as_mut() {
                    e.layer = value.to_string();
                }
            }
            10..=39 => {
                let v: f64 = value
                    .parse()
                    .map_err(|_| malformed(format!("bad coordinate '{}'", value)))?;
                coords.insert(code, v);
            }
            _ => {}
        }
    }
    Err(malformed("unterminated ENTITIES section"))
}

/// All `3DFACE` entities
pub fn read_faces(text: &str) -> GenResult<Vec<DxfEntity>> {
    Ok(read_entities(text)?
        .into_iter()
        .filter(|e| e.kind == "3DFACE")
        .collect())
}

/// Wall coverage of one level, recovered from the drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelCoverage {
    pub elevation_m: f64,
    pub wall_area_m2: f64,
    pub ratio: f64,
}

/// Wall plan area per level (grouped by face elevation) over `reference_area_m2`
pub fn coverage_from_dxf(text: &str, reference_area_m2: f64) -> GenResult<Vec<LevelCoverage>> {
    let mut levels: BTreeMap<i64, (f64, f64)> = BTreeMap::new();
    for face in read_faces(text)?.iter().filter(|f| f.layer == LAYER_WALL) {
        let z = face.points.first().map_or(0.0, |p| p[2]);
        let key = (z * 1000.0).round() as i64;
        let entry = levels.entry(key).or_insert((z, 0.0));
        entry.1 += face.plan_area();
    }
    Ok(levels
        .into_values()
        .map(|(elevation_m, wall_area_m2)| LevelCoverage {
            elevation_m,
            wall_area_m2,
            ratio: wall_area_m2 / reference_area_m2,
        })
        .collect())
}
