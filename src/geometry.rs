//! Planar geometry on pixel coordinates: polygon metrics, hit-testing and
//! snapping helpers used while digitizing a plan.

use serde::{Deserialize, Serialize};

/// Tolerance for picking a wall or beam segment with the cursor.
pub const HIT_TOLERANCE_PX: f64 = 5.0;

/// A click this close to the first vertex closes the polygon being drawn.
pub const SNAP_TOLERANCE_PX: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Area (px²) and perimeter (px) of a closed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolygonMetrics {
    pub area: f64,
    pub perimeter: f64,
}

/// Closed ring of at least three vertices; the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Polygon(Vec<Point>);

impl Polygon {
    /// Returns `None` for fewer than three points.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Option<Self> {
        (points.len() >= 3).then_some(Self(points))
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    #[must_use]
    pub fn metrics(&self) -> PolygonMetrics {
        shoelace(&self.0)
    }

    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(point, &self.0)
    }
}

impl TryFrom<Vec<Point>> for Polygon {
    type Error = String;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        let count = points.len();
        Self::new(points).ok_or_else(|| format!("polygon needs at least 3 points, got {count}"))
    }
}

impl From<Polygon> for Vec<Point> {
    fn from(polygon: Polygon) -> Self {
        polygon.0
    }
}

/// Shoelace area and edge-sum perimeter, wrapping last to first.
///
/// Returns `None` for fewer than three points. The result does not depend on
/// the starting vertex or the traversal direction.
#[must_use]
pub fn polygon_area_perimeter(points: &[Point]) -> Option<PolygonMetrics> {
    (points.len() >= 3).then(|| shoelace(points))
}

fn shoelace(points: &[Point]) -> PolygonMetrics {
    let n = points.len();
    let (twice_area, perimeter) = (0..n).fold((0.0, 0.0), |(area, perimeter), i| {
        let a = points[i];
        let b = points[(i + 1) % n];
        (
            area + (a.x * b.y - b.x * a.y),
            perimeter + a.distance_to(&b),
        )
    });

    PolygonMetrics {
        area: twice_area.abs() / 2.0,
        perimeter,
    }
}

/// Crossing-number test. Points exactly on an edge may land either way.
#[must_use]
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    let mut inside = false;
    let mut j = vertices.len().wrapping_sub(1);

    for (i, vi) in vertices.iter().enumerate() {
        let vj = vertices[j];
        if (vi.y > point.y) != (vj.y > point.y)
            && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Distance from `p` to the segment `v`-`w`, clamping the projection to the segment.
#[must_use]
pub fn distance_to_segment(p: Point, v: Point, w: Point) -> f64 {
    let l2 = (v.x - w.x).powi(2) + (v.y - w.y).powi(2);
    if l2 == 0.0 {
        return p.distance_to(&v);
    }

    let t = (((p.x - v.x) * (w.x - v.x) + (p.y - v.y) * (w.y - v.y)) / l2).clamp(0.0, 1.0);
    p.distance_to(&Point::new(v.x + t * (w.x - v.x), v.y + t * (w.y - v.y)))
}

/// True when `p` picks the segment `v`-`w` within [`HIT_TOLERANCE_PX`].
#[must_use]
pub fn hits_segment(p: Point, v: Point, w: Point) -> bool {
    distance_to_segment(p, v, w) < HIT_TOLERANCE_PX
}

/// True when a click at `p` should close the polygon being drawn.
#[must_use]
pub fn closes_polygon(drawing: &[Point], p: Point) -> bool {
    match drawing.first() {
        Some(first) if drawing.len() >= 3 => p.distance_to(first) < SNAP_TOLERANCE_PX,
        _ => false,
    }
}
