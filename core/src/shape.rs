use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rgeometry::data::{Point, Polygon, Vector};
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Membership verdict of one predicate for one point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Inside,
    Boundary,
    Outside,
}

impl Classification {
    pub fn from_bool(inside: bool) -> Self {
        if inside {
            Self::Inside
        } else {
            Self::Outside
        }
    }

    pub fn is_inside(self) -> bool {
        self == Self::Inside
    }

    /// Folds `Boundary` into `Inside` for boolean-valued families.
    pub fn collapse(self) -> Self {
        match self {
            Self::Boundary => Self::Inside,
            c => c,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inside => write!(f, "inside"),
            Self::Boundary => write!(f, "boundary"),
            Self::Outside => write!(f, "outside"),
        }
    }
}

/// How two classifications are compared by the consistency check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Membership {
    /// Tri-state labels must match.
    #[default]
    Exact,
    /// `Boundary` counts as `Inside`.
    Collapsed,
}

impl Membership {
    pub fn same(self, a: Classification, b: Classification) -> bool {
        match self {
            Self::Exact => a == b,
            Self::Collapsed => a.collapse() == b.collapse(),
        }
    }
}

pub fn rotate(v: Vector<f64, 2>, rot: f64) -> Vector<f64, 2> {
    let (s, c) = rot.sin_cos();
    Vector([c * v.0[0] - s * v.0[1], s * v.0[0] + c * v.0[1]])
}

/// Rectangle given by center, half extents and rotation (radians).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub pos: [f64; 2],
    pub extent: [f64; 2],
    pub rot: f64,
}

impl Rect {
    pub fn new(extent_x: f64, extent_y: f64) -> Self {
        Self {
            pos: [0f64; 2],
            extent: [extent_x, extent_y],
            rot: 0f64,
        }
    }

    pub fn pos(self, x: f64, y: f64) -> Self {
        Self {
            pos: [x, y],
            ..self
        }
    }

    pub fn rot(self, rot: f64) -> Self {
        Self { rot, ..self }
    }

    /// Corners in counter-clockwise order.
    pub fn corners(&self) -> [Point<f64>; 4] {
        let center = Point::new(self.pos);
        let [ex, ey] = self.extent;
        [
            center + rotate(Vector([-ex, -ey]), self.rot),
            center + rotate(Vector([ex, -ey]), self.rot),
            center + rotate(Vector([ex, ey]), self.rot),
            center + rotate(Vector([-ex, ey]), self.rot),
        ]
    }

    /// Maps `p` into the rectangle's unrotated frame, relative to its center.
    pub fn to_local(&self, p: &Point<f64>) -> [f64; 2] {
        let d = Vector([p.array[0] - self.pos[0], p.array[1] - self.pos[1]]);
        rotate(d, -self.rot).0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: [f64; 2],
    pub radius: f64,
}

impl Circle {
    pub fn new(radius: f64) -> Self {
        Self {
            center: [0f64; 2],
            radius,
        }
    }

    pub fn pos(self, x: f64, y: f64) -> Self {
        Self {
            center: [x, y],
            ..self
        }
    }

    pub fn outline(&self, segments: usize) -> Vec<Point<f64>> {
        let mut v = Vec::with_capacity(segments);
        for i in 0..segments {
            let theta = std::f64::consts::PI * 2.0 * i as f64 / segments as f64;
            v.push(Point::new([
                self.center[0] + self.radius * theta.cos(),
                self.center[1] + self.radius * theta.sin(),
            ]));
        }
        v
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("invalid polygon: {0}")]
    Invalid(String),
}

/// Simple polygon, stored both as a raw ring and as an rgeometry polygon.
#[derive(Clone, Debug)]
pub struct PolygonShape {
    vertices: Vec<Point<f64>>,
    poly: Polygon<f64>,
}

impl PolygonShape {
    /// Builds a polygon from a ring of vertices in either winding order.
    pub fn new(mut vertices: Vec<Point<f64>>) -> Result<Self, ShapeError> {
        if vertices.len() < 3 {
            return Err(ShapeError::TooFewVertices(vertices.len()));
        }
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }
        let poly = Polygon::new(vertices.clone()).map_err(|e| ShapeError::Invalid(format!("{e:?}")))?;
        Ok(Self { vertices, poly })
    }

    /// Star centered on the origin, alternating `outer` and `inner` radii.
    pub fn star(arms: usize, outer: f64, inner: f64) -> Result<Self, ShapeError> {
        let n = arms * 2;
        let mut v = Vec::with_capacity(n);
        for i in 0..n {
            let r = if i % 2 == 0 { outer } else { inner };
            let theta = std::f64::consts::PI * 2.0 * i as f64 / n as f64;
            v.push(Point::new([r * theta.cos(), r * theta.sin()]));
        }
        Self::new(v)
    }

    /// Vertices in counter-clockwise order.
    pub fn vertices(&self) -> &[Point<f64>] {
        &self.vertices
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.poly
    }

    /// Closed edges `(vertices[i], vertices[i + 1])`, wrapping at the end.
    pub fn edges(&self) -> impl Iterator<Item = (&Point<f64>, &Point<f64>)> {
        let n = self.vertices.len();
        (0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }
}

fn signed_area(v: &[Point<f64>]) -> f64 {
    let n = v.len();
    let mut sum = 0.0;
    for i in 0..n {
        let [x0, y0] = v[i].array;
        let [x1, y1] = v[(i + 1) % n].array;
        sum += x0 * y1 - x1 * y0;
    }
    sum / 2.0
}

/// Subject shape of a predicate family.
#[derive(Clone, Debug)]
pub enum Shape {
    Rect(Rect),
    Circle(Circle),
    Polygon(PolygonShape),
}

impl Shape {
    /// Closed outline for drawing.
    pub fn outline(&self) -> Vec<Point<f64>> {
        match self {
            Shape::Rect(r) => r.corners().to_vec(),
            Shape::Circle(c) => c.outline(64),
            Shape::Polygon(p) => p.vertices().to_vec(),
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Shape::Rect(_) => Family::Rectangle,
            Shape::Circle(_) => Family::Circle,
            Shape::Polygon(_) => Family::Polygon,
        }
    }
}

/// Group of candidates answering the same membership question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Rectangle,
    Circle,
    Polygon,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Rectangle, Family::Circle, Family::Polygon];

    pub fn name(&self) -> &'static str {
        match self {
            Family::Rectangle => "rectangle",
            Family::Circle => "circle",
            Family::Polygon => "polygon",
        }
    }

    /// Subject used when none is supplied, sized for the default grid.
    pub fn default_shape(&self) -> Shape {
        match self {
            Family::Rectangle => Shape::Rect(Rect::new(20.0, 10.0).rot(0.3)),
            Family::Circle => Shape::Circle(Circle::new(20.0)),
            Family::Polygon => match PolygonShape::star(5, 24.0, 10.0) {
                Ok(p) => Shape::Polygon(p),
                // a star with these radii is always simple
                Err(_) => Shape::Rect(Rect::new(20.0, 10.0)),
            },
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rectangle" | "rect" => Ok(Family::Rectangle),
            "circle" => Ok(Family::Circle),
            "polygon" | "poly" => Ok(Family::Polygon),
            other => Err(HarnessError::UnknownFamily(other.to_string())),
        }
    }
}

/// Random subject of `family` that fits inside `[-view, view]^2`.
pub fn gen_shape<R: Rng>(rng: &mut R, family: Family, view: f64) -> Shape {
    match family {
        Family::Rectangle => {
            let w = rng.gen_range(view * 0.2..view * 0.6);
            let h = rng.gen_range(view * 0.1..view * 0.4);
            let inner = (view - (w + h)).max(1.0);
            let x = rng.gen_range(-inner..inner);
            let y = rng.gen_range(-inner..inner);
            Shape::Rect(
                Rect::new(w, h)
                    .pos(x, y)
                    .rot(rng.gen_range(0.0..std::f64::consts::PI)),
            )
        }
        Family::Circle => {
            let r = rng.gen_range(view * 0.2..view * 0.7);
            let inner = (view - r).max(1.0);
            Shape::Circle(Circle::new(r).pos(rng.gen_range(-inner..inner), rng.gen_range(-inner..inner)))
        }
        Family::Polygon => {
            let arms = rng.gen_range(3..9);
            let outer = rng.gen_range(view * 0.5..view * 0.9);
            let inner = rng.gen_range(view * 0.1..outer * 0.8);
            match PolygonShape::star(arms, outer, inner) {
                Ok(p) => Shape::Polygon(p),
                Err(_) => family.default_shape(),
            }
        }
    }
}
