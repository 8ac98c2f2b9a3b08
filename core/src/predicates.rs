//! Built-in point-in-shape predicates.
//!
//! The harness only sees these through [`PredicateFn`]; they exist so that
//! every family has several competing implementations out of the box.
//! A predicate handed a shape of another family answers `Outside`.

use rgeometry::data::{Point, PointLocation};

use crate::shape::{Classification, Shape};

pub type PredicateFn = fn(&Shape, &Point<f64>) -> Classification;

fn cross(o: &Point<f64>, a: &Point<f64>, b: &Point<f64>) -> f64 {
    let [ox, oy] = o.array;
    let [ax, ay] = a.array;
    let [bx, by] = b.array;
    (ax - ox) * (by - oy) - (ay - oy) * (bx - ox)
}

/// Axis-aligned bounds check; ignores the rectangle's rotation.
pub fn rect_aabb(shape: &Shape, p: &Point<f64>) -> Classification {
    let Shape::Rect(r) = shape else {
        return Classification::Outside;
    };
    let dx = (p.array[0] - r.pos[0]).abs();
    let dy = (p.array[1] - r.pos[1]).abs();
    Classification::from_bool(dx <= r.extent[0] && dy <= r.extent[1])
}

/// Projects into the rectangle's own frame before comparing.
pub fn rect_local_frame(shape: &Shape, p: &Point<f64>) -> Classification {
    let Shape::Rect(r) = shape else {
        return Classification::Outside;
    };
    let [x, y] = r.to_local(p);
    let (x, y) = (x.abs(), y.abs());
    let [ex, ey] = r.extent;
    if x < ex && y < ey {
        Classification::Inside
    } else if x <= ex && y <= ey {
        Classification::Boundary
    } else {
        Classification::Outside
    }
}

/// Side test against each of the four ccw edges.
pub fn rect_edge_sign(shape: &Shape, p: &Point<f64>) -> Classification {
    let Shape::Rect(r) = shape else {
        return Classification::Outside;
    };
    let c = r.corners();
    let mut on_edge = false;
    for i in 0..4 {
        let s = cross(&c[i], &c[(i + 1) % 4], p);
        if s < 0.0 {
            return Classification::Outside;
        }
        if s == 0.0 {
            on_edge = true;
        }
    }
    if on_edge {
        Classification::Boundary
    } else {
        Classification::Inside
    }
}

fn circle_delta(shape: &Shape, p: &Point<f64>) -> Option<(f64, f64, f64)> {
    match shape {
        Shape::Circle(c) => Some((p.array[0] - c.center[0], p.array[1] - c.center[1], c.radius)),
        _ => None,
    }
}

pub fn circle_distance_squared(shape: &Shape, p: &Point<f64>) -> Classification {
    let Some((dx, dy, r)) = circle_delta(shape, p) else {
        return Classification::Outside;
    };
    let d2 = dx * dx + dy * dy;
    let r2 = r * r;
    if d2 < r2 {
        Classification::Inside
    } else if d2 == r2 {
        Classification::Boundary
    } else {
        Classification::Outside
    }
}

pub fn circle_hypot(shape: &Shape, p: &Point<f64>) -> Classification {
    let Some((dx, dy, r)) = circle_delta(shape, p) else {
        return Classification::Outside;
    };
    let d = dx.hypot(dy);
    if d < r {
        Classification::Inside
    } else if d == r {
        Classification::Boundary
    } else {
        Classification::Outside
    }
}

/// Rejects on the bounding square before computing a distance.
pub fn circle_bounding_box_first(shape: &Shape, p: &Point<f64>) -> Classification {
    let Some((dx, dy, r)) = circle_delta(shape, p) else {
        return Classification::Outside;
    };
    if dx.abs() > r || dy.abs() > r {
        return Classification::Outside;
    }
    Classification::from_bool(dx * dx + dy * dy <= r * r)
}

/// Even-odd rule: count crossings of a horizontal ray to +x.
pub fn polygon_ray_crossing(shape: &Shape, p: &Point<f64>) -> Classification {
    let Shape::Polygon(poly) = shape else {
        return Classification::Outside;
    };
    let [px, py] = p.array;
    let mut inside = false;
    for (a, b) in poly.edges() {
        let [ax, ay] = a.array;
        let [bx, by] = b.array;
        if (ay > py) != (by > py) {
            let x = ax + (py - ay) * (bx - ax) / (by - ay);
            if px < x {
                inside = !inside;
            }
        }
    }
    Classification::from_bool(inside)
}

/// Nonzero winding rule.
pub fn polygon_winding_number(shape: &Shape, p: &Point<f64>) -> Classification {
    let Shape::Polygon(poly) = shape else {
        return Classification::Outside;
    };
    let py = p.array[1];
    let mut wn = 0i32;
    for (a, b) in poly.edges() {
        if a.array[1] <= py {
            if b.array[1] > py && cross(a, b, p) > 0.0 {
                wn += 1;
            }
        } else if b.array[1] <= py && cross(a, b, p) < 0.0 {
            wn -= 1;
        }
    }
    Classification::from_bool(wn != 0)
}

/// Delegates to rgeometry's exact point location.
pub fn polygon_rgeometry_locate(shape: &Shape, p: &Point<f64>) -> Classification {
    let Shape::Polygon(poly) = shape else {
        return Classification::Outside;
    };
    match poly.polygon().locate(p) {
        PointLocation::Inside => Classification::Inside,
        PointLocation::OnBoundary => Classification::Boundary,
        PointLocation::Outside => Classification::Outside,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Circle, PolygonShape, Rect};
    use Classification::*;

    fn pt(x: f64, y: f64) -> Point<f64> {
        Point::new([x, y])
    }

    #[test]
    fn rect_predicates() {
        let s = Shape::Rect(Rect::new(2.0, 1.0).pos(1.0, 1.0));
        for f in [rect_aabb, rect_local_frame, rect_edge_sign] {
            assert_eq!(f(&s, &pt(1.5, 1.5)), Inside);
            assert_eq!(f(&s, &pt(4.0, 1.0)), Outside);
        }
        assert_eq!(rect_local_frame(&s, &pt(3.0, 1.0)), Boundary);
        assert_eq!(rect_edge_sign(&s, &pt(3.0, 1.0)), Boundary);
        assert_eq!(rect_aabb(&s, &pt(3.0, 1.0)), Inside);
    }

    #[test]
    fn rect_aabb_ignores_rotation() {
        let s = Shape::Rect(Rect::new(4.0, 0.5).rot(std::f64::consts::FRAC_PI_2));
        // rotated a quarter turn: long axis now runs along y
        assert_eq!(rect_local_frame(&s, &pt(0.0, 3.0)), Inside);
        assert_eq!(rect_aabb(&s, &pt(0.0, 3.0)), Outside);
    }

    #[test]
    fn circle_predicates() {
        let s = Shape::Circle(Circle::new(5.0).pos(1.0, 0.0));
        for f in [circle_distance_squared, circle_hypot, circle_bounding_box_first] {
            assert_eq!(f(&s, &pt(1.0, 0.0)), Inside);
            assert_eq!(f(&s, &pt(6.5, 0.0)), Outside);
            assert_eq!(f(&s, &pt(5.5, 4.5)), Outside);
        }
        assert_eq!(circle_distance_squared(&s, &pt(4.0, 4.0)), Boundary);
        assert_eq!(circle_bounding_box_first(&s, &pt(4.0, 4.0)), Inside);
    }

    #[test]
    fn polygon_predicates_concave() {
        // L shape, notch at the top right
        let l = PolygonShape::new(vec![
            pt(0.0, 0.0),
            pt(4.0, 0.0),
            pt(4.0, 2.0),
            pt(2.0, 2.0),
            pt(2.0, 4.0),
            pt(0.0, 4.0),
        ])
        .unwrap();
        let s = Shape::Polygon(l);
        for f in [polygon_ray_crossing, polygon_winding_number, polygon_rgeometry_locate] {
            assert_eq!(f(&s, &pt(1.0, 1.0)), Inside);
            assert_eq!(f(&s, &pt(1.0, 3.0)), Inside);
            assert_eq!(f(&s, &pt(3.0, 3.0)), Outside);
            assert_eq!(f(&s, &pt(-1.0, 1.0)), Outside);
        }
    }

    #[test]
    fn wrong_family_is_outside() {
        let s = Shape::Circle(Circle::new(5.0));
        assert_eq!(rect_edge_sign(&s, &pt(0.0, 0.0)), Outside);
        assert_eq!(polygon_ray_crossing(&s, &pt(0.0, 0.0)), Outside);
    }
}
