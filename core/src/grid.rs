use rgeometry::data::Point;
use serde::{Deserialize, Serialize};

/// Largest grid a configuration may request.
pub const MAX_GRID_POINTS: usize = 1 << 24;

/// Rectangular sampling domain and step sizes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub step_x: f64,
    pub step_y: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            min_x: -30.0,
            min_y: -30.0,
            max_x: 30.0,
            max_y: 30.0,
            step_x: 1.0,
            step_y: 1.0,
        }
    }
}

impl GridSpec {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64, step_x: f64, step_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            step_x,
            step_y,
        }
    }

    /// Number of columns (x steps).
    pub fn width(&self) -> usize {
        axis_len(self.min_x, self.max_x, self.step_x)
    }

    /// Number of rows (y steps).
    pub fn height(&self) -> usize {
        axis_len(self.min_y, self.max_y, self.step_y)
    }

    /// Number of points, or `None` when it does not fit in `usize`.
    pub fn count(&self) -> Option<usize> {
        self.width().checked_mul(self.height())
    }

    pub fn points(&self) -> Vec<Point<f64>> {
        generate_grid(
            self.min_x,
            self.min_y,
            self.max_x,
            self.max_y,
            self.step_x,
            self.step_y,
        )
    }
}

// A zero step falls back to the raw extent as the axis length.
fn axis_len(min: f64, max: f64, step: f64) -> usize {
    let extent = max - min;
    let len = if step == 0.0 { extent } else { extent / step };
    if len.is_finite() && len > 0.0 {
        len.floor() as usize
    } else {
        0
    }
}

/// Column-major scan of the domain: for each x step, every y step.
///
/// Output is a pure function of the arguments, so every candidate sees the
/// same points in the same order. Callers taking bounds from configuration
/// check [`GridSpec::count`] against [`MAX_GRID_POINTS`] first.
pub fn generate_grid(
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    step_x: f64,
    step_y: f64,
) -> Vec<Point<f64>> {
    let width = axis_len(min_x, max_x, step_x);
    let height = axis_len(min_y, max_y, step_y);

    let capacity = width.checked_mul(height).map_or(0, |n| n.min(MAX_GRID_POINTS));
    let mut v = Vec::with_capacity(capacity);
    for x in 0..width {
        for y in 0..height {
            v.push(Point::new([
                min_x + x as f64 * step_x,
                min_y + y as f64 * step_y,
            ]));
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn grid_count_and_layout() {
        let v = generate_grid(0.0, 0.0, 3.0, 2.0, 1.0, 1.0);
        assert_eq!(v.len(), 6);
        assert_eq!(v[0], Point::new([0.0, 0.0]));
        assert_eq!(v[1], Point::new([0.0, 1.0]));
        assert_eq!(v[2], Point::new([1.0, 0.0]));
        assert_eq!(v[5], Point::new([2.0, 1.0]));
    }

    #[test]
    fn grid_partial_step_floors() {
        // 10 / 3 = 3.33 columns, 5 / 2 = 2.5 rows
        let v = generate_grid(0.0, 0.0, 10.0, 5.0, 3.0, 2.0);
        assert_eq!(v.len(), 3 * 2);
    }

    #[test]
    fn grid_zero_step_uses_extent() {
        let v = generate_grid(-2.0, 0.0, 2.0, 3.0, 0.0, 1.0);
        assert_eq!(v.len(), 4 * 3);
        assert!(v.iter().all(|p| p.array[0] == -2.0));

        let g = GridSpec::new(0.0, 0.0, 5.0, 7.5, 1.0, 0.0);
        assert_eq!(g.height(), 7);
        assert_eq!(g.points().len(), 5 * 7);
    }

    #[test]
    fn huge_grid_count_does_not_overflow() {
        let g = GridSpec::new(0.0, 0.0, 1e30, 1e30, 1.0, 1.0);
        assert_eq!(g.count(), None);
        assert_eq!(GridSpec::default().count(), Some(60 * 60));
    }

    #[test]
    fn grid_inverted_domain_is_empty() {
        assert!(generate_grid(5.0, 0.0, 0.0, 5.0, 1.0, 1.0).is_empty());
        assert!(generate_grid(0.0, 0.0, 5.0, 5.0, -1.0, 1.0).is_empty());
    }

    proptest! {
        #[test]
        fn grid_count_matches_formula(
            min_x in -50.0f64..50.0,
            min_y in -50.0f64..50.0,
            w in 0.0f64..40.0,
            h in 0.0f64..40.0,
            step_x in 0.25f64..5.0,
            step_y in 0.25f64..5.0,
        ) {
            let (max_x, max_y) = (min_x + w, min_y + h);
            let v = generate_grid(min_x, min_y, max_x, max_y, step_x, step_y);
            let expected = ((max_x - min_x) / step_x).floor() as usize
                * ((max_y - min_y) / step_y).floor() as usize;
            prop_assert_eq!(v.len(), expected);

            let again = generate_grid(min_x, min_y, max_x, max_y, step_x, step_y);
            prop_assert_eq!(v, again);
        }
    }
}
