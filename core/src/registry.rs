//! Explicit registration table of candidate implementations.
//!
//! Each predicate family maps to an ordered list of `(name, fn)` entries.
//! Discovery hands out entries in registration order and never invokes them;
//! invocation belongs to the trial runner and the consistency check.

use std::any::Any;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rgeometry::data::Point;

use crate::error::CandidateError;
use crate::runner::{timed_loop, Timed};
use crate::predicates::{self, PredicateFn};
use crate::shape::{Classification, Family, Shape};

/// Opaque value returned by a candidate call.
pub type Output = Box<dyn Any>;

type TimedFn = Box<dyn Fn(u64) -> Result<Timed, CandidateError>>;

/// A named zero-argument unit of work.
///
/// The trial loop is monomorphized over the callable's return type, so
/// values stay unboxed while the clock runs; only the last one is boxed.
pub struct Candidate {
    name: String,
    f: TimedFn,
}

impl Candidate {
    pub fn new<F, R>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: Any,
    {
        Self {
            name: name.into(),
            f: Box::new(move |trials| timed_loop(trials, || Ok(f()))),
        }
    }

    pub fn fallible<F, R, E>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Result<R, E> + 'static,
        R: Any,
        E: fmt::Display,
    {
        Self {
            name: name.into(),
            f: Box::new(move |trials| {
                timed_loop(trials, || f().map_err(|e| CandidateError::new(e.to_string())))
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the callable `trials` times, timing only the loop itself.
    pub fn time(&self, trials: u64) -> Result<Timed, CandidateError> {
        (self.f)(trials)
    }

    /// One call, discarding its timing.
    pub fn call(&self) -> Result<Output, CandidateError> {
        let timed = self.time(1)?;
        Ok(timed.last.unwrap_or_else(|| Box::new(())))
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate").field("name", &self.name).finish()
    }
}

/// A named `(shape, point) -> classification` predicate.
#[derive(Clone, Copy, Debug)]
pub struct ShapeCandidate {
    pub name: &'static str,
    pub predicate: PredicateFn,
}

impl ShapeCandidate {
    pub fn classify(&self, shape: &Shape, p: &Point<f64>) -> Classification {
        (self.predicate)(shape, p)
    }

    /// Wraps the predicate into a timed workload over `points`.
    ///
    /// Each call classifies the next point of the fixed sequence, wrapping
    /// around at the end, and returns its [`Classification`]. The cursor is
    /// private to the workload.
    pub fn workload(&self, shape: Arc<Shape>, points: Arc<[Point<f64>]>) -> Candidate {
        let predicate = self.predicate;
        let cursor = Cell::new(0usize);
        Candidate::fallible(self.name, move || {
            if points.is_empty() {
                return Err("empty sample");
            }
            let i = cursor.get();
            cursor.set((i + 1) % points.len());
            Ok(predicate(&shape, &points[i]))
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct Registry {
    families: BTreeMap<Family, Vec<ShapeCandidate>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every predicate shipped with the crate.
    pub fn builtin() -> Self {
        let mut r = Self::new();
        r.register(Family::Rectangle, "rectangle::aabb", predicates::rect_aabb);
        r.register(Family::Rectangle, "rectangle::local_frame", predicates::rect_local_frame);
        r.register(Family::Rectangle, "rectangle::edge_sign", predicates::rect_edge_sign);

        r.register(Family::Circle, "circle::distance_squared", predicates::circle_distance_squared);
        r.register(Family::Circle, "circle::hypot", predicates::circle_hypot);
        r.register(
            Family::Circle,
            "circle::bounding_box_first",
            predicates::circle_bounding_box_first,
        );

        r.register(Family::Polygon, "polygon::ray_crossing", predicates::polygon_ray_crossing);
        r.register(Family::Polygon, "polygon::winding_number", predicates::polygon_winding_number);
        r.register(
            Family::Polygon,
            "polygon::rgeometry_locate",
            predicates::polygon_rgeometry_locate,
        );
        r
    }

    pub fn register(&mut self, family: Family, name: &'static str, predicate: PredicateFn) {
        self.families
            .entry(family)
            .or_default()
            .push(ShapeCandidate { name, predicate });
    }

    /// Entries of `family` in registration order; empty when none exist.
    pub fn discover(&self, family: Family) -> Vec<ShapeCandidate> {
        self.families.get(&family).cloned().unwrap_or_default()
    }

    /// Families with at least one registered entry.
    pub fn families(&self) -> Vec<Family> {
        self.families
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(f, _)| *f)
            .collect()
    }

    /// Timed workloads for every entry of `family`, in discovery order.
    pub fn timing_candidates(
        &self,
        family: Family,
        shape: &Shape,
        points: &[Point<f64>],
    ) -> Vec<Candidate> {
        let shape = Arc::new(shape.clone());
        let points: Arc<[Point<f64>]> = Arc::from(points);
        self.discover(family)
            .iter()
            .map(|c| c.workload(shape.clone(), points.clone()))
            .collect()
    }
}
