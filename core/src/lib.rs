//! Benchmark harness for point-in-shape predicates.
//!
//! A [`Registry`] maps each predicate [`Family`] to its competing
//! implementations. A [`BenchmarkSession`] times every implementation over the
//! same deterministic [`generate_grid`] sample and ranks them. [`classify`]
//! labels the same sample with every implementation so that disagreements
//! show up.

pub mod classify;
pub mod config;
pub mod error;
pub mod grid;
pub mod measurement;
pub mod predicates;
pub mod registry;
pub mod report;
pub mod runner;
pub mod session;
pub mod shape;

pub use classify::{classify, ClassificationRecord, LabelCounts};
pub use config::{ConfigError, HarnessConfig, LogFormat, LoggingConfig};
pub use error::{CandidateError, HarnessError};
pub use grid::{generate_grid, GridSpec, MAX_GRID_POINTS};
pub use measurement::{low_jitter_active, MeasurementGuard};
pub use registry::{Candidate, Output, Registry, ShapeCandidate};
pub use report::{render_json, render_table, ReportRow, RowStatus};
pub use runner::{run_test, Timed, TrialResult};
pub use session::{rank, BenchmarkSession, CancelToken, CandidateOutcome, CandidateResult, Ranking};
pub use shape::{gen_shape, Circle, Classification, Family, Membership, PolygonShape, Rect, Shape};

use rand::prelude::*;
use rgeometry::data::Point;

pub fn points_uniform<R: Rng>(rng: &mut R, extent: f64, count: usize) -> Vec<Point<f64>> {
    let mut v = Vec::with_capacity(count);
    for _i in 0..count {
        let x = rng.gen_range(-extent..extent);
        let y = rng.gen_range(-extent..extent);

        v.push(Point::new([x, y]));
    }
    v
}

/// Session for `family` over `points`, loaded with the registry's candidates.
pub fn session_for(
    registry: &Registry,
    family: Family,
    shape: &Shape,
    points: &[Point<f64>],
    trials: u64,
) -> BenchmarkSession {
    let mut s = BenchmarkSession::new(family, trials);
    s.set_candidates(registry.timing_candidates(family, shape, points));
    s
}
