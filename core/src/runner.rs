use std::any::Any;
use std::hint;
use std::time::Duration;

use stopwatch::Stopwatch;

use crate::error::CandidateError;
use crate::measurement::MeasurementGuard;
use crate::registry::{Candidate, Output};

/// Timing of one candidate over its configured trial count.
#[derive(Debug)]
pub struct TrialResult {
    pub name: String,
    pub trials: u64,
    /// Whole-loop wall-clock time in milliseconds.
    pub total_ms: Option<i64>,
    /// `total_ms / trials`; absent when `trials == 0`.
    pub average_ms: Option<f64>,
    pub elapsed: Option<Duration>,
    /// Most recent value returned by the candidate.
    pub last: Option<Output>,
}

impl TrialResult {
    fn pending(name: &str, trials: u64) -> Self {
        Self {
            name: name.to_string(),
            trials,
            total_ms: None,
            average_ms: None,
            elapsed: None,
            last: None,
        }
    }

    /// Downcasts the last observed value, for spot checks.
    pub fn last_as<T: 'static>(&self) -> Option<&T> {
        self.last.as_ref().and_then(|v| v.downcast_ref::<T>())
    }
}

/// Wall-clock time of one trial loop and the value of its final call.
pub struct Timed {
    pub elapsed: Duration,
    pub last: Option<Output>,
}

/// Runs `step` exactly `trials` times under a stopwatch.
///
/// Return values stay on the stack inside the loop; the last one is boxed
/// after the clock stops. The first error aborts the loop.
pub(crate) fn timed_loop<R, F>(trials: u64, mut step: F) -> Result<Timed, CandidateError>
where
    R: Any,
    F: FnMut() -> Result<R, CandidateError>,
{
    let mut last = None;
    let sw = Stopwatch::start_new();
    for _ in 0..trials {
        last = Some(hint::black_box(step()?));
    }
    let elapsed = sw.elapsed();

    Ok(Timed {
        elapsed,
        last: last.map(|r| Box::new(r) as Output),
    })
}

/// Calls `candidate` exactly `trials` times and times the whole loop.
///
/// The first error aborts the loop and is returned as is. The measurement
/// guard is dropped on every path, so the low-jitter mode never leaks.
pub fn run_test(candidate: &Candidate, trials: u64) -> Result<TrialResult, CandidateError> {
    let mut result = TrialResult::pending(candidate.name(), trials);

    let timed = {
        let _guard = MeasurementGuard::acquire();
        candidate.time(trials)?
    };

    let elapsed = if trials == 0 {
        Duration::ZERO
    } else {
        timed.elapsed
    };
    let total_ms = elapsed.as_millis() as i64;

    result.total_ms = Some(total_ms);
    result.average_ms = (trials > 0).then(|| total_ms as f64 / trials as f64);
    result.elapsed = Some(elapsed);
    result.last = timed.last;

    tracing::debug!(
        name = candidate.name(),
        trials,
        total_ms,
        average_ms = ?result.average_ms,
        "trial run finished"
    );
    Ok(result)
}
