//! Batch orchestration: one session per selected predicate family.
//!
//! Candidates run one at a time, in discovery order, on the calling thread.
//! A candidate that errors or panics is recorded as failed and the batch
//! moves on; earlier results are never touched by a later failure.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::HarnessError;
use crate::registry::Candidate;
use crate::report::ReportRow;
use crate::runner::{run_test, TrialResult};
use crate::shape::Family;

/// Cooperative cancellation, checked between candidates.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub enum CandidateOutcome {
    Completed(TrialResult),
    Failed { reason: String },
    /// Not run because the batch was cancelled first.
    Skipped,
}

#[derive(Debug)]
pub struct CandidateResult {
    pub name: String,
    pub outcome: CandidateOutcome,
}

impl CandidateResult {
    pub fn trial(&self) -> Option<&TrialResult> {
        match &self.outcome {
            CandidateOutcome::Completed(r) => Some(r),
            _ => None,
        }
    }

    pub fn average_ms(&self) -> Option<f64> {
        self.trial().and_then(|r| r.average_ms)
    }
}

/// Indices into [`BenchmarkSession::results`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ranking {
    pub fastest: usize,
    pub slowest: usize,
}

/// Linear scan by average time; ties keep the first-seen entry.
pub fn rank(averages: &[Option<f64>]) -> Result<Ranking, HarnessError> {
    let mut best: Option<(usize, f64)> = None;
    let mut worst: Option<(usize, f64)> = None;
    for (i, avg) in averages.iter().enumerate() {
        let Some(avg) = *avg else { continue };
        if best.map_or(true, |(_, b)| avg < b) {
            best = Some((i, avg));
        }
        if worst.map_or(true, |(_, w)| avg > w) {
            worst = Some((i, avg));
        }
    }
    match (best, worst) {
        (Some((fastest, _)), Some((slowest, _))) => Ok(Ranking { fastest, slowest }),
        _ => Err(HarnessError::NothingToRank),
    }
}

pub struct BenchmarkSession {
    family: Family,
    trials: u64,
    candidates: Vec<Candidate>,
    results: Vec<CandidateResult>,
    ranking: Option<Ranking>,
}

impl BenchmarkSession {
    pub fn new(family: Family, trials: u64) -> Self {
        Self {
            family,
            trials,
            candidates: Vec::new(),
            results: Vec::new(),
            ranking: None,
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn set_trials(&mut self, trials: u64) {
        self.trials = trials;
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Replaces the active set and clears prior results.
    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
        self.results.clear();
        self.ranking = None;
    }

    pub fn results(&self) -> &[CandidateResult] {
        &self.results
    }

    pub fn run_all(&mut self) {
        self.run_all_with(&CancelToken::new());
    }

    pub fn run_all_with(&mut self, cancel: &CancelToken) {
        let span = tracing::info_span!("run_all", family = %self.family, trials = self.trials);
        let _enter = span.enter();

        if self.candidates.is_empty() {
            tracing::info!("no candidates, nothing to benchmark");
        }

        let mut results = Vec::with_capacity(self.candidates.len());
        for c in &self.candidates {
            if cancel.is_cancelled() {
                results.push(CandidateResult {
                    name: c.name().to_string(),
                    outcome: CandidateOutcome::Skipped,
                });
                continue;
            }
            let outcome = run_isolated(c, self.trials);
            results.push(CandidateResult {
                name: c.name().to_string(),
                outcome,
            });
        }

        self.results = results;
        self.ranking = self.ranking().ok();
        if let Some(r) = self.ranking {
            tracing::info!(
                fastest = %self.results[r.fastest].name,
                slowest = %self.results[r.slowest].name,
                "ranking"
            );
        }
    }

    /// Ranking derived after the last run.
    pub fn last_ranking(&self) -> Option<Ranking> {
        self.ranking
    }

    pub fn ranking(&self) -> Result<Ranking, HarnessError> {
        let averages: Vec<_> = self.results.iter().map(|r| r.average_ms()).collect();
        rank(&averages)
    }

    /// Presentation rows for the current results.
    pub fn rows(&self) -> Vec<ReportRow> {
        ReportRow::from_results(&self.results, self.ranking)
    }
}

fn run_isolated(c: &Candidate, trials: u64) -> CandidateOutcome {
    tracing::debug!(name = c.name(), "running candidate");
    match panic::catch_unwind(AssertUnwindSafe(|| run_test(c, trials))) {
        Ok(Ok(r)) => {
            tracing::info!(name = c.name(), total_ms = ?r.total_ms, average_ms = ?r.average_ms, "candidate finished");
            CandidateOutcome::Completed(r)
        }
        Ok(Err(e)) => {
            tracing::warn!(name = c.name(), error = %e, "candidate failed");
            CandidateOutcome::Failed {
                reason: e.to_string(),
            }
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::warn!(name = c.name(), %reason, "candidate panicked");
            CandidateOutcome::Failed { reason }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{low_jitter_active, TEST_LOCK};

    #[test]
    fn rank_by_average() {
        let r = rank(&[Some(5.0), Some(1.0), Some(9.0)]).unwrap();
        assert_eq!(r, Ranking { fastest: 1, slowest: 2 });
    }

    #[test]
    fn rank_ties_keep_first_seen() {
        let r = rank(&[Some(2.0), Some(2.0), Some(2.0)]).unwrap();
        assert_eq!(r, Ranking { fastest: 0, slowest: 0 });

        let r = rank(&[Some(3.0), None, Some(1.0), Some(1.0), Some(3.0)]).unwrap();
        assert_eq!(r, Ranking { fastest: 2, slowest: 0 });
    }

    #[test]
    fn rank_empty_fails() {
        assert!(matches!(rank(&[]), Err(HarnessError::NothingToRank)));
        assert!(matches!(rank(&[None, None]), Err(HarnessError::NothingToRank)));
    }

    #[test]
    fn failure_is_isolated() {
        let _l = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut s = BenchmarkSession::new(Family::Circle, 10);
        s.set_candidates(vec![
            Candidate::new("a", || 1u32),
            Candidate::fallible("b", || Err::<u32, _>("boom")),
            Candidate::new("c", || -> u32 { panic!("bad math") }),
            Candidate::new("d", || 4u32),
        ]);
        s.run_all();

        let r = s.results();
        assert_eq!(r.len(), 4);
        assert!(r[0].trial().is_some());
        assert!(matches!(&r[1].outcome, CandidateOutcome::Failed { reason } if reason == "boom"));
        assert!(
            matches!(&r[2].outcome, CandidateOutcome::Failed { reason } if reason.contains("bad math"))
        );
        assert_eq!(r[3].trial().and_then(|t| t.last_as::<u32>()), Some(&4));
        assert!(!low_jitter_active());
        assert!(s.last_ranking().is_some());
    }

    #[test]
    fn rerun_overwrites_and_set_candidates_clears() {
        let _l = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut s = BenchmarkSession::new(Family::Polygon, 3);
        s.set_candidates(vec![Candidate::new("a", || ())]);
        s.run_all();
        s.run_all();
        assert_eq!(s.results().len(), 1);

        s.set_candidates(Vec::new());
        assert!(s.results().is_empty());
        assert!(s.last_ranking().is_none());
        s.run_all();
        assert!(matches!(s.ranking(), Err(HarnessError::NothingToRank)));
    }

    #[test]
    fn cancelled_batch_skips_remaining() {
        let _l = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut s = BenchmarkSession::new(Family::Rectangle, 1);
        s.set_candidates(vec![Candidate::new("a", || ()), Candidate::new("b", || ())]);
        let token = CancelToken::new();
        token.cancel();
        s.run_all_with(&token);
        assert!(s
            .results()
            .iter()
            .all(|r| matches!(r.outcome, CandidateOutcome::Skipped)));
        assert!(s.last_ranking().is_none());
    }
}
