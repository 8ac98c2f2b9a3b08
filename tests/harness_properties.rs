use std::sync::Mutex;

use pipbench_core::*;
use proptest::prelude::*;
use rgeometry::data::Point;

// Candidate runs toggle process-wide state; keep them from interleaving.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> std::sync::MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

#[test]
fn golden_points_agree_across_candidates() {
    let registry = Registry::builtin();
    let inside = Point::new([0.5, 0.5]);
    let outside = Point::new([29.0, 29.0]);

    for family in Family::ALL {
        let shape = family.default_shape();
        let candidates = registry.discover(family);
        assert!(!candidates.is_empty());
        for c in &candidates {
            assert_eq!(c.classify(&shape, &inside), Classification::Inside, "{}", c.name);
            assert_eq!(c.classify(&shape, &outside), Classification::Outside, "{}", c.name);
        }

        let record = classify(&candidates, &shape, &[inside, outside]);
        assert!(record.agrees(Membership::Exact), "{family}");
    }
}

#[test]
fn convex_shapes_agree_on_grid_when_collapsed() {
    let registry = Registry::builtin();
    let points = generate_grid(-30.0, -30.0, 30.0, 30.0, 0.75, 0.75);

    // unrotated, so even the rotation-blind candidate conforms
    let rect = Shape::Rect(Rect::new(12.0, 7.0).pos(1.0, -2.0));
    let record = classify(&registry.discover(Family::Rectangle), &rect, &points);
    assert!(record.agrees(Membership::Collapsed));

    let circle = Family::Circle.default_shape();
    let record = classify(&registry.discover(Family::Circle), &circle, &points);
    assert!(record.agrees(Membership::Collapsed));
}

#[test]
fn ranking_of_fixed_averages() {
    let r = rank(&[Some(5.0), Some(1.0), Some(9.0)]).unwrap();
    assert_eq!(r.fastest, 1);
    assert_eq!(r.slowest, 2);

    let tie = rank(&[Some(1.0), Some(1.0)]).unwrap();
    assert_eq!(tie.fastest, 0);

    assert!(matches!(rank(&[]), Err(HarnessError::NothingToRank)));
}

proptest! {
    #[test]
    fn ranking_brackets_every_average(avgs in prop::collection::vec(0.0f64..1e6, 1..32)) {
        let input: Vec<Option<f64>> = avgs.iter().copied().map(Some).collect();
        let r = rank(&input).unwrap();
        for &a in &avgs {
            prop_assert!(avgs[r.fastest] <= a);
            prop_assert!(avgs[r.slowest] >= a);
        }
        // first-seen wins ties
        prop_assert!(avgs[..r.fastest].iter().all(|&a| a > avgs[r.fastest]));
        prop_assert!(avgs[..r.slowest].iter().all(|&a| a < avgs[r.slowest]));
    }
}

#[test]
fn run_test_average_matches_total() {
    let _s = serial();
    let c = Candidate::new("sum", || (0..64u64).sum::<u64>());
    for t in [1u64, 7, 1000, 25_000] {
        let r = run_test(&c, t).unwrap();
        let total = r.total_ms.unwrap();
        assert!(total >= 0);
        let avg = r.average_ms.unwrap();
        assert!((avg - total as f64 / t as f64).abs() < 1e-9);
        assert_eq!(r.last_as::<u64>(), Some(&2016));
    }

    let r = run_test(&c, 0).unwrap();
    assert_eq!(r.total_ms, Some(0));
    assert!(r.average_ms.is_none());
}

#[test]
fn failing_candidate_is_isolated() {
    let _s = serial();
    let mut session = BenchmarkSession::new(Family::Polygon, 50);
    session.set_candidates(vec![
        Candidate::new("A", || 1u8),
        Candidate::fallible("B", || Err::<u8, _>("predicate raised")),
        Candidate::new("C", || 3u8),
    ]);
    session.run_all();

    let results = session.results();
    assert_eq!(results.len(), 3);
    assert!(results[0].trial().is_some());
    assert!(matches!(
        &results[1].outcome,
        CandidateOutcome::Failed { reason } if reason == "predicate raised"
    ));
    assert!(results[2].trial().is_some());
    assert!(!low_jitter_active());

    let ranking = session.ranking().unwrap();
    assert_ne!(ranking.fastest, 1);
    assert_ne!(ranking.slowest, 1);

    let rows = session.rows();
    assert_eq!(rows[1].status, RowStatus::Failed);
    assert!(render_table(&rows).contains("FAILED: predicate raised"));
}

#[test]
fn builtin_session_runs_every_family() {
    let _s = serial();
    let registry = Registry::builtin();
    let points = GridSpec::new(-30.0, -30.0, 30.0, 30.0, 3.0, 3.0).points();

    for family in registry.families() {
        let shape = family.default_shape();
        let mut session = session_for(&registry, family, &shape, &points, 20);
        session.run_all();
        assert_eq!(session.results().len(), 3);
        assert!(session.results().iter().all(|r| r.trial().is_some()));
        assert!(session.last_ranking().is_some());
    }
}

#[test]
fn empty_candidate_set_is_a_no_op() {
    let mut session = BenchmarkSession::new(Family::Circle, 10);
    session.set_candidates(Registry::new().timing_candidates(
        Family::Circle,
        &Family::Circle.default_shape(),
        &GridSpec::default().points(),
    ));
    session.run_all();
    assert!(session.results().is_empty());
    assert!(matches!(session.ranking(), Err(HarnessError::NothingToRank)));
}
