use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use pipbench_core::*;
use rgeometry::data::Point;

// Counts allocations made by the current thread only, so other test threads
// in this binary do not disturb the numbers.
struct CountingAlloc;

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let _ = ALLOCATIONS.try_with(|c| c.set(c.get() + 1));
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

fn allocations_during<F: FnOnce()>(f: F) -> usize {
    let before = ALLOCATIONS.with(Cell::get);
    f();
    ALLOCATIONS.with(Cell::get) - before
}

#[test]
fn timed_loop_does_not_allocate_per_trial() {
    let registry = Registry::builtin();
    let shape = Family::Circle.default_shape();
    let points = vec![Point::new([0.0, 0.0]), Point::new([25.0, 0.0])];
    let candidates = registry.timing_candidates(Family::Circle, &shape, &points);

    for c in &candidates {
        // warm up lazily initialized state (thread priority handles, tracing callsites)
        run_test(c, 1).unwrap();

        let short = allocations_during(|| {
            run_test(c, 10).unwrap();
        });
        let long = allocations_during(|| {
            run_test(c, 100_000).unwrap();
        });
        assert!(
            long <= short + 2,
            "{}: {short} allocations for 10 trials, {long} for 100000",
            c.name()
        );
    }
}

#[test]
fn last_value_survives_the_loop() {
    let c = Candidate::new("answer", || 42u32);
    let r = run_test(&c, 50_000).unwrap();
    assert_eq!(r.last_as::<u32>(), Some(&42));
}
