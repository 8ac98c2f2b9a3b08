//! Best-effort low-jitter mode bracketing a timed loop.
//!
//! [`MeasurementGuard::acquire`] yields once so pending scheduling settles,
//! tries to raise the current thread's priority, and enters a process-wide
//! low-jitter mode. Dropping the guard restores both, on every exit path
//! including unwinding. Elevation failures are logged and otherwise ignored:
//! timings stay valid when the hint has no effect.

use std::sync::atomic::{AtomicUsize, Ordering};

use thread_priority::{ThreadPriority, ThreadPriorityValue};

// Number of live guards; the mode is active while nonzero.
static LOW_JITTER: AtomicUsize = AtomicUsize::new(0);

/// Whether a measurement guard is currently held in this process.
pub fn low_jitter_active() -> bool {
    LOW_JITTER.load(Ordering::SeqCst) > 0
}

pub struct MeasurementGuard {
    original_priority: Option<ThreadPriority>,
}

impl MeasurementGuard {
    pub fn acquire() -> Self {
        std::thread::yield_now();

        let original_priority = elevate_priority();
        LOW_JITTER.fetch_add(1, Ordering::SeqCst);

        Self { original_priority }
    }
}

// Returns the priority to restore, or None when nothing was changed.
fn elevate_priority() -> Option<ThreadPriority> {
    let original = match thread_priority::get_current_thread_priority() {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!("cannot read thread priority: {:?}", e);
            return None;
        }
    };

    // high but not max, system threads still get to run
    let target = ThreadPriorityValue::try_from(75u8).ok()?;
    match thread_priority::set_current_thread_priority(ThreadPriority::Crossplatform(target)) {
        Ok(()) => {
            tracing::debug!("raised thread priority from {:?}", original);
            Some(original)
        }
        Err(e) => {
            tracing::debug!("thread priority not raised: {:?}", e);
            None
        }
    }
}

impl Drop for MeasurementGuard {
    fn drop(&mut self) {
        if let Some(p) = self.original_priority.take() {
            if let Err(e) = thread_priority::set_current_thread_priority(p) {
                tracing::warn!("failed to restore thread priority: {:?}", e);
            }
        }
        LOW_JITTER.fetch_sub(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for MeasurementGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementGuard")
            .field("original_priority", &self.original_priority)
            .finish()
    }
}

#[cfg(test)]
pub(crate) static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_sets_and_restores_flag() {
        let _l = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        {
            let _g = MeasurementGuard::acquire();
            assert!(low_jitter_active());
        }
        assert!(!low_jitter_active());
    }

    #[test]
    fn guard_restores_on_unwind() {
        let _l = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let r = std::panic::catch_unwind(|| {
            let _g = MeasurementGuard::acquire();
            panic!("candidate blew up");
        });
        assert!(r.is_err());
        assert!(!low_jitter_active());
    }

    #[test]
    fn nested_guards() {
        let _l = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let outer = MeasurementGuard::acquire();
        {
            let _inner = MeasurementGuard::acquire();
        }
        assert!(low_jitter_active());
        drop(outer);
        assert!(!low_jitter_active());
    }
}
