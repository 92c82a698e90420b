//! Interruptible sleeping for feed threads

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Longest single sleep; bounds how long `stop` waits for a feed thread
const SLICE: Duration = Duration::from_millis(20);

/// Sleep for `duration` in short slices while `running` stays set.
///
/// Returns `false` if `running` was cleared before the time was up.
pub(crate) fn sleep_while_running(duration: Duration, running: &AtomicBool) -> bool {
    let deadline = Instant::now().checked_add(duration);

    loop {
        if !running.load(Ordering::Relaxed) {
            return false;
        }
        let remaining = match deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => SLICE,
        };
        if remaining.is_zero() {
            return true;
        }
        thread::sleep(remaining.min(SLICE));
    }
}

/// Clears a feed's `running` flag when the feed thread exits, panics included.
pub(crate) struct RunningGuard<'a>(pub(crate) &'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_runs_to_completion() {
        let running = AtomicBool::new(true);
        let start = Instant::now();
        assert!(sleep_while_running(Duration::from_millis(30), &running));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_cleared_flag_cuts_sleep_short() {
        let running = AtomicBool::new(false);
        let start = Instant::now();
        assert!(!sleep_while_running(Duration::from_secs(3600), &running));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_guard_clears_flag_on_panic() {
        let running = AtomicBool::new(true);
        let result = std::panic::catch_unwind(|| {
            let _guard = RunningGuard(&running);
            panic!("feed thread died");
        });
        assert!(result.is_err());
        assert!(!running.load(Ordering::SeqCst));
    }
}
