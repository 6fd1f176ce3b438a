//! Host-controlled cancellation
//!
//! The evaluator polls a [`CancelCheck`] at every statement, loop iteration
//! and call. Returning `true` stops the run with `Cancelled`.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub trait CancelCheck {
    fn is_cancelled(&self) -> bool;
}

/// Never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelCheck for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Flag set from another thread, e.g. a Ctrl-C handler.
impl CancelCheck for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<F: Fn() -> bool> CancelCheck for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

impl<T: CancelCheck> CancelCheck for Option<T> {
    fn is_cancelled(&self) -> bool {
        self.as_ref().is_some_and(CancelCheck::is_cancelled)
    }
}

/// Cancelled when either side is.
impl<A: CancelCheck, B: CancelCheck> CancelCheck for (A, B) {
    fn is_cancelled(&self) -> bool {
        self.0.is_cancelled() || self.1.is_cancelled()
    }
}

/// Allows `limit` polls, then cancels.
#[derive(Debug)]
pub struct StepBudget {
    limit: u64,
    used: Cell<u64>,
}

impl StepBudget {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            used: Cell::new(0),
        }
    }

    pub fn used(&self) -> u64 {
        self.used.get()
    }
}

impl CancelCheck for StepBudget {
    fn is_cancelled(&self) -> bool {
        let used = self.used.get();
        if used >= self.limit {
            return true;
        }
        self.used.set(used + 1);
        false
    }
}

/// Cancels once a wall-clock instant has passed.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn at(at: Instant) -> Self {
        Self { at }
    }

    pub fn after(timeout: Duration) -> Self {
        Self::at(Instant::now() + timeout)
    }
}

impl CancelCheck for Deadline {
    fn is_cancelled(&self) -> bool {
        Instant::now() >= self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_budget_allows_exactly_limit_polls() {
        let budget = StepBudget::new(3);
        assert!(!budget.is_cancelled());
        assert!(!budget.is_cancelled());
        assert!(!budget.is_cancelled());
        assert!(budget.is_cancelled());
        assert_eq!(budget.used(), 3);
    }

    #[test]
    fn test_deadline_in_the_past_cancels() {
        let deadline = Deadline::at(Instant::now());
        assert!(deadline.is_cancelled());
        assert!(!Deadline::after(Duration::from_secs(3600)).is_cancelled());
    }

    #[test]
    fn test_combinators() {
        let flag = AtomicBool::new(false);
        assert!(!flag.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(flag.is_cancelled());

        assert!(!None::<StepBudget>.is_cancelled());
        assert!((NeverCancel, || true).is_cancelled());
        assert!(!(NeverCancel, Some(StepBudget::new(1))).is_cancelled());
    }
}
