//! Run configuration
//!
//! Collects what the host decides before a run: the macro set seen by the
//! directive filter and the optional limits that become a cancellation check.

use crate::interpreter::cancel::{Deadline, StepBudget};
use crate::parser::preprocessor::MacroTable;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub macros: MacroTable,
    /// Cancel after this many checkpoints (statements, iterations, calls)
    pub max_steps: Option<u64>,
    /// Cancel once this much wall-clock time has passed
    pub timeout: Option<Duration>,
}

impl RunConfig {
    pub fn new() -> Self {
        RunConfig::default()
    }

    pub fn with_macros<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.macros.define(name);
        }
        self
    }

    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cancellation check for this configuration. The deadline starts
    /// counting when this is called.
    pub fn cancel_check(&self) -> (Option<StepBudget>, Option<Deadline>) {
        (
            self.max_steps.map(StepBudget::new),
            self.timeout.map(Deadline::after),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::cancel::CancelCheck;

    #[test]
    fn test_unlimited_config_never_cancels() {
        let config = RunConfig::new().with_macros(["DEBUG"]);
        assert!(config.macros.is_defined("DEBUG"));
        assert!(!config.cancel_check().is_cancelled());
    }

    #[test]
    fn test_step_limit() {
        let check = RunConfig::new().with_max_steps(1).cancel_check();
        assert!(!check.is_cancelled());
        assert!(check.is_cancelled());
    }

    #[test]
    fn test_zero_timeout_cancels() {
        let check = RunConfig::new().with_timeout(Duration::ZERO).cancel_check();
        assert!(check.is_cancelled());
    }
}
