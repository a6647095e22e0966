//! Deterministic helpers for tests.

use crate::crash::CrashPointSource;
use liftoff_types::CrashPoint;
use std::collections::VecDeque;

/// Crash points replayed from a script, then a fixed fallback.
#[derive(Clone, Debug)]
pub struct ScriptedCrashPoints {
    script: VecDeque<CrashPoint>,
    fallback: CrashPoint,
}

impl ScriptedCrashPoints {
    /// Panics if a value is below 1.00; intended for test fixtures only.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let script = values
            .into_iter()
            .map(|value| CrashPoint::new(value).expect("crash point below 1.00"))
            .collect();
        Self {
            script,
            fallback: CrashPoint::MIN,
        }
    }

    pub fn with_fallback(mut self, value: f64) -> Self {
        self.fallback = CrashPoint::new(value).expect("crash point below 1.00");
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl CrashPointSource for ScriptedCrashPoints {
    fn next_crash_point(&mut self) -> CrashPoint {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_then_fallback() {
        let mut source = ScriptedCrashPoints::new([1.42, 5.0]).with_fallback(2.0);
        assert_eq!(source.next_crash_point().value(), 1.42);
        assert_eq!(source.next_crash_point().value(), 5.0);
        assert_eq!(source.remaining(), 0);
        assert_eq!(source.next_crash_point().value(), 2.0);
    }
}
