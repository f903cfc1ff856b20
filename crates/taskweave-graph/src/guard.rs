use crate::config::RunLimits;
use taskweave_core::{WeaveError, WeaveResult};
use taskweave_state::StateContainer;

/// Enforces the depth and step ceilings of a run.
///
/// Depth and step counts live on the [`StateContainer`] rather than on the
/// call stack, so the limits hold no matter how a dispatch is executed. The
/// guard is the only mechanism preventing unbounded recursive delegation and
/// runaway iteration.
#[derive(Debug, Clone, Copy)]
pub struct RunGuard {
    limits: RunLimits,
}

impl RunGuard {
    /// Creates a guard with the given ceilings.
    pub fn new(limits: RunLimits) -> Self {
        Self { limits }
    }

    /// Validate that a dispatch from `current_depth` stays within the depth
    /// ceiling. Fails with `DepthExceeded` before the child executes.
    pub fn check_dispatch(&self, current_depth: u32) -> WeaveResult<()> {
        let attempted = current_depth + 1;
        if attempted > self.limits.max_depth {
            return Err(WeaveError::DepthExceeded {
                attempted,
                max: self.limits.max_depth,
            });
        }
        Ok(())
    }

    /// Count one orchestration step. Fails with `StepLimitExceeded` once the
    /// ceiling is reached; the step is not taken.
    pub fn record_step(&self, state: &mut StateContainer) -> WeaveResult<()> {
        if state.step_count >= self.limits.max_steps {
            return Err(WeaveError::StepLimitExceeded(self.limits.max_steps));
        }
        state.step_count += 1;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn guard(max_depth: u32, max_steps: u32) -> RunGuard {
        RunGuard::new(RunLimits {
            max_depth,
            max_steps,
        })
    }

    #[test]
    fn test_depth_ceiling_allows_exactly_n_levels() {
        let guard = guard(2, 100);
        // Root (depth 0) dispatches to depth 1, depth 1 dispatches to depth 2.
        guard.check_dispatch(0).unwrap();
        guard.check_dispatch(1).unwrap();
        // Depth 2 may not dispatch further.
        let err = guard.check_dispatch(2).unwrap_err();
        assert!(matches!(
            err,
            WeaveError::DepthExceeded { attempted: 3, max: 2 }
        ));
    }

    #[test]
    fn test_depth_zero_blocks_all_dispatch() {
        let guard = guard(0, 100);
        assert!(guard.check_dispatch(0).is_err());
    }

    #[test]
    fn test_step_limit() {
        let guard = guard(1, 3);
        let mut state = StateContainer::new();
        for expected in 1..=3 {
            guard.record_step(&mut state).unwrap();
            assert_eq!(state.step_count, expected);
        }
        let err = guard.record_step(&mut state).unwrap_err();
        assert!(matches!(err, WeaveError::StepLimitExceeded(3)));
        assert!(err.is_terminal());
        // The failed step did not count.
        assert_eq!(state.step_count, 3);
    }
}
