//! Transport failure simulation for the persistence adapter.

use super::{AdapterError, AdapterOp, AdapterResult};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// Decides whether an adapter call fails with a transport error.
///
/// Scheduled failures (`fail_next`) are consumed first, in order; otherwise
/// each call fails with probability `failure_rate`.
#[derive(Debug, Default)]
pub struct FaultInjector {
    failure_rate: f64,
    scheduled: Mutex<VecDeque<AdapterOp>>,
    calls: Mutex<HashMap<AdapterOp, usize>>,
}

impl FaultInjector {
    pub fn new(failure_rate: f64) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Makes the next call of `op` fail.
    pub fn fail_next(&self, op: AdapterOp) {
        self.scheduled.lock().push_back(op);
    }

    /// Number of calls of `op` seen so far, failed ones included.
    pub fn calls(&self, op: AdapterOp) -> usize {
        self.calls.lock().get(&op).copied().unwrap_or(0)
    }

    /// Records one call of `op` and returns the simulated outcome.
    pub fn check(&self, op: AdapterOp) -> AdapterResult<()> {
        *self.calls.lock().entry(op).or_insert(0) += 1;

        let scheduled = {
            let mut queue = self.scheduled.lock();
            match queue.iter().position(|pending| *pending == op) {
                Some(index) => queue.remove(index).is_some(),
                None => false,
            }
        };
        if scheduled {
            return Err(AdapterError::Transport(format!(
                "injected failure for {}",
                op.as_str()
            )));
        }

        if self.failure_rate > 0.0 && rand::random::<f64>() < self.failure_rate {
            return Err(AdapterError::Transport(format!(
                "simulated network failure for {}",
                op.as_str()
            )));
        }
        Ok(())
    }
}
