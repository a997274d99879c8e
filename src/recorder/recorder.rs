//! Evaluator wrapper that records every call.

use crate::evaluators::{Duplicate, Evaluator};
use crate::types::evaluation::Evaluation;
use crate::types::orders::OrderSet;
use crate::{EvalError, EvalResult};

use super::record::{CallRecord, PendingCall};
use super::store::LogDestination;

/// How a duplicated recorder treats the log.
#[derive(Debug, Clone)]
pub enum DuplicateMode {
    /// Append to the same destination as the original.
    ShareLog,
    /// Append to a different destination. Existing records there are kept.
    Fresh(LogDestination),
}

/// Wrapper that appends one [`CallRecord`] per call to a log.
///
/// The log is rewritten after every call whatever the outcome, and failures
/// of the wrapped evaluator are returned unchanged once recorded.
#[derive(Debug)]
pub struct CallRecorder<E> {
    inner: E,
    destination: LogDestination,
    announce_index: bool,
    calls: u64,
}

impl<E: Evaluator> CallRecorder<E> {
    /// Wraps `inner`, logging to `destination`.
    ///
    /// With `reset`, the destination is truncated to an empty log first.
    /// Without it, existing records are kept and new calls append after them.
    pub fn new(inner: E, destination: LogDestination, reset: bool) -> EvalResult<Self> {
        if reset {
            destination.reset()?;
        } else {
            destination.ensure_initialized()?;
        }

        tracing::debug!(
            evaluator = inner.name(),
            location = destination.location(),
            reset,
            "Call recorder attached"
        );

        Ok(Self {
            inner,
            destination,
            announce_index: false,
            calls: 0,
        })
    }

    /// Emits the log index of each call before evaluating it.
    pub fn with_announce_index(mut self, announce: bool) -> Self {
        self.announce_index = announce;
        self
    }

    pub fn announce_index(&self) -> bool {
        self.announce_index
    }

    pub fn destination(&self) -> &LogDestination {
        &self.destination
    }

    /// Calls made through this instance. Not shared with duplicates.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Current contents of the log, including other recorders' calls when
    /// the destination is shared.
    pub fn records(&self) -> EvalResult<Vec<CallRecord>> {
        self.destination.records()
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    /// Duplicates the recorder and the evaluator it wraps.
    ///
    /// The duplicate keeps `announce_index`, never resets its destination,
    /// and starts counting calls from zero.
    pub fn duplicate_with(&self, mode: DuplicateMode) -> EvalResult<Self>
    where
        E: Duplicate,
    {
        let destination = match mode {
            DuplicateMode::ShareLog => self.destination.clone(),
            DuplicateMode::Fresh(destination) => destination,
        };

        Ok(Self::new(self.inner.duplicate()?, destination, false)?
            .with_announce_index(self.announce_index))
    }
}

impl<E: Evaluator> Evaluator for CallRecorder<E> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn evaluate(&mut self, x: &[f64], orders: OrderSet) -> EvalResult<Evaluation> {
        // Rejected requests never reach the log.
        if !self.inner.supports(orders) {
            return Err(EvalError::UnsupportedOrder(orders));
        }

        let pending = PendingCall::new(self.destination.len()? as u64, x, orders);
        if self.announce_index {
            tracing::info!(
                index = pending.index,
                evaluator = self.inner.name(),
                "Recording objective call"
            );
        }
        self.calls += 1;

        match self.inner.evaluate(x, orders) {
            Ok(result) => {
                self.destination.append(pending.succeed(&result))?;
                Ok(result)
            }
            Err(err) => {
                if let Err(log_err) = self.destination.append(pending.fail(&err)) {
                    tracing::error!(
                        location = self.destination.location(),
                        error = %log_err,
                        "Failed to record failed objective call"
                    );
                }
                Err(err)
            }
        }
    }

    fn supports(&self, orders: OrderSet) -> bool {
        self.inner.supports(orders)
    }

    fn initialize(&mut self) -> EvalResult<()> {
        self.inner.initialize()
    }
}

/// Duplicates share the original's log.
impl<E: Evaluator + Duplicate> Duplicate for CallRecorder<E> {
    fn duplicate(&self) -> EvalResult<Self> {
        self.duplicate_with(DuplicateMode::ShareLog)
    }
}
