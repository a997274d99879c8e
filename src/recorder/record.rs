//! Call log records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::evaluation::Evaluation;
use crate::types::orders::OrderSet;
use crate::EvalError;

use super::floats;

/// One finalized objective call.
///
/// Exactly one of `value` / `error` describes the outcome: failed calls have
/// an error message and no value. Successful calls that did not request the
/// value have neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Position in the log, starting at 0.
    pub index: u64,

    /// Evaluated point. Non-finite coordinates are stored as strings.
    #[serde(with = "floats::point")]
    pub point: Vec<f64>,

    /// Orders the caller asked for.
    pub requested_orders: OrderSet,

    /// Objective value, if requested and the call succeeded.
    #[serde(default, with = "floats::value")]
    pub value: Option<f64>,

    /// Failure message, if the call failed.
    pub error: Option<String>,

    /// When the call finished.
    pub recorded_at: DateTime<Utc>,
}

impl CallRecord {
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// A call that has started but whose outcome is not known yet.
#[derive(Debug, Clone)]
pub struct PendingCall {
    /// Index the call would get if nobody else appends first.
    pub index: u64,
    pub point: Vec<f64>,
    pub requested_orders: OrderSet,
}

impl PendingCall {
    pub fn new(index: u64, point: &[f64], requested_orders: OrderSet) -> Self {
        Self {
            index,
            point: point.to_vec(),
            requested_orders,
        }
    }

    /// Finalizes with the value component of a successful result.
    pub fn succeed(self, result: &Evaluation) -> CallRecord {
        self.finish(result.value, None)
    }

    /// Finalizes with the message of a failure.
    pub fn fail(self, err: &EvalError) -> CallRecord {
        self.finish(None, Some(err.to_string()))
    }

    fn finish(self, value: Option<f64>, error: Option<String>) -> CallRecord {
        CallRecord {
            index: self.index,
            point: self.point,
            requested_orders: self.requested_orders,
            value,
            error,
            recorded_at: Utc::now(),
        }
    }
}
