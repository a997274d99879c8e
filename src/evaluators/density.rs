//! Tempered log-density view of an objective.
//!
//! Samplers work with an unnormalized log-probability rather than with the
//! objective being minimized. For an objective `f` (a negative log-likelihood)
//! and inverse temperature `beta`, the log-density is `-beta * f(x)` and its
//! gradient `-beta * ∇f(x)`.

use super::base::{Duplicate, Evaluator};
use crate::types::evaluation::Evaluation;
use crate::types::orders::{Order, OrderSet};
use crate::{EvalError, EvalResult};

/// Inverse temperature of an untempered density.
pub const DEFAULT_BETA: f64 = 1.0;

/// Evaluator exposing `-beta * f` for a wrapped objective `f`.
#[derive(Debug, Clone)]
pub struct LogDensity<E> {
    objective: E,
    beta: f64,
}

impl<E: Evaluator> LogDensity<E> {
    /// Wraps an objective with `beta = 1`.
    pub fn new(objective: E) -> Self {
        Self::tempered(objective, DEFAULT_BETA)
    }

    /// Wraps an objective with the given inverse temperature.
    pub fn tempered(objective: E, beta: f64) -> Self {
        Self { objective, beta }
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn inner(&self) -> &E {
        &self.objective
    }

    pub fn into_inner(self) -> E {
        self.objective
    }

    /// Log-density at `x`.
    pub fn log_density(&mut self, x: &[f64]) -> EvalResult<f64> {
        self.value(x)
    }

    /// Gradient of the log-density at `x`, or `None` if the objective has no
    /// gradient.
    pub fn log_density_gradient(&mut self, x: &[f64]) -> EvalResult<Option<Vec<f64>>> {
        if !self.objective.has_gradient() {
            return Ok(None);
        }
        self.gradient(x).map(Some)
    }
}

impl<E: Evaluator> Evaluator for LogDensity<E> {
    fn name(&self) -> &str {
        self.objective.name()
    }

    fn evaluate(&mut self, x: &[f64], orders: OrderSet) -> EvalResult<Evaluation> {
        if !self.supports(orders) {
            return Err(EvalError::UnsupportedOrder(orders));
        }

        let mut result = self.objective.evaluate(x, orders)?;
        result.ensure_covers(orders)?;

        let scale = -self.beta;
        if orders.contains(Order::Value) {
            result.value = result.value.map(|v| scale * v);
        } else {
            result.value = None;
        }
        if orders.contains(Order::Gradient) {
            if let Some(gradient) = result.gradient.as_mut() {
                gradient.iter_mut().for_each(|g| *g *= scale);
            }
        } else {
            result.gradient = None;
        }
        result.hessian = None;

        Ok(result)
    }

    fn supports(&self, orders: OrderSet) -> bool {
        orders.is_first_order_request() && self.objective.supports(orders)
    }

    fn initialize(&mut self) -> EvalResult<()> {
        self.objective.initialize()
    }
}

impl<E: Evaluator + Duplicate> Duplicate for LogDensity<E> {
    fn duplicate(&self) -> EvalResult<Self> {
        Ok(Self::tempered(self.objective.duplicate()?, self.beta))
    }
}
