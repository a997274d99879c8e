//! Base trait for evaluators.

use crate::types::evaluation::Evaluation;
use crate::types::orders::OrderSet;
use crate::EvalResult;

/// Trait for anything that can evaluate an objective at a point.
///
/// The raw objective, [`AdaptiveCache`](crate::cache::AdaptiveCache) and
/// [`CallRecorder`](crate::recorder::CallRecorder) all implement it, so
/// wrappers nest in any order and stand in wherever an objective is expected.
pub trait Evaluator {
    /// Returns the evaluator name used in log events.
    fn name(&self) -> &str {
        "objective"
    }

    /// Evaluates the objective at `x` for the requested orders.
    ///
    /// # Arguments
    ///
    /// * `x` - Point of evaluation
    /// * `orders` - Non-empty set of derivative orders
    ///
    /// # Returns
    ///
    /// One component per requested order.
    fn evaluate(&mut self, x: &[f64], orders: OrderSet) -> EvalResult<Evaluation>;

    /// Whether `orders` can be requested in a single call.
    fn supports(&self, orders: OrderSet) -> bool;

    /// Resets per-run state. Wrappers delegate to the evaluator they wrap.
    fn initialize(&mut self) -> EvalResult<()> {
        Ok(())
    }

    /// Whether a gradient can be requested on its own.
    fn has_gradient(&self) -> bool {
        self.supports(OrderSet::GRADIENT)
    }

    /// Evaluates the value only.
    fn value(&mut self, x: &[f64]) -> EvalResult<f64> {
        self.evaluate(x, OrderSet::VALUE)?.require_value()
    }

    /// Evaluates the gradient only.
    fn gradient(&mut self, x: &[f64]) -> EvalResult<Vec<f64>> {
        self.evaluate(x, OrderSet::GRADIENT)?.take_gradient()
    }

    /// Evaluates value and gradient in one call.
    fn value_and_gradient(&mut self, x: &[f64]) -> EvalResult<(f64, Vec<f64>)> {
        let mut result = self.evaluate(x, OrderSet::VALUE_AND_GRADIENT)?;
        let gradient = result.take_gradient()?;
        Ok((result.require_value()?, gradient))
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(&mut self, x: &[f64], orders: OrderSet) -> EvalResult<Evaluation> {
        (**self).evaluate(x, orders)
    }

    fn supports(&self, orders: OrderSet) -> bool {
        (**self).supports(orders)
    }

    fn initialize(&mut self) -> EvalResult<()> {
        (**self).initialize()
    }
}

impl<E: Evaluator + ?Sized> Evaluator for &mut E {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(&mut self, x: &[f64], orders: OrderSet) -> EvalResult<Evaluation> {
        (**self).evaluate(x, orders)
    }

    fn supports(&self, orders: OrderSet) -> bool {
        (**self).supports(orders)
    }

    fn initialize(&mut self) -> EvalResult<()> {
        (**self).initialize()
    }
}

/// Produces an independent copy of an evaluator, e.g. one per optimizer
/// start.
///
/// Copies never share per-instance mutable state with the original. What
/// they do share (if anything) is up to the implementation and documented
/// there.
pub trait Duplicate: Sized {
    fn duplicate(&self) -> EvalResult<Self>;
}
