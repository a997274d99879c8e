//! Evaluator backed by plain Rust closures.

use std::sync::Arc;

use anyhow::anyhow;

use super::base::{Duplicate, Evaluator};
use crate::types::evaluation::Evaluation;
use crate::types::orders::{Order, OrderSet};
use crate::{EvalError, EvalResult};

type ValueFn = Arc<dyn Fn(&[f64]) -> anyhow::Result<f64> + Send + Sync>;
type GradientFn = Arc<dyn Fn(&[f64]) -> anyhow::Result<Vec<f64>> + Send + Sync>;

/// Objective built from a value closure and an optional gradient closure.
///
/// A joint request calls both closures. Gradients whose length differs from
/// the point's dimension are reported as evaluation failures.
#[derive(Clone)]
pub struct FnObjective {
    name: String,
    value: ValueFn,
    gradient: Option<GradientFn>,
}

impl FnObjective {
    /// Creates a value-only objective.
    pub fn new<F>(value: F) -> Self
    where
        F: Fn(&[f64]) -> anyhow::Result<f64> + Send + Sync + 'static,
    {
        Self {
            name: "fn_objective".to_string(),
            value: Arc::new(value),
            gradient: None,
        }
    }

    /// Sets the gradient closure.
    pub fn with_gradient<G>(mut self, gradient: G) -> Self
    where
        G: Fn(&[f64]) -> anyhow::Result<Vec<f64>> + Send + Sync + 'static,
    {
        self.gradient = Some(Arc::new(gradient));
        self
    }

    /// Sets the name used in log events.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn compute_gradient(&self, x: &[f64]) -> EvalResult<Vec<f64>> {
        let gradient_fn = self
            .gradient
            .as_ref()
            .ok_or(EvalError::UnsupportedOrder(OrderSet::GRADIENT))?;
        let gradient = gradient_fn(x).map_err(EvalError::Evaluation)?;

        if gradient.len() != x.len() {
            return Err(EvalError::evaluation(anyhow!(
                "gradient has {} entries for a point of dimension {}",
                gradient.len(),
                x.len()
            )));
        }

        Ok(gradient)
    }
}

impl std::fmt::Debug for FnObjective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnObjective")
            .field("name", &self.name)
            .field("has_gradient", &self.gradient.is_some())
            .finish()
    }
}

impl Evaluator for FnObjective {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&mut self, x: &[f64], orders: OrderSet) -> EvalResult<Evaluation> {
        if !self.supports(orders) {
            return Err(EvalError::UnsupportedOrder(orders));
        }

        let mut result = Evaluation::default();
        if orders.contains(Order::Value) {
            result.value = Some((self.value)(x).map_err(EvalError::Evaluation)?);
        }
        if orders.contains(Order::Gradient) {
            result.gradient = Some(self.compute_gradient(x)?);
        }

        Ok(result)
    }

    fn supports(&self, orders: OrderSet) -> bool {
        let available = if self.gradient.is_some() {
            OrderSet::VALUE_AND_GRADIENT
        } else {
            OrderSet::VALUE
        };
        !orders.is_empty() && orders.is_subset(available)
    }
}

impl Duplicate for FnObjective {
    fn duplicate(&self) -> EvalResult<Self> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_objective() -> FnObjective {
        FnObjective::new(|x| Ok(x.iter().sum()))
            .with_gradient(|x| Ok(vec![1.0; x.len()]))
            .with_name("sum")
    }

    #[test]
    fn test_value_only_objective() {
        let mut objective = FnObjective::new(|x| Ok(x[0] * 2.0));

        assert!(objective.supports(OrderSet::VALUE));
        assert!(!objective.supports(OrderSet::GRADIENT));
        assert!(!objective.has_gradient());
        assert_eq!(objective.value(&[4.0]).unwrap(), 8.0);

        let err = objective.evaluate(&[4.0], OrderSet::GRADIENT).unwrap_err();
        assert!(matches!(err, EvalError::UnsupportedOrder(_)));
    }

    #[test]
    fn test_joint_evaluation() {
        let mut objective = sum_objective();

        let result = objective
            .evaluate(&[1.0, 2.0], OrderSet::VALUE_AND_GRADIENT)
            .unwrap();
        assert_eq!(result.value, Some(3.0));
        assert_eq!(result.gradient, Some(vec![1.0, 1.0]));
        assert_eq!(objective.name(), "sum");
    }

    #[test]
    fn test_rejects_empty_and_hessian_requests() {
        let objective = sum_objective();
        assert!(!objective.supports(OrderSet::EMPTY));
        assert!(!objective.supports(OrderSet::HESSIAN));
    }

    #[test]
    fn test_closure_error_becomes_evaluation_failure() {
        let mut objective = FnObjective::new(|_| Err(anyhow!("integration failed")));

        let err = objective.value(&[0.0]).unwrap_err();
        assert!(matches!(err, EvalError::Evaluation(_)));
        assert!(err.to_string().contains("integration failed"));
    }

    #[test]
    fn test_gradient_dimension_is_checked() {
        let mut objective = FnObjective::new(|_| Ok(0.0)).with_gradient(|_| Ok(vec![1.0]));

        let err = objective.gradient(&[1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("dimension 2"));
    }
}
