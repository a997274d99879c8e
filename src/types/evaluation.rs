//! Results returned by evaluators.

use serde::{Deserialize, Serialize};

use super::errors::{EvalError, EvalResult};
use super::orders::{Order, OrderSet};

/// Result of one evaluation: one component per requested order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Objective value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Gradient, same length as the evaluated point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Vec<f64>>,

    /// Hessian, row-major.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hessian: Option<Vec<Vec<f64>>>,
}

impl Evaluation {
    /// Value-only result.
    pub fn value(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    /// Gradient-only result.
    pub fn gradient(gradient: Vec<f64>) -> Self {
        Self {
            gradient: Some(gradient),
            ..Self::default()
        }
    }

    /// Joint value and gradient result.
    pub fn value_and_gradient(value: f64, gradient: Vec<f64>) -> Self {
        Self {
            value: Some(value),
            gradient: Some(gradient),
            hessian: None,
        }
    }

    /// Adds a Hessian.
    pub fn with_hessian(mut self, hessian: Vec<Vec<f64>>) -> Self {
        self.hessian = Some(hessian);
        self
    }

    /// Orders present in this result.
    pub fn orders(&self) -> OrderSet {
        let mut set = OrderSet::EMPTY;
        if self.value.is_some() {
            set = set.with(Order::Value);
        }
        if self.gradient.is_some() {
            set = set.with(Order::Gradient);
        }
        if self.hessian.is_some() {
            set = set.with(Order::Hessian);
        }
        set
    }

    /// Value component, or `MissingOrder` if absent.
    pub fn require_value(&self) -> EvalResult<f64> {
        self.value.ok_or(EvalError::MissingOrder(Order::Value))
    }

    /// Takes the gradient component, or `MissingOrder` if absent.
    pub fn take_gradient(&mut self) -> EvalResult<Vec<f64>> {
        self.gradient
            .take()
            .ok_or(EvalError::MissingOrder(Order::Gradient))
    }

    /// Checks that every order in `orders` is present.
    pub fn ensure_covers(&self, orders: OrderSet) -> EvalResult<()> {
        let present = self.orders();
        match orders.iter().find(|o| !present.contains(*o)) {
            Some(missing) => Err(EvalError::MissingOrder(missing)),
            None => Ok(()),
        }
    }
}
