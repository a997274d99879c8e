//! Evaluators: the capability every layer consumes and re-exposes.
//!
//! This module holds the [`Evaluator`] trait plus the concrete adapters that
//! turn plain functions into evaluators or reshape an existing one.

mod base;
mod density;
mod function;

pub use base::{Duplicate, Evaluator};
pub use density::{LogDensity, DEFAULT_BETA};
pub use function::FnObjective;
