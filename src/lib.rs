//! # evalcache
//!
//! Adaptive caching and call recording for expensive objective functions.
//!
//! An objective that can return its value, its gradient, or both is wrapped
//! in layers that all speak the same [`Evaluator`] contract:
//!
//! - [`AdaptiveCache`] remembers the last joint value/gradient evaluation and
//!   switches itself on and off depending on whether callers use gradients;
//! - [`CallRecorder`] logs every call, including failures, to a durable log.
//!
//! ## Modules
//!
//! - [`evaluators`] - The `Evaluator` trait and closure/log-density adapters
//! - [`cache`] - Adaptive value/gradient cache
//! - [`recorder`] - Call recorder and log storage (JSON, SQLite)
//! - [`pipeline`] - Builds the configured evaluator stack
//! - [`cli`] - Command line interface for inspecting logs
//! - [`types`] - Shared types

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod evaluators;
pub mod pipeline;
pub mod recorder;
pub mod types;

pub use cache::AdaptiveCache;
pub use evaluators::{Duplicate, Evaluator, FnObjective, LogDensity};
pub use recorder::{CallRecorder, DuplicateMode, LogDestination};
pub use types::config::Config;
pub use types::errors::{EvalError, EvalResult};
pub use types::evaluation::Evaluation;
pub use types::orders::{Order, OrderSet};
