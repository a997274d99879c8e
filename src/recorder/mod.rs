//! Call recording.
//!
//! [`CallRecorder`] wraps an evaluator and keeps an append-only log of every
//! call made through it: the point, the requested orders, and either the
//! value or the failure. Logs live behind a [`LogDestination`], which can be
//! shared between recorders.

mod floats;
mod record;
#[allow(clippy::module_inception)]
mod recorder;
#[cfg(feature = "sqlite")]
mod sqlite;
mod store;
mod summary;

pub use record::{CallRecord, PendingCall};
pub use recorder::{CallRecorder, DuplicateMode};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use store::{JsonFileStore, LogDestination, LogStore, MemoryStore};
pub use summary::LogSummary;
