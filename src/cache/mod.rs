//! Adaptive cache for value/gradient evaluations.
//!
//! This module implements a single-entry cache that remembers the last joint
//! value and gradient evaluation of an objective and decides, from the orders
//! callers request, whether caching is worth doing at all.

mod adaptive;

pub use adaptive::{AdaptiveCache, CacheDecision, CacheEntry, CachePhase, CacheState, CacheStats};
