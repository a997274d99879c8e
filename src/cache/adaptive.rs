//! Adaptive value/gradient cache.

use crate::evaluators::{Duplicate, Evaluator};
use crate::types::evaluation::Evaluation;
use crate::types::orders::{Order, OrderSet};
use crate::{EvalError, EvalResult};

/// Result of one joint `{VALUE, GRADIENT}` evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Point the entry was computed at.
    pub point: Vec<f64>,

    /// Objective value at `point`.
    pub value: f64,

    /// Gradient at `point`.
    pub gradient: Vec<f64>,
}

impl CacheEntry {
    /// Whether `x` equals the cached point element by element.
    pub fn matches(&self, x: &[f64]) -> bool {
        self.point.as_slice() == x
    }
}

/// Phase of the cache, without the cached data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePhase {
    /// No entry; value-only requests go straight to the wrapped evaluator.
    Disengaged,
    /// Entry present, its gradient not handed out yet.
    Unconsumed,
    /// Entry present, its gradient handed out at least once.
    Consumed,
}

impl std::fmt::Display for CachePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CachePhase::Disengaged => write!(f, "disengaged"),
            CachePhase::Unconsumed => write!(f, "engaged-unconsumed"),
            CachePhase::Consumed => write!(f, "engaged-consumed"),
        }
    }
}

/// What the cache does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    /// Forward the request unchanged; the cache stays disengaged.
    Bypass,
    /// Drop the entry, then forward the request unchanged.
    Disengage,
    /// Evaluate value and gradient jointly and store them.
    Recompute,
    /// Answer from the stored entry.
    Hit,
}

/// State machine behind [`AdaptiveCache`].
///
/// `Unconsumed` is entered only by a recomputation; `Consumed` only when a
/// gradient is served from the entry.
#[derive(Debug, Clone, Default)]
pub enum CacheState {
    #[default]
    Disengaged,
    Unconsumed(CacheEntry),
    Consumed(CacheEntry),
}

impl CacheState {
    pub fn phase(&self) -> CachePhase {
        match self {
            CacheState::Disengaged => CachePhase::Disengaged,
            CacheState::Unconsumed(_) => CachePhase::Unconsumed,
            CacheState::Consumed(_) => CachePhase::Consumed,
        }
    }

    pub fn entry(&self) -> Option<&CacheEntry> {
        match self {
            CacheState::Disengaged => None,
            CacheState::Unconsumed(entry) | CacheState::Consumed(entry) => Some(entry),
        }
    }

    pub fn cached_point(&self) -> Option<&[f64]> {
        self.entry().map(|entry| entry.point.as_slice())
    }

    /// Whether the stored gradient was served since the last recomputation.
    pub fn gradient_consumed(&self) -> bool {
        matches!(self, CacheState::Consumed(_))
    }

    /// Decides how to handle a valid request for `orders` at `x`.
    ///
    /// Pure: the state is not modified.
    pub fn decide(&self, x: &[f64], orders: OrderSet) -> CacheDecision {
        let value_only = orders == OrderSet::VALUE;

        match self {
            CacheState::Disengaged if value_only => CacheDecision::Bypass,
            CacheState::Disengaged => CacheDecision::Recompute,
            CacheState::Unconsumed(entry) | CacheState::Consumed(entry) if entry.matches(x) => {
                CacheDecision::Hit
            }
            CacheState::Unconsumed(_) if value_only => CacheDecision::Disengage,
            CacheState::Unconsumed(_) | CacheState::Consumed(_) => CacheDecision::Recompute,
        }
    }

    /// Answers `orders` from the entry, marking the gradient consumed when it
    /// is served. Returns `None` when disengaged.
    fn serve(&mut self, orders: OrderSet) -> Option<Evaluation> {
        if orders.contains(Order::Gradient) {
            if let CacheState::Unconsumed(entry) = std::mem::take(self) {
                *self = CacheState::Consumed(entry);
            }
        }

        let entry = self.entry()?;
        let mut result = Evaluation::default();
        if orders.contains(Order::Value) {
            result.value = Some(entry.value);
        }
        if orders.contains(Order::Gradient) {
            result.gradient = Some(entry.gradient.clone());
        }
        Some(result)
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from the entry.
    pub hits: u64,

    /// Joint evaluations that (re)populated the entry.
    pub recomputations: u64,

    /// Requests forwarded unchanged to the wrapped evaluator.
    pub bypasses: u64,

    /// Times the cache turned itself off after an unused gradient.
    pub deactivations: u64,
}

impl CacheStats {
    /// Calls made to the wrapped evaluator, successful or not.
    pub fn inner_calls(&self) -> u64 {
        self.recomputations + self.bypasses
    }

    /// Hit rate among requests the cache handled itself.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.recomputations;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache for the last joint value/gradient evaluation of an objective.
///
/// Caching starts disengaged, so value-only callers such as gradient-free
/// samplers pay nothing. The first request involving a gradient engages it:
/// from then on every miss computes value and gradient together. If a
/// speculatively computed gradient is never read before a value-only request
/// at a different point arrives, the cache disengages again.
///
/// Only `{VALUE}`, `{GRADIENT}` and `{VALUE, GRADIENT}` are served.
#[derive(Debug)]
pub struct AdaptiveCache<E> {
    inner: E,
    state: CacheState,
    stats: CacheStats,
}

impl<E: Evaluator> AdaptiveCache<E> {
    /// Wraps an evaluator.
    ///
    /// Fails with `UnsupportedEvaluator` if `inner` cannot evaluate values.
    pub fn new(inner: E) -> EvalResult<Self> {
        if !inner.supports(OrderSet::VALUE) {
            return Err(EvalError::UnsupportedEvaluator(format!(
                "'{}' must support {}",
                inner.name(),
                OrderSet::VALUE
            )));
        }

        Ok(Self {
            inner,
            state: CacheState::Disengaged,
            stats: CacheStats::default(),
        })
    }

    pub fn state(&self) -> &CacheState {
        &self.state
    }

    pub fn phase(&self) -> CachePhase {
        self.state.phase()
    }

    pub fn cached_point(&self) -> Option<&[f64]> {
        self.state.cached_point()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    /// Drops the entry and disengages.
    pub fn clear(&mut self) {
        self.state = CacheState::Disengaged;
    }

    /// Evaluates value and gradient jointly and replaces the entry.
    ///
    /// The state is left untouched if the wrapped evaluator fails or omits
    /// a component.
    fn recompute(&mut self, x: &[f64]) -> EvalResult<()> {
        let mut result = self.inner.evaluate(x, OrderSet::VALUE_AND_GRADIENT)?;
        let value = result.require_value()?;
        let gradient = result.take_gradient()?;

        self.state = CacheState::Unconsumed(CacheEntry {
            point: x.to_vec(),
            value,
            gradient,
        });
        Ok(())
    }
}

impl<E: Evaluator> Evaluator for AdaptiveCache<E> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn evaluate(&mut self, x: &[f64], orders: OrderSet) -> EvalResult<Evaluation> {
        if !self.supports(orders) {
            return Err(EvalError::UnsupportedOrder(orders));
        }

        match self.state.decide(x, orders) {
            CacheDecision::Bypass => {
                self.stats.bypasses += 1;
                return self.inner.evaluate(x, orders);
            }
            CacheDecision::Disengage => {
                tracing::debug!(
                    evaluator = self.inner.name(),
                    "Cached gradient went unused, disengaging cache"
                );
                self.state = CacheState::Disengaged;
                self.stats.deactivations += 1;
                self.stats.bypasses += 1;
                return self.inner.evaluate(x, orders);
            }
            CacheDecision::Recompute => {
                if self.state.phase() == CachePhase::Disengaged {
                    tracing::debug!(
                        evaluator = self.inner.name(),
                        %orders,
                        "Engaging cache"
                    );
                }
                self.stats.recomputations += 1;
                self.recompute(x)?;
            }
            CacheDecision::Hit => {
                self.stats.hits += 1;
            }
        }

        self.state
            .serve(orders)
            .ok_or_else(|| EvalError::other("adaptive cache has no entry to answer from"))
    }

    fn supports(&self, orders: OrderSet) -> bool {
        match orders {
            OrderSet::VALUE => true,
            OrderSet::GRADIENT | OrderSet::VALUE_AND_GRADIENT => {
                self.inner.supports(OrderSet::VALUE_AND_GRADIENT)
            }
            _ => false,
        }
    }

    fn initialize(&mut self) -> EvalResult<()> {
        self.inner.initialize()?;
        self.clear();
        Ok(())
    }
}

/// Duplicates start disengaged over a duplicate of the wrapped evaluator.
impl<E: Evaluator + Duplicate> Duplicate for AdaptiveCache<E> {
    fn duplicate(&self) -> EvalResult<Self> {
        Self::new(self.inner.duplicate()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    /// `value = sum(x)`, `gradient = ones`, counting every call.
    #[derive(Default)]
    struct SumProbe {
        calls: Vec<OrderSet>,
        fail_next: bool,
        value_only: bool,
    }

    impl Evaluator for SumProbe {
        fn evaluate(&mut self, x: &[f64], orders: OrderSet) -> EvalResult<Evaluation> {
            self.calls.push(orders);
            if std::mem::take(&mut self.fail_next) {
                return Err(EvalError::evaluation(anyhow!("probe failure")));
            }
            let mut result = Evaluation::default();
            if orders.contains(Order::Value) {
                result.value = Some(x.iter().sum());
            }
            if orders.contains(Order::Gradient) {
                result.gradient = Some(vec![1.0; x.len()]);
            }
            Ok(result)
        }

        fn supports(&self, orders: OrderSet) -> bool {
            if self.value_only {
                orders == OrderSet::VALUE
            } else {
                !orders.is_empty() && orders.is_subset(OrderSet::VALUE_AND_GRADIENT)
            }
        }
    }

    #[derive(Debug)]
    struct NoValue;

    impl Evaluator for NoValue {
        fn evaluate(&mut self, _x: &[f64], orders: OrderSet) -> EvalResult<Evaluation> {
            Err(EvalError::UnsupportedOrder(orders))
        }

        fn supports(&self, orders: OrderSet) -> bool {
            orders == OrderSet::GRADIENT
        }
    }

    fn probe_cache() -> AdaptiveCache<SumProbe> {
        AdaptiveCache::new(SumProbe::default()).unwrap()
    }

    fn engaged(point: &[f64], consumed: bool) -> CacheState {
        let entry = CacheEntry {
            point: point.to_vec(),
            value: 0.0,
            gradient: vec![0.0; point.len()],
        };
        if consumed {
            CacheState::Consumed(entry)
        } else {
            CacheState::Unconsumed(entry)
        }
    }

    #[test]
    fn test_decide_when_disengaged() {
        let state = CacheState::Disengaged;
        assert_eq!(state.decide(&[1.0], OrderSet::VALUE), CacheDecision::Bypass);
        assert_eq!(
            state.decide(&[1.0], OrderSet::GRADIENT),
            CacheDecision::Recompute
        );
        assert_eq!(
            state.decide(&[1.0], OrderSet::VALUE_AND_GRADIENT),
            CacheDecision::Recompute
        );
    }

    #[test]
    fn test_decide_hit_in_both_engaged_phases() {
        for consumed in [false, true] {
            let state = engaged(&[1.0, 2.0], consumed);
            for orders in [
                OrderSet::VALUE,
                OrderSet::GRADIENT,
                OrderSet::VALUE_AND_GRADIENT,
            ] {
                assert_eq!(state.decide(&[1.0, 2.0], orders), CacheDecision::Hit);
            }
        }
    }

    #[test]
    fn test_decide_value_miss_depends_on_consumption() {
        assert_eq!(
            engaged(&[1.0], false).decide(&[2.0], OrderSet::VALUE),
            CacheDecision::Disengage
        );
        assert_eq!(
            engaged(&[1.0], true).decide(&[2.0], OrderSet::VALUE),
            CacheDecision::Recompute
        );
    }

    #[test]
    fn test_decide_gradient_miss_always_recomputes() {
        for consumed in [false, true] {
            let state = engaged(&[1.0], consumed);
            assert_eq!(
                state.decide(&[2.0], OrderSet::GRADIENT),
                CacheDecision::Recompute
            );
            assert_eq!(
                state.decide(&[2.0], OrderSet::VALUE_AND_GRADIENT),
                CacheDecision::Recompute
            );
        }
    }

    #[test]
    fn test_decide_requires_same_dimension() {
        let state = engaged(&[1.0, 2.0], true);
        assert_eq!(
            state.decide(&[1.0, 2.0, 0.0], OrderSet::GRADIENT),
            CacheDecision::Recompute
        );
    }

    #[test]
    fn test_value_only_calls_never_cache() {
        let mut cache = probe_cache();

        for i in 0..5 {
            let x = [i as f64, 1.0];
            assert_eq!(cache.value(&x).unwrap(), i as f64 + 1.0);
            assert!(cache.cached_point().is_none());
        }

        assert_eq!(cache.inner().calls, vec![OrderSet::VALUE; 5]);
        assert_eq!(cache.stats().bypasses, 5);
    }

    #[test]
    fn test_scenario_sum_objective() {
        let mut cache = probe_cache();

        let first = cache.evaluate(&[1.0, 2.0], OrderSet::VALUE).unwrap();
        assert_eq!(first, Evaluation::value(3.0));
        assert_eq!(cache.inner().calls.len(), 1);
        assert!(cache.cached_point().is_none());

        let second = cache.evaluate(&[1.0, 2.0], OrderSet::GRADIENT).unwrap();
        assert_eq!(second, Evaluation::gradient(vec![1.0, 1.0]));
        assert_eq!(cache.inner().calls.len(), 2);
        assert_eq!(cache.inner().calls[1], OrderSet::VALUE_AND_GRADIENT);
        let entry = cache.state().entry().unwrap();
        assert_eq!(entry.point, vec![1.0, 2.0]);
        assert_eq!(entry.value, 3.0);
        assert_eq!(entry.gradient, vec![1.0, 1.0]);

        let third = cache.evaluate(&[1.0, 2.0], OrderSet::VALUE).unwrap();
        assert_eq!(third, Evaluation::value(3.0));
        assert_eq!(cache.inner().calls.len(), 2);
    }

    #[test]
    fn test_self_deactivation() {
        let mut cache = probe_cache();

        cache.evaluate(&[1.0], OrderSet::VALUE_AND_GRADIENT).unwrap();
        // Entry recomputed at [2.0]; its gradient is never read.
        cache.evaluate(&[2.0], OrderSet::VALUE).unwrap();
        assert_eq!(cache.phase(), CachePhase::Unconsumed);

        let result = cache.evaluate(&[3.0], OrderSet::VALUE).unwrap();

        assert_eq!(result, Evaluation::value(3.0));
        assert_eq!(cache.phase(), CachePhase::Disengaged);
        assert!(cache.cached_point().is_none());
        assert_eq!(cache.stats().deactivations, 1);
        assert_eq!(
            cache.inner().calls,
            vec![
                OrderSet::VALUE_AND_GRADIENT,
                OrderSet::VALUE_AND_GRADIENT,
                OrderSet::VALUE
            ]
        );

        // Disengaged again: value-only calls go straight through.
        cache.evaluate(&[4.0], OrderSet::VALUE).unwrap();
        assert_eq!(cache.inner().calls.last(), Some(&OrderSet::VALUE));
        assert!(cache.cached_point().is_none());
    }

    #[test]
    fn test_unread_entry_costs_one_direct_call_to_disengage() {
        let mut cache = probe_cache();
        cache.state = engaged(&[1.0], false);

        let result = cache.evaluate(&[5.0], OrderSet::VALUE).unwrap();

        assert_eq!(result, Evaluation::value(5.0));
        assert_eq!(cache.inner().calls, vec![OrderSet::VALUE]);
        assert!(cache.cached_point().is_none());
    }

    #[test]
    fn test_consumed_gradient_keeps_cache_engaged() {
        let mut cache = probe_cache();

        cache.evaluate(&[1.0], OrderSet::GRADIENT).unwrap();
        let result = cache.evaluate(&[2.0], OrderSet::VALUE).unwrap();

        assert_eq!(result, Evaluation::value(2.0));
        assert_eq!(cache.cached_point(), Some(&[2.0][..]));
        assert_eq!(cache.phase(), CachePhase::Unconsumed);
        assert_eq!(
            cache.inner().calls,
            vec![OrderSet::VALUE_AND_GRADIENT, OrderSet::VALUE_AND_GRADIENT]
        );
    }

    #[test]
    fn test_hit_returns_identical_gradient() {
        let mut cache = probe_cache();

        let joint = cache
            .evaluate(&[0.5, -1.5], OrderSet::VALUE_AND_GRADIENT)
            .unwrap();
        let gradient = cache.evaluate(&[0.5, -1.5], OrderSet::GRADIENT).unwrap();

        assert_eq!(joint.gradient, gradient.gradient);
        assert_eq!(cache.inner().calls.len(), 1);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().hit_rate(), 0.5);
    }

    #[test]
    fn test_consumption_resets_only_on_recompute() {
        let mut cache = probe_cache();

        cache.evaluate(&[1.0], OrderSet::GRADIENT).unwrap();
        cache.evaluate(&[1.0], OrderSet::GRADIENT).unwrap();
        cache.evaluate(&[1.0], OrderSet::VALUE).unwrap();
        assert!(cache.state().gradient_consumed());

        cache.evaluate(&[2.0], OrderSet::VALUE_AND_GRADIENT).unwrap();
        assert!(cache.state().gradient_consumed());

        cache.evaluate(&[3.0], OrderSet::VALUE).unwrap();
        assert!(!cache.state().gradient_consumed());
        assert_eq!(cache.cached_point(), Some(&[3.0][..]));
    }

    #[test]
    fn test_failed_recompute_leaves_state_unchanged() {
        let mut cache = probe_cache();
        cache.evaluate(&[1.0], OrderSet::GRADIENT).unwrap();
        let before = cache.state().clone();

        cache.inner.fail_next = true;
        let err = cache.evaluate(&[2.0], OrderSet::GRADIENT).unwrap_err();

        assert!(matches!(err, EvalError::Evaluation(_)));
        assert_eq!(cache.state().entry(), before.entry());
        assert_eq!(cache.phase(), before.phase());
    }

    #[test]
    fn test_failed_first_recompute_stays_disengaged() {
        let mut cache = probe_cache();
        cache.inner.fail_next = true;

        assert!(cache.evaluate(&[1.0], OrderSet::GRADIENT).is_err());
        assert_eq!(cache.phase(), CachePhase::Disengaged);
    }

    #[test]
    fn test_unsupported_orders_rejected_before_state_change() {
        let mut cache = probe_cache();

        for orders in [
            OrderSet::EMPTY,
            OrderSet::HESSIAN,
            OrderSet::VALUE.with(Order::Hessian),
        ] {
            let err = cache.evaluate(&[1.0], orders).unwrap_err();
            assert!(matches!(err, EvalError::UnsupportedOrder(o) if o == orders));
        }

        assert!(cache.inner().calls.is_empty());
        assert_eq!(cache.phase(), CachePhase::Disengaged);
    }

    #[test]
    fn test_value_only_inner_gives_value_only_cache() {
        let inner = SumProbe {
            value_only: true,
            ..SumProbe::default()
        };
        let mut cache = AdaptiveCache::new(inner).unwrap();

        assert!(cache.supports(OrderSet::VALUE));
        assert!(!cache.supports(OrderSet::GRADIENT));
        assert!(!cache.supports(OrderSet::VALUE_AND_GRADIENT));

        let err = cache.evaluate(&[1.0], OrderSet::GRADIENT).unwrap_err();
        assert!(matches!(err, EvalError::UnsupportedOrder(_)));
        assert!(cache.inner().calls.is_empty());
    }

    #[test]
    fn test_rejects_evaluator_without_value() {
        let err = AdaptiveCache::new(NoValue).unwrap_err();
        assert!(matches!(err, EvalError::UnsupportedEvaluator(_)));
    }

    #[test]
    fn test_initialize_disengages() {
        let mut cache = probe_cache();
        cache.evaluate(&[1.0], OrderSet::GRADIENT).unwrap();

        cache.initialize().unwrap();

        assert_eq!(cache.phase(), CachePhase::Disengaged);
        cache.evaluate(&[1.0], OrderSet::VALUE).unwrap();
        assert_eq!(cache.inner().calls.last(), Some(&OrderSet::VALUE));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(CachePhase::Unconsumed.to_string(), "engaged-unconsumed");
    }
}
