//! Assembles the evaluator stack described by a [`Config`].

use crate::cache::AdaptiveCache;
use crate::evaluators::Evaluator;
use crate::recorder::{CallRecorder, LogDestination};
use crate::types::config::Config;
use crate::EvalResult;

/// Type-erased evaluator stack.
pub type BoxedEvaluator = Box<dyn Evaluator + Send>;

/// Wraps `objective` as configured: the recorder sits directly on the
/// objective so the log lists real evaluations only, and the cache sits on
/// top.
pub fn build<E>(objective: E, config: &Config) -> EvalResult<BoxedEvaluator>
where
    E: Evaluator + Send + 'static,
{
    let mut evaluator: BoxedEvaluator = Box::new(objective);

    if config.recorder.enabled {
        let destination = LogDestination::open(config.recorder.backend, &config.recorder.path)?;
        let recorder = CallRecorder::new(evaluator, destination, config.recorder.reset)?
            .with_announce_index(config.recorder.announce_index);
        evaluator = Box::new(recorder);
    }

    if config.cache.enabled {
        evaluator = Box::new(AdaptiveCache::new(evaluator)?);
    }

    tracing::debug!(
        cache = config.cache.enabled,
        recorder = config.recorder.enabled,
        "Evaluator stack assembled"
    );

    Ok(evaluator)
}
