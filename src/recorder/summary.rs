//! Aggregate view of a call log.

use std::collections::BTreeMap;

use super::record::CallRecord;

/// Counts and best value of a call log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSummary {
    pub calls: usize,
    pub failures: usize,

    /// Calls per requested order set, keyed by its display form.
    pub by_orders: BTreeMap<String, usize>,

    /// Lowest recorded value and the index of its call.
    pub best: Option<(u64, f64)>,
}

impl LogSummary {
    pub fn from_records(records: &[CallRecord]) -> Self {
        let mut summary = LogSummary {
            calls: records.len(),
            ..LogSummary::default()
        };

        for record in records {
            if record.is_failure() {
                summary.failures += 1;
            }

            *summary
                .by_orders
                .entry(record.requested_orders.to_string())
                .or_insert(0) += 1;

            if let Some(value) = record.value.filter(|v| !v.is_nan()) {
                match summary.best {
                    Some((_, best)) if best <= value => {}
                    _ => summary.best = Some((record.index, value)),
                }
            }
        }

        summary
    }

    pub fn failure_rate(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.failures as f64 / self.calls as f64
        }
    }
}
