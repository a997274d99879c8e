//! Implementation of the evalcache CLI commands.

use std::path::{Path, PathBuf};

use crate::recorder::{CallRecord, LogDestination, LogSummary};
use crate::types::config::{Config, LogBackend};
use crate::EvalResult;

/// Initializes configuration in the specified directory.
pub fn init(path: Option<PathBuf>) -> EvalResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("evalcache.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("evalcache initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Set [recorder] enabled = true to log objective calls to:");
    println!("  {}", config.recorder.path.display());

    Ok(())
}

/// Picks the backend: explicit flag, then file extension, then config.
pub fn resolve_backend(log: &Path, explicit: Option<LogBackend>, config: &Config) -> LogBackend {
    if let Some(backend) = explicit {
        return backend;
    }

    match log.extension().and_then(|e| e.to_str()) {
        Some("json") => LogBackend::Json,
        Some("db") | Some("sqlite") | Some("sqlite3") => LogBackend::Sqlite,
        _ => config.recorder.backend,
    }
}

fn load_records(log: &Path, backend: LogBackend) -> EvalResult<Vec<CallRecord>> {
    if !log.exists() {
        return Err(crate::EvalError::config(format!(
            "Call log not found: {}",
            log.display()
        )));
    }
    LogDestination::open(backend, log)?.records()
}

/// Formats one record as a single line.
pub fn format_record(record: &CallRecord) -> String {
    let point: Vec<String> = record.point.iter().map(|v| format!("{}", v)).collect();
    let outcome = match (&record.error, record.value) {
        (Some(err), _) => format!("ERROR {}", err),
        (None, Some(value)) => format!("value={}", value),
        (None, None) => "ok".to_string(),
    };

    format!(
        "#{:<5} [{}] {} {}",
        record.index,
        point.join(", "),
        record.requested_orders,
        outcome
    )
}

/// Prints the records of a log.
pub fn show(
    log: &Path,
    limit: Option<usize>,
    backend: Option<LogBackend>,
    config: &Config,
) -> EvalResult<()> {
    let backend = resolve_backend(log, backend, config);
    let records = load_records(log, backend)?;

    let skip = limit.map_or(0, |n| records.len().saturating_sub(n));
    for record in records.iter().skip(skip) {
        println!("{}", format_record(record));
    }

    if records.is_empty() {
        println!("Call log is empty.");
    }

    Ok(())
}

/// Prints a summary of a log.
pub fn summary(log: &Path, backend: Option<LogBackend>, config: &Config) -> EvalResult<()> {
    let backend = resolve_backend(log, backend, config);
    let records = load_records(log, backend)?;
    let summary = LogSummary::from_records(&records);

    println!("Call log: {}", log.display());
    println!("Calls:    {}", summary.calls);
    println!(
        "Failures: {} ({:.1}%)",
        summary.failures,
        summary.failure_rate() * 100.0
    );
    for (orders, count) in &summary.by_orders {
        println!("  {:<20} {}", orders, count);
    }
    match summary.best {
        Some((index, value)) => println!("Best value: {} (call #{})", value, index),
        None => println!("Best value: -"),
    }

    Ok(())
}

/// Truncates a log.
pub fn clear(log: &Path, backend: Option<LogBackend>, config: &Config) -> EvalResult<()> {
    let backend = resolve_backend(log, backend, config);
    let destination = LogDestination::open(backend, log)?;
    let removed = destination.len()?;
    destination.reset()?;

    tracing::info!(location = destination.location(), removed, "Call log cleared");
    println!("Removed {} records from {}", removed, log.display());

    Ok(())
}

/// Shows version.
pub fn version() {
    println!("evalcache {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Adaptive value/gradient cache and call recorder for objective functions");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::PendingCall;
    use crate::types::evaluation::Evaluation;
    use crate::types::orders::OrderSet;

    #[test]
    fn test_resolve_backend() {
        let config = Config::default_config();

        assert_eq!(
            resolve_backend(Path::new("a.db"), None, &config),
            LogBackend::Sqlite
        );
        assert_eq!(
            resolve_backend(Path::new("a.json"), None, &config),
            LogBackend::Json
        );
        assert_eq!(
            resolve_backend(Path::new("a.log"), None, &config),
            LogBackend::Json
        );
        assert_eq!(
            resolve_backend(Path::new("a.json"), Some(LogBackend::Sqlite), &config),
            LogBackend::Sqlite
        );
    }

    #[test]
    fn test_format_record() {
        let ok =
            PendingCall::new(2, &[1.0, 2.5], OrderSet::VALUE).succeed(&Evaluation::value(3.5));
        assert_eq!(format_record(&ok), "#2     [1, 2.5] {value} value=3.5");

        let gradient = PendingCall::new(3, &[1.0], OrderSet::GRADIENT)
            .succeed(&Evaluation::gradient(vec![1.0]));
        assert!(format_record(&gradient).ends_with("{gradient} ok"));

        let failed =
            PendingCall::new(4, &[0.0], OrderSet::VALUE).fail(&crate::EvalError::other("boom"));
        assert!(format_record(&failed).ends_with("ERROR boom"));
    }

    #[test]
    fn test_load_missing_log_fails() {
        let err = load_records(Path::new("/nonexistent/calls.json"), LogBackend::Json).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
