use clap::Parser;
use evalcache::cli::{Cli, Commands};
use evalcache::types::config::Config;
use evalcache::EvalResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> EvalResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config).unwrap_or_else(|_| Config::default_config())
    } else {
        Config::default_config()
    };

    // Determine log level: CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("evalcache={}", log_level)
            .parse()
            .unwrap_or_else(|_| "evalcache=info".parse().expect("fallback directive is valid")),
    );

    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            evalcache::cli::commands::init(path)?;
        }
        Commands::Show {
            log,
            limit,
            backend,
        } => {
            evalcache::cli::commands::show(&log, limit, backend, &config)?;
        }
        Commands::Summary { log, backend } => {
            evalcache::cli::commands::summary(&log, backend, &config)?;
        }
        Commands::Clear { log, backend } => {
            evalcache::cli::commands::clear(&log, backend, &config)?;
        }
        Commands::Version => {
            evalcache::cli::commands::version();
        }
    }

    Ok(())
}
