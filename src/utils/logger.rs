use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One short line per event, for terminals.
    Compact,
    /// One JSON object per event, for CloudWatch.
    Json,
}

/// Filter used when `RUST_LOG` is unset. Verbose runs also show per-career and per-file
/// debug lines.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "docfill_etl=debug,info"
    } else {
        "docfill_etl=info,warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Installs the global subscriber. A second call is ignored.
pub fn init_logger(format: LogFormat, verbose: bool) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(verbose)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(env_filter(verbose));
    let installed = match format {
        LogFormat::Compact => registry.with(fmt_layer.compact()).try_init(),
        LogFormat::Json => registry.with(fmt_layer.json()).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Logger already initialized");
    }
}

pub fn init_cli_logger(verbose: bool) {
    init_logger(LogFormat::Compact, verbose);
}

pub fn init_lambda_logger() {
    init_logger(LogFormat::Json, false);
}
