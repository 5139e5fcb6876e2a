//! Tracing configuration
//!
//! Installs the global subscriber: an env-filter for level control, a `fmt`
//! layer on stdout and, when a log directory is configured, a second
//! non-blocking `fmt` layer writing to `managed-provisioning.log` there.

use std::{fs, io, path::Path, sync::OnceLock};

use anyhow::Context;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

const LOG_FILE_NAME: &str = "managed-provisioning.log";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Check if running in development environment
fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Default filter directives, used when `RUST_LOG` is not set.
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let level = if is_dev { "debug" } else { "info" };
    vec![
        if is_dev { "info" } else { "warn" }.to_string(),
        format!("managed_provisioning={level}"),
        format!("mp_app={level}"),
        format!("mp_infra={level}"),
    ]
}

/// Initialize the tracing subscriber.
///
/// `log_directory` may be empty, in which case only stdout is used.
/// Call once, before the flow is wired.
///
/// # Errors
///
/// Returns `Err` if a subscriber is already registered or the log directory
/// cannot be created.
pub fn init_tracing_subscriber(log_directory: &Path) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(build_filter_directives(is_development()).join(",")));

    let stdout_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(TIME_FORMAT.to_string()))
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(io::stdout);

    let file_layer = if log_directory.as_os_str().is_empty() {
        None
    } else {
        let writer = build_file_writer(log_directory)?;
        Some(
            fmt::layer()
                .with_timer(fmt::time::ChronoUtc::new(TIME_FORMAT.to_string()))
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer),
        )
    };

    registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

fn build_file_writer(log_directory: &Path) -> anyhow::Result<NonBlocking> {
    fs::create_dir_all(log_directory)
        .with_context(|| format!("Failed to create log dir: {}", log_directory.display()))?;

    let file_appender = tracing_appender::rolling::never(log_directory, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}
