//! Logging Infrastructure
//!
//! Structured logging for the post server:
//! - Console output, pretty or JSON
//! - Optional daily rotating files under `<log_dir>/app` (`post.YYYY-MM-DD.log`)
//! - `RUST_LOG` overrides the configured level when set

use chrono::{Local, NaiveDate};
use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

const LOG_PREFIX: &str = "post";
const LOG_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn")
/// * `json_format` - JSON lines instead of the pretty format
/// * `log_dir` - Optional directory for file logging
///
/// # Examples
/// ```no_run
/// // Development setup (console only)
/// post_server::init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + file)
/// post_server::init_logger_with_file("info", true, Some("./data/logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    // Console layer
    if json_format {
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_thread_ids(true)
                .with_filter(env_filter(level))
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_filter(env_filter(level))
                .boxed(),
        );
    }

    if let Some(dir) = log_dir {
        let app_log_dir = Path::new(dir).join("app");
        fs::create_dir_all(&app_log_dir)?;

        let app_log = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_PREFIX)
            .filename_suffix(LOG_SUFFIX)
            .build(&app_log_dir)?;

        let file_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(app_log));

        if json_format {
            layers.push(file_layer.json().with_filter(env_filter(level)).boxed());
        } else {
            layers.push(file_layer.with_filter(env_filter(level)).boxed());
        }
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

/// Initialize console-only logging
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Delete rotated log files older than `retention_days`
///
/// Returns the number of files removed.
pub fn cleanup_old_logs(log_dir: &Path, retention_days: i64) -> anyhow::Result<usize> {
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Local::now().date_naive() - chrono::Duration::days(retention_days);
    let mut removed = 0;

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date) = log_file_date(name) else {
            continue;
        };
        if date < cutoff {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}

/// Date of a `post.YYYY-MM-DD.log` file name
fn log_file_date(name: &str) -> Option<NaiveDate> {
    let date = name
        .strip_prefix(LOG_PREFIX)?
        .strip_prefix('.')?
        .strip_suffix(LOG_SUFFIX)?
        .strip_suffix('.')?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
