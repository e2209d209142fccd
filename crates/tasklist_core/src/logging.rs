//! Process logging for the tasklist server.
//!
//! Records go to stderr by default, or to size-rotated files when a log
//! directory is configured. The backend is started once per process; later
//! calls must ask for the same level and destination.

use flexi_logger::{
    detailed_format, Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming,
    WriteMode,
};
use log::{info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "tasklist";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    level: LevelFilter,
    log_dir: Option<PathBuf>,
    _handle: LoggerHandle,
}

/// Starts logging at `level`, to stderr or to files under `log_dir`.
///
/// # Errors
/// - `level` is not one of `off|error|warn|info|debug|trace`.
/// - `log_dir` is blank or cannot be created.
/// - Logging is already running with a different level or destination.
pub fn init_logging(level: &str, log_dir: Option<&str>) -> Result<(), String> {
    let level: LevelFilter = level
        .trim()
        .parse()
        .map_err(|_| format!("unsupported log level `{}`", level.trim()))?;
    let log_dir = match log_dir.map(str::trim) {
        Some("") => return Err("log directory cannot be blank".to_string()),
        Some(dir) => Some(PathBuf::from(dir)),
        None => None,
    };

    let active = ACTIVE.get_or_try_init(|| start(level, log_dir.clone()))?;

    if active.log_dir != log_dir {
        return Err(format!(
            "logging already writes to {}; refusing to switch to {}",
            destination(active.log_dir.as_deref()),
            destination(log_dir.as_deref())
        ));
    }
    if active.level != level {
        return Err(format!(
            "logging already runs at `{}`; refusing to switch to `{}`",
            active.level, level
        ));
    }
    Ok(())
}

fn start(level: LevelFilter, log_dir: Option<PathBuf>) -> Result<ActiveLogger, String> {
    let logger = Logger::with(LogSpecification::builder().default(level).build());
    let logger = match log_dir.as_deref() {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("cannot create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(detailed_format)
        }
        None => logger.log_to_stderr().format_for_stderr(detailed_format),
    };
    let handle = logger
        .start()
        .map_err(|err| format!("cannot start logger: {err}"))?;

    info!(
        "event=logging_init module=core status=ok level={} destination={} version={}",
        level,
        destination(log_dir.as_deref()),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        log_dir,
        _handle: handle,
    })
}

fn destination(log_dir: Option<&Path>) -> String {
    log_dir.map_or_else(|| "stderr".to_string(), |dir| dir.display().to_string())
}

/// Returns the running level and log directory (`None` for stderr), or
/// `None` before [`init_logging`] succeeded.
pub fn logging_status() -> Option<(LevelFilter, Option<PathBuf>)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}
