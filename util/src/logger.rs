//! Generic logger utility functions
//!
//! Log lines go to two places: stdout at the level chosen on the command line,
//! and the session log file, which always keeps debug detail so a session can
//! be inspected afterwards without rerunning it verbose.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use fern::{Dispatch, FormatCallback};
use log::{self, info, Record};
use std::fmt::Arguments;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Lowest level always written to the session log file.
pub const FILE_MIN_LEVEL: LevelFilter = LevelFilter::Debug;

/// Targets whose per-step output is kept off stdout, with the most verbose
/// level still shown for each.
///
/// Solver iterations and recorded samples arrive every cycle. They are still
/// written to the log file.
pub const STDOUT_QUIET_TARGETS: [(&str, LevelFilter); 2] = [
    ("arm_lib::kinematics", LevelFilter::Info),
    ("arm_lib::pacer", LevelFilter::Debug),
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level less than `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// # Notes
///
/// - `min_level` applies to stdout and must be at least `Info`. The log file
///   is written at `min_level` or [`FILE_MIN_LEVEL`], whichever is more
///   verbose.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: LevelFilter,
    session: &session::Session,
) -> Result<(), LoggerInitError> {
    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let file_level = file_level(min_level);

    let mut stdout = Dispatch::new().level(min_level);
    for (target, level) in STDOUT_QUIET_TARGETS.iter() {
        stdout = stdout.level_for(*target, quietened(min_level, *level));
    }

    Dispatch::new()
        .format(format_line)
        .level(min_level.max(file_level))
        .chain(stdout.chain(std::io::stdout()))
        .chain(Dispatch::new().level(file_level).chain(log_file))
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?} (file: {:?})", min_level, file_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Level used for the log file when stdout is at `min_level`.
fn file_level(min_level: LevelFilter) -> LevelFilter {
    min_level.max(FILE_MIN_LEVEL)
}

/// Level used on stdout for a quiet target, never more verbose than the
/// target's ceiling.
fn quietened(min_level: LevelFilter, ceiling: LevelFilter) -> LevelFilter {
    min_level.min(ceiling)
}

/// Prefix each line with the session time and level, and the target too for
/// debug and trace lines.
fn format_line(out: FormatCallback, message: &Arguments, record: &Record) {
    let time_s = session::get_elapsed_seconds();
    let level = level_to_str(record.level());

    if record.level() > log::Level::Info {
        out.finish(format_args!(
            "[{:10.6} {}] {}: {}",
            time_s,
            level,
            record.target(),
            message
        ))
    }
    else {
        out.finish(format_args!("[{:10.6} {}] {}", time_s, level, message))
    }
}

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}
