//! Console logging with dry-run awareness.
//!
//! User-facing output goes through [`Logger`], which writes plain console
//! lines and mirrors every message to [`tracing`] events so that the
//! env-filter controlled subscriber (see [`init_subscriber`]) can route them
//! to diagnostics. Debug lines are suppressed on the console unless the
//! logger was created verbose.

use std::io::Write as _;

use tracing_subscriber::EnvFilter;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Structured console logger.
#[derive(Debug)]
pub struct Logger {
    verbose: bool,
}

impl Logger {
    /// Create a new logger. Verbose loggers also print debug lines.
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(stage = true, "{msg}");
        emit(&format!("{BOLD}==> {msg}{RESET}"));
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
        emit(msg);
    }

    /// Log a debug message (console only when verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
        if self.verbose {
            emit(&format!("{CYAN}debug:{RESET} {msg}"));
        }
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
        emit(&format!("{YELLOW}warning:{RESET} {msg}"));
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
        emit(&format!("{RED}error:{RESET} {msg}"));
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(dry_run = true, "{msg}");
        emit(&format!("{CYAN}dry-run:{RESET} {msg}"));
    }
}

/// Write one line to stdout, swallowing broken-pipe style failures.
#[allow(clippy::print_stdout)]
fn emit(line: &str) {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    let _ = writeln!(lock, "{line}");
}

/// Install the global tracing subscriber.
///
/// Honours `RUST_LOG` when set; otherwise defaults to `warn`, or `debug`
/// when `verbose` is requested. Console output is handled by [`Logger`], so
/// the subscriber writes to stderr only for diagnostic consumers.
pub fn init_subscriber(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
