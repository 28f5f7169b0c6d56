//! Logging backend for the standard `log` crate
//!
//! Code logs through `log::info!` and friends. [`init_logging`] installs
//! [`FolioLogger`] once per process; later calls are no-ops.
//!
//! Access lines are emitted under the `folio::access` target with
//! key-values (`remote`, `method`, `path`, `status`, `dur_ms`,
//! `request_id`), which every format renders as fields.
//!
//! ```rust,ignore
//! use folio_core::logging::{init_logging, LoggingConfig, LogFormat};
//!
//! init_logging(&LoggingConfig::default().with_format(LogFormat::Logfmt))?;
//! log::info!("listening on {}", addr);
//! ```

pub mod config;
pub mod destinations;
pub mod formatter;

pub use config::{LogLevel, LoggingConfig};
pub use destinations::{LogEntry, LogOutput};
pub use formatter::LogFormat;

use std::io::Write;
use std::sync::Once;

/// Target used for per-request access lines
pub const ACCESS_TARGET: &str = "folio::access";

static INIT: Once = Once::new();

/// Install the Folio logger. Safe to call more than once; only the first
/// call takes effect.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = log::set_boxed_logger(Box::new(FolioLogger::new(config.clone())))
            .map(|()| log::set_max_level(config.level.to_level_filter()))
            .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e));
    });
    result
}

/// `log::Log` implementation writing formatted lines to stdout or stderr
pub struct FolioLogger {
    config: LoggingConfig,
}

impl FolioLogger {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    fn write_line(&self, line: &str) {
        let _ = match self.config.output {
            LogOutput::Stdout => writeln!(std::io::stdout().lock(), "{}", line),
            LogOutput::Stderr => writeln!(std::io::stderr().lock(), "{}", line),
        };
    }
}

impl log::Log for FolioLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::from(self.config.level)
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = LogEntry::from_log_record(record, &self.config);
        self.write_line(&self.config.format.format_entry(&entry));
    }

    fn flush(&self) {
        let _ = match self.config.output {
            LogOutput::Stdout => std::io::stdout().flush(),
            LogOutput::Stderr => std::io::stderr().flush(),
        };
    }
}
