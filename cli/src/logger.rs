//! Stderr logger that prefixes every record with the program name, e.g.
//! `scripts error: Cannot find heading: deploy`.

use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};

struct CliLogger {
    program: String,
    filter: LevelFilter,
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = writeln!(
            std::io::stderr().lock(),
            "{} {}: {}",
            self.program,
            level_label(record.level()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "error",
        Level::Warn => "warning",
        Level::Info => "info",
        Level::Debug => "debug",
        Level::Trace => "trace",
    }
}

/// `RUST_LOG` wins when it parses as a level; otherwise `--verbose` shows
/// everything down to debug and the default shows warnings and errors.
fn level_filter(verbose: bool, rust_log: Option<&str>) -> LevelFilter {
    rust_log
        .and_then(|s| s.parse().ok())
        .unwrap_or(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
}

/// Install the global logger. Later calls are ignored.
pub fn init(program: &str, verbose: bool) {
    let filter = level_filter(verbose, std::env::var("RUST_LOG").ok().as_deref());
    let logger = CliLogger {
        program: program.to_string(),
        filter,
    };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_debug() {
        assert_eq!(level_filter(false, None), LevelFilter::Warn);
        assert_eq!(level_filter(true, None), LevelFilter::Debug);
    }

    #[test]
    fn rust_log_overrides_when_valid() {
        assert_eq!(level_filter(false, Some("trace")), LevelFilter::Trace);
        assert_eq!(level_filter(true, Some("error")), LevelFilter::Error);
        assert_eq!(level_filter(true, Some("mdscript=info")), LevelFilter::Debug);
    }

    #[test]
    fn labels_match_message_prefixes() {
        assert_eq!(level_label(Level::Error), "error");
        assert_eq!(level_label(Level::Warn), "warning");
        assert_eq!(level_label(Level::Info), "info");
    }
}
