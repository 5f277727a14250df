use colored::Colorize;
use log::{Level, LevelFilter, Metadata, Record};
use std::fmt;

pub struct Logger;

static LOGGER: Logger = Logger;

impl Logger {
    /// Install the logger. `verbose` counts `-v` flags.
    pub fn init(verbose: u8) {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level_filter(verbose));
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let target = (log::max_level() >= LevelFilter::Debug).then(|| record.target());
            eprintln!("{}", format_line(record.level(), target, record.args()));
        }
    }

    fn flush(&self) {}
}

fn level_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Info lines are plain text; other levels get a coloured prefix.
/// `target` is only passed when running at debug level or above.
fn format_line(level: Level, target: Option<&str>, args: impl fmt::Display) -> String {
    let prefix = match level {
        Level::Error => Some("error:".bold().red()),
        Level::Warn => Some("warning:".bold().yellow()),
        Level::Info => None,
        Level::Debug => Some("debug:".bold().blue()),
        Level::Trace => Some("trace:".bold().purple()),
    };

    let mut line = String::new();

    if let Some(prefix) = prefix {
        line.push_str(&format!("{} ", prefix));
    }

    if let Some(target) = target {
        line.push_str(&format!("{} ", format!("({})", target).dimmed()));
    }

    line.push_str(&args.to_string());
    line
}
