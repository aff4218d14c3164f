//! Stash plugin log encoding.
//!
//! Plugins transmit log messages to the host over stderr; each line carries
//! a prefix of SOH, a level character (t, d, i, w, e — or p for progress),
//! and STX. This module provides that encoding as a backend for the `log`
//! facade, so library code logs through the usual macros and a plugin
//! installs [`init`] at startup.

use std::io::Write;

use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use regex::Regex;

/// Inline base64 image payloads are useless in logs and can be enormous.
static BASE64_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"data:image.+?;base64.+?'").unwrap());

/// Logger that encodes records with the plugin line protocol.
pub struct PluginLogger {
    level: LevelFilter,
}

impl PluginLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl log::Log for PluginLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        emit(level_char(record.level()), &record.args().to_string());
    }

    fn flush(&self) {}
}

/// Install the plugin logger as the global `log` backend at debug level.
pub fn init() -> Result<(), log::SetLoggerError> {
    init_with_level(LevelFilter::Debug)
}

/// Install the plugin logger with an explicit maximum level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(PluginLogger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}

/// Report task progress to the host, clamped to [0, 1].
pub fn progress(p: f64) {
    let p = p.clamp(0.0, 1.0);
    emit('p', &p.to_string());
}

fn level_char(level: Level) -> char {
    match level {
        Level::Trace => 't',
        Level::Debug => 'd',
        Level::Info => 'i',
        Level::Warn => 'w',
        Level::Error => 'e',
    }
}

/// Write one prefixed stderr line per message line and flush.
fn emit(level_char: char, message: &str) {
    let message = sanitize(message);
    let mut stderr = std::io::stderr().lock();
    for line in message.split('\n') {
        let _ = writeln!(stderr, "\x01{level_char}\x02 {line}");
    }
    let _ = stderr.flush();
}

fn sanitize(message: &str) -> String {
    BASE64_RE.replace_all(message, "[...]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_chars() {
        assert_eq!(level_char(Level::Trace), 't');
        assert_eq!(level_char(Level::Debug), 'd');
        assert_eq!(level_char(Level::Info), 'i');
        assert_eq!(level_char(Level::Warn), 'w');
        assert_eq!(level_char(Level::Error), 'e');
    }

    #[test]
    fn test_base64_payload_is_truncated() {
        let message = "cover: 'data:image/png;base64,iVBORw0KGgoAAAANS' done";
        assert_eq!(sanitize(message), "cover: '[...] done");
    }

    #[test]
    fn test_plain_messages_pass_through() {
        let message = "matched \"Anna Lee\" to \"Anna Lee\" (12) using alias";
        assert_eq!(sanitize(message), message);
    }
}
