//! Process-wide logger.
//!
//! `BATTLESHIPS_LOG` holds a default level optionally followed by
//! per-module overrides, e.g. `info,session=debug,matchmaker=trace`.
//! Module names are matched against log targets with the crate prefix
//! removed, so `session` covers `battleships::session`.

use std::env;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Metadata, Record};

const CRATE_PREFIX: &str = "battleships::";

fn short_target(target: &str) -> &str {
    target.strip_prefix(CRATE_PREFIX).unwrap_or(target)
}

/// Level selection parsed from a `BATTLESHIPS_LOG` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    default: LevelFilter,
    modules: Vec<(String, LevelFilter)>,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            default: LevelFilter::Info,
            modules: Vec::new(),
        }
    }
}

impl LogFilter {
    /// Parse comma-separated directives. Unparseable levels are ignored and
    /// the default level stays `info` unless a bare level is given.
    pub fn parse(spec: &str) -> Self {
        let mut filter = Self::default();
        for directive in spec.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.split_once('=') {
                Some((module, level)) => {
                    if let Ok(level) = level.trim().parse() {
                        filter.modules.push((module.trim().to_string(), level));
                    }
                }
                None => {
                    if let Ok(level) = directive.parse() {
                        filter.default = level;
                    }
                }
            }
        }
        filter
    }

    /// Level in effect for a log target. Later directives win.
    pub fn level_for(&self, target: &str) -> LevelFilter {
        let module = short_target(target);
        self.modules
            .iter()
            .rev()
            .find(|(name, _)| {
                module
                    .strip_prefix(name.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
            })
            .map_or(self.default, |(_, level)| *level)
    }

    /// Most verbose level any target can reach.
    pub fn max_level(&self) -> LevelFilter {
        self.modules
            .iter()
            .map(|(_, level)| *level)
            .fold(self.default, Ord::max)
    }
}

struct ServerLogger {
    filter: LogFilter,
    started: Instant,
}

impl log::Log for ServerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let uptime = self.started.elapsed();
            eprintln!(
                "[{:>6}.{:03}] {:<5} {}: {}",
                uptime.as_secs(),
                uptime.subsec_millis(),
                record.level(),
                short_target(record.target()),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<ServerLogger> = OnceLock::new();

/// Install the logger using the `BATTLESHIPS_LOG` environment variable.
/// Timestamps count seconds since this call. Only the first call has any
/// effect.
pub fn init_logging() {
    let spec = env::var("BATTLESHIPS_LOG").unwrap_or_default();
    let logger = LOGGER.get_or_init(|| ServerLogger {
        filter: LogFilter::parse(&spec),
        started: Instant::now(),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.filter.max_level());
    }
}
