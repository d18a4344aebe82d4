//! The `log` module configures the crate's logging facilities. Logging records messages about the
//! behavior of the program. This is not to be confused with _reporting_ (see
//! [`crate::report`]), which records model output tick by tick.
//!
//! This module (re)exports the five logging macros: `error!`, `warn!`, `info!`, `debug!` and
//! `trace!` where `error!` represents the highest-priority log messages and `trace!` the lowest.
//!
//! Logging is _disabled_ by default. Log messages are enabled/disabled using the functions:
//!
//!  - `enable_logging()`: turns on all log messages
//!  - `disable_logging()`: turns off all log messages
//!  - `set_log_level(level: LevelFilter)`: enables only log messages with priority at least `level`
//!
//! Per-module filtering is configured with `set_module_filter()` / `set_module_filters()` and
//! `remove_module_filter()`:
//!
//! ```rust
//! use ixa_grid_spread::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! pub fn setup_logging() {
//!     // Enable `info` log messages globally.
//!     set_log_level(LevelFilter::Info);
//!     // Trace every tick of the simulation.
//!     set_module_filter("ixa_grid_spread::simulation", LevelFilter::Trace);
//! }
//! ```
//!
//! The command line runner accepts the same configuration as a single string, parsed by
//! [`parse_log_level`]: `info`, `ixa_grid_spread::simulation=trace`, or a comma separated mix
//! such as `warn,ixa_grid_spread::hazard=debug`.
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

pub use log::{debug, error, info, trace, warn, LevelFilter};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::GridSpreadError;
#[cfg(feature = "logging")]
use log4rs::Handle;
use std::sync::LazyLock;
use std::sync::{Mutex, MutexGuard};

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// A level filter for the log messages emitted from one module path
/// (e.g. `"ixa_grid_spread::hazard"`).
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    module: String,
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Holds logging configuration: the filter levels of modules and a handle to the global logger.
///
/// Because loggers are globally installed, only one instance of this struct should exist. The
/// public API are free functions which fetch the singleton and call the appropriate member
/// function.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// The level filter for modules without an explicitly set filter. A global filter level of
    /// `LevelFilter::Off` disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    pub(in crate::log) module_configurations: HashMap<String, ModuleLogConfiguration>,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations: HashMap::new(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    pub(in crate::log) fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    /// Returns true if the configuration was mutated, false otherwise.
    fn insert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        match self.module_configurations.entry(module.to_string()) {
            Entry::Occupied(mut entry) => {
                let module_config = entry.get_mut();
                if module_config.level == level {
                    return false;
                }
                module_config.level = level;
            }
            Entry::Vacant(entry) => {
                entry.insert((module, level).into());
            }
        }
        true
    }

    pub(in crate::log) fn set_module_filter(&mut self, module: &str, level: LevelFilter) {
        if self.insert_module_filter(module, level) {
            self.set_config();
        }
    }

    pub(in crate::log) fn set_module_filters(&mut self, module_filters: &[(&str, LevelFilter)]) {
        let mut mutated = false;
        for (module, level) in module_filters {
            mutated |= self.insert_module_filter(module, *level);
        }
        if mutated {
            self.set_config();
        }
    }

    pub(in crate::log) fn remove_module_filter(&mut self, module: &str) {
        if self.module_configurations.remove(module).is_some() {
            self.set_config();
        }
    }
}

// The public API

/// Enables the logger with no global level filter / full logging. Equivalent to
/// `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely. Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the global log level. A global filter level of `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    get_log_configuration().set_log_level(level);
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level_filter: LevelFilter) {
    get_log_configuration().set_module_filter(module_path, level_filter);
}

/// Removes a module-specific level filter for the given module path. The global level filter
/// will apply to the module.
pub fn remove_module_filter(module_path: &str) {
    get_log_configuration().remove_module_filter(module_path);
}

/// Sets the level filters for a set of modules. Use this instead of `set_module_filter()` to set
/// filters in bulk.
pub fn set_module_filters(module_filters: &[(&str, LevelFilter)]) {
    get_log_configuration().set_module_filters(module_filters);
}

/// A parsed `--log-level` argument.
#[derive(Debug, PartialEq)]
pub struct LogDirectives {
    pub global: Option<LevelFilter>,
    pub modules: Vec<(String, LevelFilter)>,
}

/// Parses a comma separated list of `level` and `module=level` items. Levels are case
/// insensitive. The last bare level wins.
///
/// # Errors
/// Returns a `GridSpreadError` naming the first item that is not a valid level.
pub fn parse_log_level(directives: &str) -> Result<LogDirectives, GridSpreadError> {
    let mut parsed = LogDirectives {
        global: None,
        modules: Vec::new(),
    };
    for item in directives.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let (module, level) = match item.split_once('=') {
            Some((module, level)) => (Some(module.trim()), level.trim()),
            None => (None, item),
        };
        let level = LevelFilter::from_str(level)
            .map_err(|_| GridSpreadError::from(format!("invalid log level: {item}")))?;
        match module {
            Some(module) => parsed.modules.push((module.to_string(), level)),
            None => parsed.global = Some(level),
        }
    }
    Ok(parsed)
}

/// Installs a parsed `--log-level` argument. Module filters without a global level enable
/// `error` messages everywhere else.
pub fn apply_log_directives(directives: &LogDirectives) {
    let filters: Vec<(&str, LevelFilter)> = directives
        .modules
        .iter()
        .map(|(module, level)| (module.as_str(), *level))
        .collect();
    let mut log_configuration = get_log_configuration();
    log_configuration.set_module_filters(&filters);
    let global = directives.global.unwrap_or(if filters.is_empty() {
        DEFAULT_LOG_LEVEL
    } else {
        LevelFilter::Error
    });
    log_configuration.set_log_level(global);
}

/// Fetches a mutable reference to the global `LogConfiguration`.
fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}
