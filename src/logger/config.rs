/// Process-wide logger configuration
///
/// Built once from command-line flags by [`init_from_args`]; library code only
/// reads it through the filtering in `core`.
use std::collections::HashSet;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Messages above this level are dropped (Debug/Verbose have extra gates)
    pub min_level: LogLevel,
    /// Tags with `--debug-<tag>` enabled
    pub debug_tags: HashSet<String>,
    /// Tags with `--verbose-<tag>` enabled
    pub verbose_tags: HashSet<String>,
    pub colors: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            colors: true,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    match LOGGER_CONFIG.read() {
        Ok(cfg) => cfg.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub fn set_logger_config(config: LoggerConfig) {
    match LOGGER_CONFIG.write() {
        Ok(mut cfg) => *cfg = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

pub fn update_logger_config<F>(update: F)
where
    F: FnOnce(&mut LoggerConfig),
{
    let mut config = get_logger_config();
    update(&mut config);
    set_logger_config(config);
}

/// Derive the logger configuration from the command line
///
/// Recognised flags: `--quiet`, `--verbose`, `--no-color`, `--debug-<tag>`,
/// `--verbose-<tag>` and `--debug-all`.
pub fn init_from_args() {
    let args = arguments::get_cmd_args();
    set_logger_config(config_from_args(&args));
}

pub(crate) fn config_from_args(args: &[String]) -> LoggerConfig {
    let mut config = LoggerConfig::default();

    for arg in args {
        match arg.as_str() {
            "--quiet" => config.min_level = LogLevel::Error,
            "--verbose" => config.min_level = LogLevel::Verbose,
            "--no-color" => config.colors = false,
            "--debug-all" => {
                for tag in LogTag::all() {
                    config.debug_tags.insert(tag.to_debug_key());
                }
            }
            other => {
                if let Some(key) = other.strip_prefix("--debug-") {
                    config.debug_tags.insert(key.to_lowercase());
                } else if let Some(key) = other.strip_prefix("--verbose-") {
                    config.verbose_tags.insert(key.to_lowercase());
                }
            }
        }
    }

    // Debug output needs the threshold lowered, otherwise it is filtered first
    if !config.debug_tags.is_empty() && config.min_level < LogLevel::Debug {
        config.min_level = LogLevel::Debug;
    }

    config
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = get_logger_config();
    config.debug_tags.contains(&tag.to_debug_key())
        || config.verbose_tags.contains(&tag.to_debug_key())
}

pub fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    get_logger_config()
        .verbose_tags
        .contains(&tag.to_debug_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_debug_flag_enables_tag_and_lowers_threshold() {
        let config = config_from_args(&args(&["bin", "--debug-candles"]));
        assert!(config.debug_tags.contains("candles"));
        assert_eq!(config.min_level, LogLevel::Debug);
    }

    #[test]
    fn test_debug_flag_leaves_other_tags_quiet() {
        let config = config_from_args(&args(&["bin", "--debug-candles"]));
        for tag in LogTag::all() {
            let enabled = config.debug_tags.contains(&tag.to_debug_key());
            assert_eq!(enabled, tag == LogTag::Candles, "{:?}", tag);
        }
    }

    #[test]
    fn test_quiet_keeps_errors_only() {
        let config = config_from_args(&args(&["bin", "--quiet"]));
        assert_eq!(config.min_level, LogLevel::Error);
        assert!(config.debug_tags.is_empty());
    }

    #[test]
    fn test_debug_all_covers_every_tag() {
        let config = config_from_args(&args(&["bin", "--debug-all"]));
        for tag in LogTag::all() {
            assert!(config.debug_tags.contains(&tag.to_debug_key()));
        }
    }
}
