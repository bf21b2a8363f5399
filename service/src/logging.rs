use crate::config::Config;
use log::{error, LevelFilter, SetLoggerError};
use simplelog::{self, ConfigBuilder};

/// Dependencies whose logs are dropped unless running at Trace level.
/// hyper and h2 in particular log every connection and frame.
const FILTERED_MODULES: &[&str] = &["tower", "tracing", "hyper", "h2", "axum"];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger at the level configured in `Config`.
    ///
    /// Fails only if a global logger has already been installed.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let level = config.log_level_filter;
        let log_config = Self::build_log_config(Self::should_filter_dependencies(level));

        simplelog::TermLogger::init(
            level,
            log_config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }

    /// Reports an error the process is about to exit on. The line also goes to
    /// stderr when no logger would show it (logging is OFF or never started).
    pub fn fatal(message: &str) {
        error!("{message}");
        if Self::needs_stderr_fallback(log::max_level()) {
            eprintln!("{message}");
        }
    }

    fn needs_stderr_fallback(max_level: LevelFilter) -> bool {
        max_level < LevelFilter::Error
    }

    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_modules_cover_the_http_stack() {
        for module in ["hyper", "h2", "axum", "tower"] {
            assert!(
                FILTERED_MODULES.contains(&module),
                "{module} should be filtered"
            );
        }
    }

    #[test]
    fn test_own_crates_are_never_filtered() {
        for module in ["sse", "web", "service", "sse_clock"] {
            assert!(
                !FILTERED_MODULES.contains(&module),
                "{module} must not be filtered"
            );
        }
    }

    #[test]
    fn test_trace_level_disables_filtering() {
        assert!(!Logger::should_filter_dependencies(LevelFilter::Trace));
    }

    #[test]
    fn test_other_levels_enable_filtering() {
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            assert!(
                Logger::should_filter_dependencies(level),
                "{level} should enable filtering"
            );
        }
    }

    #[test]
    fn test_fatal_falls_back_to_stderr_only_without_a_logger() {
        // log::max_level() stays Off until a logger is installed
        assert!(Logger::needs_stderr_fallback(LevelFilter::Off));
        for level in [
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
            LevelFilter::Trace,
        ] {
            assert!(
                !Logger::needs_stderr_fallback(level),
                "{level} already shows error lines"
            );
        }
    }

    #[test]
    fn test_fatal_without_a_logger_does_not_panic() {
        Logger::fatal("Failed to start server on 0.0.0.0:8080: address in use");
    }

    #[test]
    fn test_build_log_config_does_not_panic() {
        let _filtered = Logger::build_log_config(true);
        let _unfiltered = Logger::build_log_config(false);
    }
}
