//! Logging utilities and structured logging support
//!
//! Library code only uses the `log` macros; the binary installs `env_logger` with the
//! level named in its configuration.

pub use log::{debug, error, info, trace, warn};

/// Parse a level name such as `"debug"` into a filter
pub fn parse_level(level: &str) -> log::LevelFilter {
    level.trim().parse().unwrap_or(log::LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_names() {
        assert_eq!(parse_level("debug"), log::LevelFilter::Debug);
        assert_eq!(parse_level(" TRACE "), log::LevelFilter::Trace);
        assert_eq!(parse_level("off"), log::LevelFilter::Off);
    }

    #[test]
    fn test_parse_level_falls_back_to_info() {
        assert_eq!(parse_level("loud"), log::LevelFilter::Info);
    }
}
