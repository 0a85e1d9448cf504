//! Logging utilities for schema_drift
//!
//! This module provides logging setup and configuration.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Parse a configured log level, falling back to INFO
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize logging based on configuration
///
/// Without a logging section only `RUST_LOG` is honoured and output goes to stderr.
pub fn init_logging(config: &Option<LoggingConfig>) -> Result<()> {
    let Some(config) = config else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish();
        return install(subscriber);
    };

    let level = parse_level(&config.level).as_str().to_lowercase();
    let directive: Directive = format!("schema_drift={}", level)
        .parse()
        .map_err(|e| Error::ConfigError(format!("Invalid log level `{}`: {}", config.level, e)))?;
    let env_filter = EnvFilter::from_default_env().add_directive(directive);
    let json = config.format.eq_ignore_ascii_case("json");

    if let Some(file_path) = &config.file {
        if let Some(parent) = Path::new(file_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = Mutex::new(File::create(file_path)?);

        let builder = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(file)
            .with_ansi(false);
        if json {
            install(builder.json().finish())
        } else {
            install(builder.finish())
        }
    } else {
        // stdout carries the report, so logs go to stderr unless asked otherwise
        let builder = fmt::Subscriber::builder().with_env_filter(env_filter);
        match (json, config.stdout) {
            (true, true) => install(builder.json().finish()),
            (true, false) => install(builder.json().with_writer(std::io::stderr).finish()),
            (false, true) => install(builder.finish()),
            (false, false) => install(builder.with_writer(std::io::stderr).finish()),
        }
    }
}

fn install<S>(subscriber: S) -> Result<()>
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::set_global_default(subscriber).map_err(|e| Error::Unknown(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }
}
