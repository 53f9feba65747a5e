//! Logging setup on top of `log4rs`.
//!
//! The library itself only logs through the `log` facade; these helpers are for
//! hosts that want file logging without writing their own config.

use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

const ENCODER_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Target for bench records and `devlog!` lines.
pub const DEV_TARGET: &str = "filterspec::dev";

/// Initializes logging from a YAML config file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid log4rs config.
pub fn init_path(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}

fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

fn rolling_appender(
    base: &Path,
    stem: &str,
    keep: u32,
) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE_BYTES)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(ENCODER_PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))?;
    Ok(appender)
}

/// Builds the rolling-file configuration without installing it.
///
/// - `dir`: base directory for log files, current directory when `None`
/// - `level`: error|warn|info|debug|trace|off
/// - `retention`: number of rolled files kept (default 7)
/// - `enable_dev`: also persist bench records to `dev.log`
///
/// # Errors
/// Returns an error if the directory or an appender cannot be created.
pub fn build_config(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<u32>,
    enable_dev: bool,
) -> Result<Config, Box<dyn std::error::Error>> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    std::fs::create_dir_all(&base)?;
    let keep = retention.unwrap_or(7);
    let lvl = parse_level(level);

    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling_appender(&base, "filterspec", keep)?)));
    if enable_dev {
        builder = builder
            .appender(Appender::builder().build("dev", Box::new(rolling_appender(&base, "dev", keep)?)))
            .logger(Logger::builder().appender("dev").additive(false).build(DEV_TARGET, LevelFilter::Trace));
    } else {
        builder = builder.logger(Logger::builder().additive(false).build(DEV_TARGET, LevelFilter::Off));
    }
    Ok(builder.build(Root::builder().appender("app").build(lvl))?)
}

/// Installs the rolling-file configuration globally.
///
/// # Errors
/// Returns an error if the config cannot be built or a logger is already installed.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<u32>,
    enable_dev: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(dir, level, retention, enable_dev)?;
    log4rs::init_config(config)?;
    Ok(())
}

/// Configure logging from environment variables if present:
/// - FILTERSPEC_LOG_DIR
/// - FILTERSPEC_LOG_LEVEL
/// - FILTERSPEC_LOG_RETENTION
/// - FILTERSPEC_DEVLOG
///
/// # Errors
/// Same as [`configure_logging`].
pub fn configure_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::var("FILTERSPEC_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("FILTERSPEC_LOG_LEVEL").ok();
    let retention =
        std::env::var("FILTERSPEC_LOG_RETENTION").ok().and_then(|s| s.parse::<u32>().ok());
    let dev_enabled = std::env::var("FILTERSPEC_DEVLOG")
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    configure_logging(dir.as_deref(), level.as_deref(), retention, dev_enabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_map_to_filters() {
        assert_eq!(parse_level(Some("WARN")), LevelFilter::Warn);
        assert_eq!(parse_level(Some("trace")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("bogus")), LevelFilter::Info);
        assert_eq!(parse_level(None), LevelFilter::Info);
    }

    #[test]
    fn build_config_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs");
        let cfg = build_config(Some(&nested), Some("debug"), Some(3), true).unwrap();
        assert!(nested.is_dir());
        assert_eq!(cfg.root().level(), LevelFilter::Debug);
        assert!(cfg.loggers().iter().any(|l| l.name() == DEV_TARGET));
    }
}
