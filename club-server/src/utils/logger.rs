//! Logging Infrastructure
//!
//! `RUST_LOG` wins when set; otherwise the level from config applies to this
//! crate and `tower_http`.

use std::path::Path;

use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::EnvFilter;

/// Rolling log file prefix
const LOG_FILE_PREFIX: &str = "club-server";

/// Initialize the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    let result = match (json, log_dir.and_then(file_appender)) {
        (true, Some(appender)) => builder.json().with_writer(appender).try_init(),
        (true, None) => builder.json().try_init(),
        (false, Some(appender)) => builder.with_ansi(false).with_writer(appender).try_init(),
        (false, None) => builder.try_init(),
    };
    if result.is_err() {
        tracing::debug!("Logger already initialized");
    }
}

fn default_directives(log_level: Option<&str>) -> String {
    let level = log_level.unwrap_or("info");
    format!("club_server={level},tower_http={level},security={level}")
}

/// Daily rolling file in `dir`, created when missing
fn file_appender(dir: &str) -> Option<RollingFileAppender> {
    let path = Path::new(dir);
    if let Err(e) = std::fs::create_dir_all(path) {
        eprintln!("Cannot create log directory {}: {}", dir, e);
        return None;
    }
    Some(tracing_appender::rolling::daily(path, LOG_FILE_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives(None),
            "club_server=info,tower_http=info,security=info"
        );
        assert_eq!(
            default_directives(Some("debug")),
            "club_server=debug,tower_http=debug,security=debug"
        );
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let dir = std::env::temp_dir().join(format!("club-logs-{}", uuid::Uuid::new_v4()));
        let dir_str = dir.to_str().unwrap().to_string();
        assert!(file_appender(&dir_str).is_some());
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(dir);
    }
}
