use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.pmo-analytics/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.pmo-analytics/`
/// - `~/.pmo-analytics/logs/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let app_dir = home.join(".pmo-analytics");
    std::fs::create_dir_all(&app_dir)?;
    std::fs::create_dir_all(app_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised. All output
/// goes to stderr so it never interleaves with report/summary output.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Data-dir discovery ─────────────────────────────────────────────────────────

/// Resolve the directory holding the CSV tables.
///
/// An explicit `--data-dir` wins. Otherwise `./data` is used when it exists,
/// falling back to the current directory (the layout the original export
/// scripts wrote into).
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    let local_data = PathBuf::from("data");
    if local_data.is_dir() {
        return local_data;
    }
    PathBuf::from(".")
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");

        // Override HOME so that dirs::home_dir() resolves to our temp dir.
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let result = ensure_directories();

        // Restore HOME.
        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        result.expect("ensure_directories should succeed");

        let app_dir = tmp.path().join(".pmo-analytics");
        assert!(app_dir.is_dir(), ".pmo-analytics dir must exist");
        assert!(app_dir.join("logs").is_dir(), "logs subdir must exist");
    }

    #[test]
    fn test_resolve_data_dir_explicit_wins() {
        let dir = resolve_data_dir(Some(Path::new("/exports/q3")));
        assert_eq!(dir, PathBuf::from("/exports/q3"));
    }

    #[test]
    fn test_resolve_data_dir_defaults_to_cwd_family() {
        // Without an explicit dir the result is either ./data or ".",
        // depending on the working directory this test runs in.
        let dir = resolve_data_dir(None);
        assert!(dir == PathBuf::from("data") || dir == PathBuf::from("."));
    }
}
