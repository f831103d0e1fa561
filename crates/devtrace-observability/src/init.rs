// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console logging is always available. With the `file-logging` feature, [`init_logging`]
//! also writes JSON logs into a timestamped run folder and prunes old runs.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

/// Filter combining the base level with per-crate debug flags
pub fn build_env_filter(config: &LoggingConfig, flags: &CrateDebugFlags) -> Result<EnvFilter> {
    let directives = flags.to_filter_string(&config.level.to_lowercase());
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter directives: {}", directives))
}

fn console_layer(config: &LoggingConfig) -> Box<dyn Layer<Registry> + Send + Sync + 'static> {
    match config.format {
        LogFormat::Full => tracing_subscriber::fmt::layer()
            .with_target(config.with_target)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(config.with_target)
            .boxed(),
    }
}

/// Install a console-only global subscriber
///
/// # Errors
///
/// Fails on bad filter directives or when a global subscriber is already installed.
pub fn init_console_logging(config: &LoggingConfig, flags: &CrateDebugFlags) -> Result<()> {
    let filter = build_env_filter(config, flags)?;
    Registry::default()
        .with(console_layer(config).with_filter(filter))
        .try_init()
        .context("Failed to install global tracing subscriber")
}

#[cfg(feature = "file-logging")]
pub use file::{init_logging, LoggingGuard};

#[cfg(feature = "file-logging")]
mod file {
    use super::*;
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use std::path::{Path, PathBuf};
    use tracing_appender::rolling;

    const RUN_PREFIX: &str = "run_";
    const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Keeps the non-blocking writers alive; logs are flushed on drop
    pub struct LoggingGuard {
        _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
        log_dir: PathBuf,
    }

    impl LoggingGuard {
        /// Run folder for this process
        pub fn log_dir(&self) -> &Path {
            &self.log_dir
        }
    }

    /// Console output plus file output under `log_dir/run_<timestamp>/`
    ///
    /// ```text
    /// ./logs/
    ///   └── run_20250101_120000/
    ///       ├── devtrace-context.log
    ///       ├── devtrace-config.log
    ///       └── devtrace.log (combined)
    /// ```
    pub fn init_logging(config: &LoggingConfig, flags: &CrateDebugFlags) -> Result<LoggingGuard> {
        let timestamp = Utc::now().format(RUN_TIMESTAMP_FORMAT);
        let run_folder = config.log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
        std::fs::create_dir_all(&run_folder).with_context(|| {
            format!("Failed to create log directory: {}", run_folder.display())
        })?;

        cleanup_old_logs(
            &config.log_dir,
            &run_folder,
            config.retention_days,
            config.retention_runs,
        )?;

        let mut layers = vec![console_layer(config)
            .with_filter(build_env_filter(config, flags)?)
            .boxed()];
        let mut file_guards = Vec::new();

        for crate_name in crate::KNOWN_CRATES {
            let appender = rolling::daily(&run_folder, format!("{}.log", crate_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_guards.push(guard);

            let target = crate_name.replace('-', "_");
            let only_this_crate = EnvFilter::try_new(format!("{}=debug", target))
                .with_context(|| format!("Invalid file filter for {}", crate_name))?;
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_filter(only_this_crate)
                    .boxed(),
            );
        }

        let combined = rolling::daily(&run_folder, "devtrace.log");
        let (writer, guard) = tracing_appender::non_blocking(combined);
        file_guards.push(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(build_env_filter(config, flags)?)
                .boxed(),
        );

        Registry::default()
            .with(layers)
            .try_init()
            .context("Failed to install global tracing subscriber")?;

        Ok(LoggingGuard {
            _file_guards: file_guards,
            log_dir: run_folder,
        })
    }

    fn run_started_at(path: &Path) -> Option<DateTime<Utc>> {
        let name = path.file_name()?.to_str()?;
        let stamp = name.strip_prefix(RUN_PREFIX)?;
        let naive = NaiveDateTime::parse_from_str(stamp, RUN_TIMESTAMP_FORMAT).ok()?;
        Some(Utc.from_utc_datetime(&naive))
    }

    /// Remove run folders past `retention_days`, then trim to the newest `retention_runs`
    ///
    /// `current_run` is never removed.
    pub(crate) fn cleanup_old_logs(
        base_log_dir: &Path,
        current_run: &Path,
        retention_days: u64,
        retention_runs: usize,
    ) -> Result<()> {
        if !base_log_dir.exists() {
            return Ok(());
        }

        let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);

        let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() || path == current_run {
                continue;
            }
            if let Some(started) = run_started_at(&path) {
                runs.push((path, started));
            }
        }

        // newest first
        runs.sort_by(|a, b| b.1.cmp(&a.1));

        // the current run occupies one retained slot
        let keep = retention_runs.saturating_sub(1);
        for (index, (path, started)) in runs.iter().enumerate() {
            if *started < cutoff || index >= keep {
                if let Err(e) = std::fs::remove_dir_all(path) {
                    eprintln!(
                        "Warning: Failed to remove old log directory {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }

        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use tempfile::tempdir;

        fn run_dir(base: &Path, started: DateTime<Utc>) -> PathBuf {
            let path = base.join(format!(
                "{}{}",
                RUN_PREFIX,
                started.format(RUN_TIMESTAMP_FORMAT)
            ));
            std::fs::create_dir_all(&path).unwrap();
            path
        }

        #[test]
        fn test_run_folder_name_parses() {
            let stamp = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
            let path = PathBuf::from("logs/run_20250101_120000");
            assert_eq!(run_started_at(&path), Some(stamp));
            assert_eq!(run_started_at(Path::new("logs/other")), None);
        }

        #[test]
        fn test_cleanup_applies_age_and_count() {
            let base = tempdir().unwrap();
            let now = Utc::now();
            let current = run_dir(base.path(), now);
            let ancient = run_dir(base.path(), now - chrono::Duration::days(90));
            let recent: Vec<_> = (1..=4)
                .map(|h| run_dir(base.path(), now - chrono::Duration::hours(h)))
                .collect();
            let unrelated = base.path().join("notes");
            std::fs::create_dir_all(&unrelated).unwrap();

            cleanup_old_logs(base.path(), &current, 30, 3).unwrap();

            assert!(current.exists());
            assert!(!ancient.exists());
            assert!(recent[0].exists());
            assert!(recent[1].exists());
            assert!(!recent[2].exists());
            assert!(!recent[3].exists());
            assert!(unrelated.exists());
        }
    }
}
