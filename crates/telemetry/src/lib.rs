//! Tracing/logging bootstrap.

use anyhow::Context;
use bookinfo_kernel::settings::{FileLogSettings, LogFormat, LogRotation, TelemetrySettings};
use tracing::Subscriber;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the background file writer running. Hold it until shutdown; dropping
/// it flushes buffered lines.
#[must_use = "dropping the guard stops the log file writer"]
pub struct TelemetryGuard {
    installed: bool,
    _file_writer: Option<WorkerGuard>,
}

impl TelemetryGuard {
    /// Whether this call installed the global subscriber.
    pub fn installed(&self) -> bool {
        self.installed
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `settings.log_level`. Safe to call more than once;
/// later calls leave the first subscriber in place.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<TelemetryGuard> {
    let (subscriber, file_writer) = subscriber(settings)?;
    let installed = subscriber.try_init().is_ok();

    if installed {
        tracing::info!(
            target: "bookinfo-telemetry",
            format = ?settings.log_format,
            level = %settings.log_level,
            file = settings.file.enabled,
            "logging initialized"
        );
    }

    Ok(TelemetryGuard {
        installed,
        _file_writer: file_writer,
    })
}

/// Build the subscriber without installing it: stdout in the configured
/// format, plus a plain-text rolling file when enabled.
pub fn subscriber(
    settings: &TelemetrySettings,
) -> anyhow::Result<(impl Subscriber + Send + Sync + 'static, Option<WorkerGuard>)> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    let stdout = match settings.log_format {
        LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
        LogFormat::Pretty => fmt::layer().with_target(true).boxed(),
    };

    let (file, guard) = match file_appender(&settings.file)? {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file);

    Ok((subscriber, guard))
}

fn file_appender(settings: &FileLogSettings) -> anyhow::Result<Option<RollingFileAppender>> {
    if !settings.enabled {
        return Ok(None);
    }

    std::fs::create_dir_all(&settings.directory).with_context(|| {
        format!(
            "failed to create log directory {}",
            settings.directory.display()
        )
    })?;

    let rotation = match settings.rotation {
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    };

    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(settings.prefix.clone())
        .filename_suffix("txt")
        .max_log_files(settings.max_files.max(1))
        .build(&settings.directory)
        .with_context(|| {
            format!(
                "failed to open log file in {}",
                settings.directory.display()
            )
        })?;

    Ok(Some(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_noop() {
        let settings = TelemetrySettings::default();
        let _first = init(&settings).unwrap();
        assert!(!init(&settings).unwrap().installed());
    }

    #[test]
    fn file_sink_receives_log_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = TelemetrySettings::default();
        settings.file = FileLogSettings {
            enabled: true,
            directory: dir.path().join("logs"),
            prefix: "bookinfo".to_string(),
            rotation: LogRotation::Never,
            max_files: 3,
        };

        let (subscriber, guard) = subscriber(&settings).unwrap();
        assert!(guard.is_some());

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(title = "Dune", "book shelved twice");
        });
        drop(guard);

        let contents: String = std::fs::read_dir(dir.path().join("logs"))
            .unwrap()
            .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
            .collect();
        assert!(contents.contains("book shelved twice"));
        assert!(contents.contains("Dune"));
    }

    #[test]
    fn disabled_file_sink_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = TelemetrySettings::default();
        settings.file.directory = dir.path().join("logs");

        let (_subscriber, guard) = subscriber(&settings).unwrap();
        assert!(guard.is_none());
        assert!(!dir.path().join("logs").exists());
    }
}
