use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKINFO_ENV";
const CONFIG_DIR_ENV: &str = "BOOKINFO_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKINFO";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    fn parse(name: &str) -> anyhow::Result<Self> {
        match name {
            "local" => Ok(Self::Local),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub api: ApiSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay and
    /// `BOOKINFO_*` variables (`__` separates nested keys).
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        Self::load_from(&config_dir, &environment)
    }

    /// Load configuration from an explicit directory and environment name.
    pub fn load_from(config_dir: &std::path::Path, environment: &str) -> anyhow::Result<Self> {
        let parsed_environment = Environment::parse(environment)?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;
        settings.api.validate()?;

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_url")]
    pub url: String,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    fn default_url() -> String {
        "sqlite://bookinfo.db?mode=rwc".to_string()
    }

    fn default_max_connections() -> u32 {
        8
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "TelemetrySettings::default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Rolling log file written next to stdout
    #[serde(default)]
    pub file: FileLogSettings,
}

impl TelemetrySettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            log_format: LogFormat::Pretty,
            file: FileLogSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Rolling file sink for logs; off unless `enabled`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileLogSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "FileLogSettings::default_directory")]
    pub directory: PathBuf,
    #[serde(default = "FileLogSettings::default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub rotation: LogRotation,
    /// Oldest files beyond this count are deleted on rollover
    #[serde(default = "FileLogSettings::default_max_files")]
    pub max_files: usize,
}

impl FileLogSettings {
    fn default_directory() -> PathBuf {
        PathBuf::from("logs")
    }

    fn default_prefix() -> String {
        "log".to_string()
    }

    fn default_max_files() -> usize {
        24
    }
}

impl Default for FileLogSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: Self::default_directory(),
            prefix: Self::default_prefix(),
            rotation: LogRotation::default(),
            max_files: Self::default_max_files(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

/// API surface settings: which versions are served and how the document is titled.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "ApiSettings::default_versions")]
    pub versions: Vec<u32>,
    #[serde(default = "ApiSettings::default_title")]
    pub title: String,
}

impl ApiSettings {
    fn default_versions() -> Vec<u32> {
        vec![1, 2]
    }

    fn default_title() -> String {
        "Book Information API".to_string()
    }

    fn validate(&mut self) -> anyhow::Result<()> {
        self.versions.sort_unstable();
        self.versions.dedup();
        if self.versions.is_empty() {
            return Err(anyhow!("api.versions must list at least one version"));
        }
        if self.versions.contains(&0) {
            return Err(anyhow!("api.versions must be positive integers"));
        }
        Ok(())
    }

    /// Value of the `api-supported-versions` response header.
    pub fn supported_versions_header(&self) -> String {
        self.versions
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            versions: Self::default_versions(),
            title: Self::default_title(),
        }
    }
}
