use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub intake: IntakeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let snapshot_path = env::var("APP_SNAPSHOT_PATH")
            .unwrap_or_else(|_| IntakeConfig::DEFAULT_SNAPSHOT_PATH.to_string());
        if snapshot_path.trim().is_empty() {
            return Err(ConfigError::EmptySnapshotPath);
        }

        let snapshot_dir = env::var("APP_SNAPSHOT_DIR")
            .unwrap_or_else(|_| IntakeConfig::DEFAULT_SNAPSHOT_DIR.to_string());
        if snapshot_dir.trim().is_empty() {
            return Err(ConfigError::EmptySnapshotDir);
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            intake: IntakeConfig {
                snapshot_path: PathBuf::from(snapshot_path.trim()),
                snapshot_dir: PathBuf::from(snapshot_dir.trim()),
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where completed applicant records are written.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Single file used by the one-session console chat.
    pub snapshot_path: PathBuf,
    /// Directory holding one `<session_id>.json` per HTTP session.
    pub snapshot_dir: PathBuf,
}

impl IntakeConfig {
    pub const DEFAULT_SNAPSHOT_PATH: &'static str = "application_info.json";
    pub const DEFAULT_SNAPSHOT_DIR: &'static str = "application_snapshots";
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(Self::DEFAULT_SNAPSHOT_PATH),
            snapshot_dir: PathBuf::from(Self::DEFAULT_SNAPSHOT_DIR),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    EmptySnapshotPath,
    EmptySnapshotDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::EmptySnapshotPath => {
                write!(f, "APP_SNAPSHOT_PATH must not be blank when set")
            }
            ConfigError::EmptySnapshotDir => {
                write!(f, "APP_SNAPSHOT_DIR must not be blank when set")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::EmptySnapshotPath
            | ConfigError::EmptySnapshotDir => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
