use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::underwriting::RuleTable;

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
    pub pipeline: PipelineConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pipeline: PipelineConfig::from_env()?,
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

/// Batch pipeline settings: how many synthetic applicants to fabricate, where the
/// output tables and the rejection audit log land, and which rule table scores them.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub record_count: usize,
    pub output_dir: PathBuf,
    pub audit_log: Option<PathBuf>,
    pub rule_table: RuleTable,
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            record_count: 1000,
            output_dir: PathBuf::from("output"),
            audit_log: Some(PathBuf::from("risk_engine.log")),
            rule_table: RuleTable::default(),
            seed: None,
        }
    }
}

impl PipelineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("RISK_RECORD_COUNT") {
            config.record_count = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidRecordCount { value: raw.clone() })?;
        }

        if let Ok(raw) = env::var("RISK_OUTPUT_DIR") {
            if !raw.trim().is_empty() {
                config.output_dir = PathBuf::from(raw.trim());
            }
        }

        // An empty value switches the file audit log off.
        if let Ok(raw) = env::var("RISK_AUDIT_LOG") {
            config.audit_log = match raw.trim() {
                "" => None,
                path => Some(PathBuf::from(path)),
            };
        }

        if let Ok(raw) = env::var("RISK_RULE_TABLE") {
            config.rule_table = raw
                .parse::<RuleTable>()
                .map_err(|_| ConfigError::InvalidRuleTable { value: raw.clone() })?;
        }

        if let Ok(raw) = env::var("RISK_SEED") {
            let seed = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed { value: raw.clone() })?;
            config.seed = Some(seed);
        }

        Ok(config)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRecordCount { value: String },
    InvalidRuleTable { value: String },
    InvalidSeed { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRecordCount { value } => {
                write!(f, "RISK_RECORD_COUNT must be a non-negative integer, got '{value}'")
            }
            ConfigError::InvalidRuleTable { value } => {
                write!(f, "RISK_RULE_TABLE must be 'base' or 'extended', got '{value}'")
            }
            ConfigError::InvalidSeed { value } => {
                write!(f, "RISK_SEED must be a valid u64, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidRecordCount { .. }
            | ConfigError::InvalidRuleTable { .. }
            | ConfigError::InvalidSeed { .. } => None,
        }
    }
}
