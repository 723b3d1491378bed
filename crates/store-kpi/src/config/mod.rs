use crate::scoring::rules::DEFAULT_DAYS_PER_PERIOD;
use crate::scoring::{OverallScorePolicy, DEFAULT_LOOKBACK_MONTHS, NEUTRAL_COMPLAINT_WEIGHT};
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
    pub scoring: ScoringSettings,
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
        let format = match environment {
            AppEnvironment::Production => LogFormat::Full,
            AppEnvironment::Development | AppEnvironment::Test => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            scoring: ScoringSettings::from_env()?,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Run-wide scoring knobs. Table files are read by the binary, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringSettings {
    pub default_complaint_weight: f64,
    pub days_per_period: u32,
    pub overall_policy: OverallScorePolicy,
    pub weights_csv: Option<PathBuf>,
    pub sanction_policy_csv: Option<PathBuf>,
    pub sanction_lookback_months: u32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            default_complaint_weight: NEUTRAL_COMPLAINT_WEIGHT,
            days_per_period: DEFAULT_DAYS_PER_PERIOD,
            overall_policy: OverallScorePolicy::Average,
            weights_csv: None,
            sanction_policy_csv: None,
            sanction_lookback_months: DEFAULT_LOOKBACK_MONTHS,
        }
    }
}

impl ScoringSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let default_complaint_weight = match env::var("KPI_DEFAULT_COMPLAINT_WEIGHT") {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|weight| weight.is_finite() && *weight >= 0.0)
                .ok_or(ConfigError::InvalidNumber {
                    key: "KPI_DEFAULT_COMPLAINT_WEIGHT",
                    value: raw,
                })?,
            Err(_) => defaults.default_complaint_weight,
        };

        let days_per_period = parse_positive("KPI_DAYS_PER_PERIOD", defaults.days_per_period)?;
        let sanction_lookback_months = parse_positive(
            "KPI_SANCTION_LOOKBACK_MONTHS",
            defaults.sanction_lookback_months,
        )?;

        let overall_policy = match env::var("KPI_OVERALL_POLICY") {
            Ok(raw) => raw
                .parse::<OverallScorePolicy>()
                .map_err(|_| ConfigError::InvalidOverallPolicy(raw))?,
            Err(_) => defaults.overall_policy,
        };

        Ok(Self {
            default_complaint_weight,
            days_per_period,
            overall_policy,
            weights_csv: optional_path("KPI_WEIGHTS_CSV"),
            sanction_policy_csv: optional_path("KPI_SANCTION_POLICY_CSV"),
            sanction_lookback_months,
        })
    }
}

fn parse_positive(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn optional_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidOverallPolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} has invalid value '{value}'")
            }
            ConfigError::InvalidOverallPolicy(value) => write!(
                f,
                "KPI_OVERALL_POLICY must be 'average' or 'weighted:<sales>,<opex>,<complaint_rate>' (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidOverallPolicy(_) => None,
        }
    }
}
