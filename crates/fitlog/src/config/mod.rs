use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::NaiveDate;

use crate::submissions::CampaignWindow;

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
///
/// Campaign dates are mandatory: the bot cannot decide date eligibility
/// without them. Store and gateway credentials are optional at load time
/// so the demo and the test suite run without secrets; `serve` checks
/// for them explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub campaign: CampaignConfig,
    pub media: MediaConfig,
    pub store: Option<StoreConfig>,
    pub gateway: Option<GatewayConfig>,
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

        let campaign = CampaignConfig::from_env()?;
        let media = MediaConfig::from_env();
        let store = StoreConfig::from_env();
        let gateway = GatewayConfig::from_env();

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            campaign,
            media,
            store,
            gateway,
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

/// The campaign rules every date check runs against.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rolling_days: u32,
    pub utc_offset_hours: i32,
}

impl CampaignConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let start_date = required_date("CAMPAIGN_START_DATE")?;
        let end_date = required_date("CAMPAIGN_END_DATE")?;
        if end_date < start_date {
            return Err(ConfigError::WindowInverted {
                start: start_date,
                end: end_date,
            });
        }

        let rolling_days = env::var("CAMPAIGN_ROLLING_DAYS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "CAMPAIGN_ROLLING_DAYS",
            })?;

        let utc_offset_hours = env::var("CAMPAIGN_UTC_OFFSET_HOURS")
            .unwrap_or_else(|_| "8".to_string())
            .parse::<i32>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "CAMPAIGN_UTC_OFFSET_HOURS",
            })?;
        if !(-23..=23).contains(&utc_offset_hours) {
            return Err(ConfigError::InvalidNumber {
                var: "CAMPAIGN_UTC_OFFSET_HOURS",
            });
        }

        Ok(Self {
            start_date,
            end_date,
            rolling_days,
            utc_offset_hours,
        })
    }

    pub fn window(&self) -> CampaignWindow {
        CampaignWindow {
            start: self.start_date,
            end: self.end_date,
            rolling_days: self.rolling_days,
        }
    }
}

/// Image proxying and the exempt-file allow-list.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub private_host: String,
    pub proxy_host: Option<String>,
    pub exempt_file_ids: Vec<String>,
}

impl MediaConfig {
    fn from_env() -> Self {
        let private_host =
            env::var("MEDIA_PRIVATE_HOST").unwrap_or_else(|_| "files.slack.com".to_string());
        let proxy_host = env::var("MEDIA_PROXY_HOST")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let exempt_file_ids = env::var("MEDIA_EXEMPT_FILE_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            private_host,
            proxy_host,
            exempt_file_ids,
        }
    }
}

/// Credentials for the external tabular record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub api_key: String,
    pub base: String,
    pub table: String,
}

impl StoreConfig {
    fn from_env() -> Option<Self> {
        let api_key = env::var("STORE_API_KEY").ok()?;
        let base = env::var("STORE_BASE").ok()?;
        let table = env::var("STORE_TABLE").ok()?;
        Some(Self {
            api_key,
            base,
            table,
        })
    }
}

/// Credentials for the chat platform web API.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bot_token: String,
}

impl GatewayConfig {
    fn from_env() -> Option<Self> {
        let bot_token = env::var("GATEWAY_BOT_TOKEN").ok()?;
        Some(Self { bot_token })
    }
}

fn required_date(var: &'static str) -> Result<NaiveDate, ConfigError> {
    let raw = env::var(var).map_err(|_| ConfigError::MissingVar { var })?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate { var })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingVar { var: &'static str },
    InvalidDate { var: &'static str },
    InvalidNumber { var: &'static str },
    WindowInverted { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingVar { var } => write!(f, "{var} must be set"),
            ConfigError::InvalidDate { var } => {
                write!(f, "{var} must be a YYYY-MM-DD calendar date")
            }
            ConfigError::InvalidNumber { var } => write!(f, "{var} must be a valid number"),
            ConfigError::WindowInverted { start, end } => {
                write!(f, "campaign window ends ({end}) before it starts ({start})")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
