use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::cities::CityAliases;

const DEFAULT_FROM_ADDRESS: &str = "info@time4education.com";
const DEFAULT_BACK_OFFICE_ADDRESS: &str = "enquiries@time4education.com";
const DEFAULT_SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

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
    pub notifications: NotificationConfig,
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

        let notifications = NotificationConfig {
            from_address: env::var("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            back_office_address: env::var("MAIL_TO_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BACK_OFFICE_ADDRESS.to_string()),
            sendgrid_api_key: env::var("SENDGRID_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            sendgrid_api_url: env::var("SENDGRID_API_URL")
                .unwrap_or_else(|_| DEFAULT_SENDGRID_URL.to_string()),
        };

        let city_aliases = match env::var("ENQUIRY_CITY_ALIASES") {
            Ok(raw) => parse_city_aliases(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            notifications,
            intake: IntakeConfig { city_aliases },
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Coloured output; only wanted on a developer terminal.
    pub ansi: bool,
}

/// Outbound e-mail settings for enquiry notifications.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub from_address: String,
    pub back_office_address: String,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_api_url: String,
}

/// Intake tuning. Extra city aliases are merged over the built-in table.
#[derive(Debug, Clone, Default)]
pub struct IntakeConfig {
    pub city_aliases: Vec<(String, String)>,
}

impl IntakeConfig {
    pub fn city_aliases(&self) -> CityAliases {
        self.city_aliases
            .iter()
            .fold(CityAliases::builtin(), |table, (alias, canonical)| {
                table.with_alias(alias, canonical)
            })
    }
}

/// Parses `alias=canonical` pairs separated by commas.
pub fn parse_city_aliases(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((alias, canonical))
                if !alias.trim().is_empty() && !canonical.trim().is_empty() =>
            {
                Ok((alias.trim().to_string(), canonical.trim().to_string()))
            }
            _ => Err(ConfigError::InvalidCityAlias {
                entry: entry.to_string(),
            }),
        })
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCityAlias { entry: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCityAlias { entry } => write!(
                f,
                "ENQUIRY_CITY_ALIASES entry '{}' must look like alias=canonical",
                entry
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidCityAlias { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
