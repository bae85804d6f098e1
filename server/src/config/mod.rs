use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Templates live in PostgreSQL when set, in memory otherwise.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub seed_demo_templates: bool,
    /// `RUST_ENV=production`; enables HSTS.
    pub production: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            seed_demo_templates: true,
            production: false,
            cors_allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
        }
    }
}

impl Config {
    /// Reads configuration from the process environment. Call `dotenvy::dotenv`
    /// first to pick up a `.env` file.
    ///
    /// ## Errors
    /// Returns an error when a numeric, boolean or address variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host: IpAddr = parse_or(get("HOST"), "HOST", defaults.bind_addr.ip())?;
        let port: u16 = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let database_max_connections = parse_or(
            get("DATABASE_MAX_CONNECTIONS"),
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
        )?;
        let seed_demo_templates =
            parse_or(get("SEED_DEMO_TEMPLATES"), "SEED_DEMO_TEMPLATES", true)?;

        let production = get("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|origins| split_origins(&origins))
            .unwrap_or(defaults.cors_allowed_origins);

        Ok(Self {
            database_url: get("DATABASE_URL"),
            database_max_connections,
            bind_addr: SocketAddr::new(host, port),
            seed_demo_templates,
            production,
            cors_allowed_origins,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

fn split_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
