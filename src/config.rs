use std::env;
use std::net::{IpAddr, SocketAddr};

use chrono::{DateTime, Duration, Utc};

use crate::session::{Caller, Role, SessionPersistence, TokenRegistry};
use crate::store::UserId;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration, built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub sessions: SessionConfig,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment =
            AppEnvironment::parse(&lookup("FIN360_ENV").unwrap_or_else(|| "development".into()));

        let host = lookup("FIN360_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("FIN360_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            None => 5000,
        };

        let log_level = lookup("FIN360_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let session_ttl_minutes = parse_number(&lookup, "FIN360_SESSION_TTL_MINUTES", 720)?;
        let remember_ttl_days = parse_number(&lookup, "FIN360_REMEMBER_TTL_DAYS", 30)?;
        let tokens = match lookup("FIN360_API_TOKENS") {
            Some(raw) => parse_tokens(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            sessions: SessionConfig {
                session_ttl_minutes,
                remember_ttl_days,
                tokens,
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

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub session_ttl_minutes: u32,
    pub remember_ttl_days: u32,
    pub tokens: Vec<TokenSpec>,
}

impl SessionConfig {
    pub fn registry(&self, issued_at: DateTime<Utc>) -> TokenRegistry {
        let mut registry = TokenRegistry::new(
            Duration::minutes(i64::from(self.session_ttl_minutes)),
            Duration::days(i64::from(self.remember_ttl_days)),
        );
        for spec in &self.tokens {
            registry.grant(
                spec.token.clone(),
                Caller {
                    user_id: spec.user_id.clone(),
                    role: spec.role,
                },
                spec.persistence,
                issued_at,
            );
        }
        registry
    }
}

/// One `token=user:role:persistence` entry from `FIN360_API_TOKENS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    pub token: String,
    pub user_id: UserId,
    pub role: Role,
    pub persistence: SessionPersistence,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("FIN360_PORT must be a valid u16")]
    InvalidPort,
    #[error("FIN360_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },
    #[error("{key} must be a non-negative integer")]
    InvalidNumber { key: &'static str },
    #[error("invalid FIN360_API_TOKENS entry '{entry}': expected token=user:role:remember|session")]
    InvalidToken { entry: String },
}

fn parse_number<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        None => Ok(default),
    }
}

fn parse_tokens(raw: &str) -> Result<Vec<TokenSpec>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_token_entry)
        .collect()
}

fn parse_token_entry(entry: &str) -> Result<TokenSpec, ConfigError> {
    let invalid = || ConfigError::InvalidToken {
        entry: entry.to_string(),
    };

    let (token, grant) = entry.split_once('=').ok_or_else(invalid)?;
    let mut parts = grant.split(':');
    let (Some(user), Some(role), Some(persistence), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let role = match role.trim().to_ascii_lowercase().as_str() {
        "user" => Role::User,
        "admin" => Role::Admin,
        _ => return Err(invalid()),
    };
    let persistence = match persistence.trim().to_ascii_lowercase().as_str() {
        "remember" => SessionPersistence::Remember,
        "session" | "session-only" => SessionPersistence::SessionOnly,
        _ => return Err(invalid()),
    };

    let token = token.trim();
    let user = user.trim();
    if token.is_empty() || user.is_empty() {
        return Err(invalid());
    }

    Ok(TokenSpec {
        token: token.to_string(),
        user_id: UserId(user.to_string()),
        role,
        persistence,
    })
}
