//! Bearer-token identity for the HTTP layer.
//!
//! Each grant records whether the client asked to be remembered; the
//! persistence mode decides how long the grant stays valid.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::store::UserId;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPersistence {
    Remember,
    SessionOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("no token, authorization denied")]
    MissingToken,
    #[error("token is not valid")]
    InvalidToken,
    #[error("session has expired")]
    Expired,
    #[error("admin role required")]
    Forbidden,
}

pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, token: &str, now: DateTime<Utc>) -> Result<Caller, AuthError>;
}

#[derive(Debug, Clone)]
struct Grant {
    caller: Caller,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TokenRegistry {
    session_ttl: Duration,
    remember_ttl: Duration,
    grants: HashMap<String, Grant>,
}

impl TokenRegistry {
    pub fn new(session_ttl: Duration, remember_ttl: Duration) -> Self {
        Self {
            session_ttl,
            remember_ttl,
            grants: HashMap::new(),
        }
    }

    pub fn grant(
        &mut self,
        token: impl Into<String>,
        caller: Caller,
        persistence: SessionPersistence,
        issued_at: DateTime<Utc>,
    ) {
        let ttl = match persistence {
            SessionPersistence::Remember => self.remember_ttl,
            SessionPersistence::SessionOnly => self.session_ttl,
        };
        self.grants.insert(
            token.into(),
            Grant {
                caller,
                expires_at: issued_at + ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl IdentityProvider for TokenRegistry {
    fn authenticate(&self, token: &str, now: DateTime<Utc>) -> Result<Caller, AuthError> {
        let grant = self.grants.get(token).ok_or(AuthError::InvalidToken)?;
        if now >= grant.expires_at {
            return Err(AuthError::Expired);
        }
        Ok(grant.caller.clone())
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or_default();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

pub fn require_admin(caller: &Caller) -> Result<(), AuthError> {
    match caller.role {
        Role::Admin => Ok(()),
        Role::User => Err(AuthError::Forbidden),
    }
}
