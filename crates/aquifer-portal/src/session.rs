#![forbid(unsafe_code)]

//! Sign-in sessions and page-area permissions.
//!
//! The real identity provider lives outside this repo; [`Authenticator`] is
//! its seam and [`StaticAuthenticator`] the in-memory implementation used by
//! tests and local development. Authorization is deliberately coarse: two
//! roles, checked per page area, no per-record grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Portal roles, from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages both registries and signs off billing runs.
    Admin,
    /// Field and counter staff: records readings, reads registries, uses
    /// the assist tools.
    Staff,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }

    /// Whether this role may create, amend, or delete registry records.
    #[must_use]
    pub const fn can_manage_registry(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role may record meter readings.
    #[must_use]
    pub const fn can_record_readings(self) -> bool {
        true
    }
}

/// An authenticated portal session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
    pub signed_in_at: DateTime<Utc>,
}

/// Errors from the identity provider.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// Unknown username or wrong password. Deliberately one variant for
    /// both, so callers cannot leak which usernames exist.
    InvalidCredentials,
    /// The provider itself failed.
    Provider(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::Provider(msg) => write!(f, "identity provider failed: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// The identity provider seam.
pub trait Authenticator {
    /// Exchange credentials for a session.
    fn sign_in(&self, username: &str, password: &str) -> Result<Session, AuthError>;

    /// End a session. Idempotent: signing out an already-ended session is
    /// a no-op.
    fn sign_out(&self, session: &Session);
}

/// Fixed-credential [`Authenticator`] for tests and local development.
pub struct StaticAuthenticator {
    accounts: Vec<(String, String, Role)>,
}

impl StaticAuthenticator {
    /// Build from `(username, password, role)` triples.
    #[must_use]
    pub fn new(accounts: Vec<(String, String, Role)>) -> Self {
        Self { accounts }
    }
}

impl Authenticator for StaticAuthenticator {
    fn sign_in(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let account = self
            .accounts
            .iter()
            .find(|(user, pass, _)| user == username && pass == password);
        match account {
            Some((user, _, role)) => {
                info!(username = %user, role = role.as_str(), "signed in");
                Ok(Session {
                    username: user.clone(),
                    role: *role,
                    signed_in_at: Utc::now(),
                })
            }
            None => Err(AuthError::InvalidCredentials),
        }
    }

    fn sign_out(&self, session: &Session) {
        info!(username = %session.username, "signed out");
    }
}
