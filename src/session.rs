//! Authentication session state.
//!
//! The session is a single tagged value rather than a set of independent
//! flags, so "loading but authenticated" style combinations cannot occur.
//! A [`Session`] handle is shared between the API client (which moves it
//! to `Expired` when a refresh fails) and the command layer.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Profile of the signed-in user as returned by `GET /api/auth/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<RoleInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub id: i64,
    pub role_name: String,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.firstname, self.lastname);
        match self.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => format!("{title} {}", name.trim()),
            None => name.trim().to_string(),
        }
    }

    pub fn role_name(&self) -> &str {
        self.role.as_ref().map(|r| r.role_name.as_str()).unwrap_or("-")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(UserProfile),
    Expired,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Anonymous => write!(f, "anonymous"),
            SessionState::Authenticating => write!(f, "authenticating"),
            SessionState::Authenticated(user) => write!(f, "authenticated as {}", user.email),
            SessionState::Expired => write!(f, "expired"),
        }
    }
}

/// Shared handle to the current session state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().is_authenticated()
    }

    pub fn is_expired(&self) -> bool {
        matches!(*self.state.lock(), SessionState::Expired)
    }

    pub fn begin_auth(&self) {
        *self.state.lock() = SessionState::Authenticating;
    }

    pub fn authenticated(&self, user: UserProfile) {
        *self.state.lock() = SessionState::Authenticated(user);
    }

    /// Mark the session expired after the server rejected both the access
    /// token and the refresh attempt.
    pub fn expire(&self) {
        *self.state.lock() = SessionState::Expired;
    }

    pub fn sign_out(&self) {
        *self.state.lock() = SessionState::Anonymous;
    }
}
