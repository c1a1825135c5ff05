// Session Domain Model

use serde::{Deserialize, Serialize};

/// Login form input
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Operator session, owned by the session manager and lent to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub username: Option<String>,
    pub authenticated: bool,
}

impl Session {
    pub fn anonymous(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            username: None,
            authenticated: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Name used in log context
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("anonymous")
    }
}

/// On-disk session state: no expiry, cleared only by logout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub remembered_username: Option<String>,
}
