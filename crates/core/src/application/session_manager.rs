// Session Manager - owns the operator session lifecycle
// The session is an explicit value handed to the workflow, never ambient state

use crate::application::constants::{INVALID_CREDENTIALS, LOGIN_FAILED};
use crate::domain::{Credentials, PersistedSession, Session};
use crate::error::{AppError, Result};
use crate::port::{AuthGateway, IdProvider, LoginVerdict, SessionStore};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SessionManager {
    auth: Arc<dyn AuthGateway>,
    store: Arc<dyn SessionStore>,
    ids: Arc<dyn IdProvider>,
}

impl SessionManager {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        store: Arc<dyn SessionStore>,
        ids: Arc<dyn IdProvider>,
    ) -> Self {
        Self { auth, store, ids }
    }

    /// Rebuild the session from persisted state (no expiry)
    pub fn restore(&self) -> Result<Session> {
        let persisted = self.store.load()?;
        let session = Session {
            session_id: self.ids.generate_id(),
            username: persisted.username.filter(|_| persisted.authenticated),
            authenticated: persisted.authenticated,
        };
        info!(
            session_id = %session.session_id,
            authenticated = session.authenticated,
            "Session restored"
        );
        Ok(session)
    }

    /// Username to prefill the login prompt with
    pub fn remembered_username(&self) -> Result<Option<String>> {
        Ok(self.store.load()?.remembered_username)
    }

    /// Submit credentials and persist the authenticated flag on success
    ///
    /// The username is remembered iff `remember` is set, and forgotten
    /// otherwise.
    ///
    /// # Errors
    /// - `AppError::Auth` with "Invalid credentials." when the server rejects
    /// - `AppError::Auth` with "Login failed. Please try again." when the
    ///   call itself failed
    pub async fn login(&self, credentials: &Credentials, remember: bool) -> Result<Session> {
        match self.auth.login(credentials).await {
            Ok(LoginVerdict::Accepted) => {}
            Ok(LoginVerdict::Rejected) => {
                warn!(username = %credentials.username, "Login rejected");
                return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
            }
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Login call failed");
                return Err(AppError::Auth(LOGIN_FAILED.to_string()));
            }
        }

        let username = credentials.username.clone();
        self.store.save(&PersistedSession {
            authenticated: true,
            username: Some(username.clone()),
            remembered_username: remember.then(|| username.clone()),
        })?;

        let session = Session {
            session_id: self.ids.generate_id(),
            username: Some(username),
            authenticated: true,
        };
        info!(session_id = %session.session_id, username = session.display_name(), remember, "Logged in");
        Ok(session)
    }

    /// Clear the authenticated flag; the remembered username survives
    pub fn logout(&self, session: &mut Session) -> Result<()> {
        let mut persisted = self.store.load()?;
        persisted.authenticated = false;
        persisted.username = None;
        self.store.save(&persisted)?;

        info!(session_id = %session.session_id, username = session.display_name(), "Logged out");
        session.authenticated = false;
        session.username = None;
        Ok(())
    }
}
