// Auth Gateway Port
// Login is a pass-through collaborator: the only output is accepted/rejected

use crate::domain::Credentials;
use crate::port::RemoteCallError;
use async_trait::async_trait;

/// Exact response body of an accepted login
pub const LOGIN_SUCCESS_BODY: &str = "Login successful";

/// Outcome of a login call that reached the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginVerdict {
    Accepted,
    Rejected,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Submit credentials
    ///
    /// # Errors
    /// - RemoteCallError when the server is unreachable or answers non-2xx
    async fn login(&self, credentials: &Credentials) -> Result<LoginVerdict, RemoteCallError>;
}
