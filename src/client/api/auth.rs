//! Authentication API trait

use async_trait::async_trait;

use crate::client::models::{Credentials, SessionToken, Usuario};
use crate::error::Result;

/// Session operations for the SaleSystem backend
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Log in and return the session cookie
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken>;

    /// Ask the backend whether the current session is still valid.
    ///
    /// Returns the logged-in user, or `None` when there is no session.
    async fn check_session(&self) -> Result<Option<Usuario>>;

    /// End the current session
    async fn logout(&self) -> Result<()>;
}
