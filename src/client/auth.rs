//! Authentication gate
//!
//! Reads may only reach the backend once the session has been checked and
//! found valid. Until the first check completes the status is
//! [`AuthStatus::Unknown`], and requests fail with
//! [`ApiError::AuthNotReady`] instead of going out unauthenticated.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ApiError;

/// Session state as known to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// No session check has completed yet
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// Shared, observable authentication status
#[derive(Debug, Clone)]
pub struct AuthGate {
    tx: Arc<watch::Sender<AuthStatus>>,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthGate {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AuthStatus::Unknown);
        Self { tx: Arc::new(tx) }
    }

    /// Gate that starts out authenticated
    pub fn authenticated() -> Self {
        let gate = Self::new();
        gate.set(AuthStatus::Authenticated);
        gate
    }

    pub fn status(&self) -> AuthStatus {
        *self.tx.borrow()
    }

    pub fn set(&self, status: AuthStatus) {
        let previous = self.tx.send_replace(status);
        if previous != status {
            log::debug!("Auth status: {:?} -> {:?}", previous, status);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == AuthStatus::Authenticated
    }

    /// Fail unless the session is known to be valid
    pub fn check(&self) -> Result<(), ApiError> {
        match self.status() {
            AuthStatus::Authenticated => Ok(()),
            AuthStatus::Unknown => Err(ApiError::AuthNotReady),
            AuthStatus::Unauthenticated => Err(ApiError::Unauthorized),
        }
    }

    /// Watch for status changes
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_until_checked() {
        let gate = AuthGate::new();
        assert!(matches!(gate.check(), Err(ApiError::AuthNotReady)));

        gate.set(AuthStatus::Unauthenticated);
        assert!(matches!(gate.check(), Err(ApiError::Unauthorized)));

        gate.set(AuthStatus::Authenticated);
        assert!(gate.check().is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let gate = AuthGate::new();
        let other = gate.clone();
        other.set(AuthStatus::Authenticated);
        assert!(gate.is_authenticated());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let gate = AuthGate::new();
        let mut rx = gate.subscribe();

        gate.set(AuthStatus::Authenticated);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), AuthStatus::Authenticated);
    }
}
