//! Session controller.
//!
//! `Authenticator` runs each auth operation as validate -> gateway -> persist.
//! `SessionContext` is created once at start-up, holds the current session
//! and decides which screen to open first.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::identity::{AuthSession, IdentityGateway};
use crate::token_store::{StoredSession, TokenStore};
use crate::validate::{validate_credentials, validate_provider_token};

/// First screen to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Directory,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Directory => "directory",
        }
    }
}

/// Stateless auth operations over a gateway and a token store.
#[derive(Clone)]
pub struct Authenticator {
    gateway: Arc<dyn IdentityGateway>,
    store: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(gateway: Arc<dyn IdentityGateway>, store: Arc<dyn TokenStore>) -> Self {
        Self { gateway, store }
    }

    /// Stored session, if any.
    ///
    /// # Errors
    /// Returns `Error::Storage` if the store cannot be read.
    pub fn cached(&self) -> Result<Option<StoredSession>> {
        self.store.get().map_err(Error::Storage)
    }

    /// # Errors
    /// Validation errors are returned before any request is sent.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<StoredSession> {
        validate_credentials(email, password)?;
        let email = email.trim();
        let session = self.gateway.sign_in_with_password(email, password).await?;
        self.persist(session, email)
    }

    /// Creates the account and stores the session the provider returns.
    ///
    /// # Errors
    /// Validation errors are returned before any request is sent.
    pub async fn register(&self, email: &str, password: &str) -> Result<StoredSession> {
        validate_credentials(email, password)?;
        let email = email.trim();
        let session = self.gateway.register(email, password).await?;
        self.persist(session, email)
    }

    /// Registers, then signs in with the same credentials.
    ///
    /// # Errors
    /// Fails on the first step that fails; nothing is stored unless the
    /// sign-in succeeds.
    pub async fn register_then_sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<StoredSession> {
        validate_credentials(email, password)?;
        let email = email.trim();
        self.gateway.register(email, password).await?;
        tracing::info!("Account created, signing in");
        let session = self.gateway.sign_in_with_password(email, password).await?;
        self.persist(session, email)
    }

    /// # Errors
    /// Returns `ValidationError::MissingField` for an empty token.
    pub async fn sign_in_with_federated_credential(
        &self,
        provider_token: &str,
    ) -> Result<StoredSession> {
        validate_provider_token(provider_token)?;
        let session = self
            .gateway
            .sign_in_with_federated_credential(provider_token.trim())
            .await?;
        self.persist(session, "")
    }

    /// Signs out with the provider and always clears the local session.
    ///
    /// # Errors
    /// Storage errors win over provider errors; both are reported after the
    /// local delete was attempted.
    pub async fn sign_out(&self) -> Result<()> {
        let remote = self.gateway.sign_out().await;
        let removed = self.store.delete().map_err(Error::Storage)?;
        tracing::info!(removed, "Signed out");
        remote.map_err(Error::from)
    }

    fn persist(&self, session: AuthSession, fallback_email: &str) -> Result<StoredSession> {
        let email = session
            .email
            .or_else(|| (!fallback_email.is_empty()).then(|| fallback_email.to_string()));
        let stored = StoredSession::new(session.token, email);
        self.store.set(&stored).map_err(Error::Storage)?;
        Ok(stored)
    }
}

/// The live session for one run of the program.
#[derive(Debug, Clone)]
pub struct SessionContext {
    auth: Authenticator,
    current: Option<StoredSession>,
}

impl SessionContext {
    /// Loads the cached session from the store.
    ///
    /// # Errors
    /// Returns `Error::Storage` if the store cannot be read.
    pub fn open(auth: Authenticator) -> Result<Self> {
        let current = auth.cached()?;
        Ok(Self { auth, current })
    }

    /// Directory when a token is cached, Login otherwise. The token is not
    /// checked for expiry or signature.
    pub fn resolve_initial_route(&self) -> Route {
        if self.current.is_some() {
            Route::Directory
        } else {
            Route::Login
        }
    }

    pub fn cached_token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub fn user_email(&self) -> Option<&str> {
        self.current.as_ref().and_then(|s| s.email.as_deref())
    }

    pub fn current(&self) -> Option<&StoredSession> {
        self.current.as_ref()
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// Records a session produced by an `Authenticator` call made elsewhere.
    pub fn adopt(&mut self, session: StoredSession) {
        self.current = Some(session);
    }

    /// Drops the in-memory session without touching the store.
    pub fn forget(&mut self) {
        self.current = None;
    }

    /// # Errors
    /// See [`Authenticator::sign_in_with_password`].
    pub async fn sign_in_with_password(&mut self, email: &str, password: &str) -> Result<()> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        self.adopt(session);
        Ok(())
    }

    /// # Errors
    /// See [`Authenticator::register_then_sign_in`].
    pub async fn register_then_sign_in(&mut self, email: &str, password: &str) -> Result<()> {
        let session = self.auth.register_then_sign_in(email, password).await?;
        self.adopt(session);
        Ok(())
    }

    /// # Errors
    /// See [`Authenticator::sign_in_with_federated_credential`].
    pub async fn sign_in_with_federated_credential(&mut self, provider_token: &str) -> Result<()> {
        let session = self
            .auth
            .sign_in_with_federated_credential(provider_token)
            .await?;
        self.adopt(session);
        Ok(())
    }

    /// # Errors
    /// See [`Authenticator::sign_out`]. The in-memory session is cleared
    /// either way.
    pub async fn sign_out(&mut self) -> Result<()> {
        self.forget();
        self.auth.sign_out().await
    }
}
