//! Identity provider client.
//!
//! `IdentityGateway` is the seam between the session layer and the hosted
//! identity service. `RestIdentityGateway` speaks the Identity Toolkit REST
//! dialect (`accounts:signInWithPassword`, `accounts:signUp`,
//! `accounts:signInWithIdp`).

pub mod google;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::IdentityConfig;
use crate::error::AuthError;

pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Provider id for federated Google credentials.
pub const GOOGLE_PROVIDER_ID: &str = "google.com";

/// Result of a successful sign-in or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub email: Option<String>,
    pub token: String,
}

#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;

    /// Creates an account. Callers sign in separately afterwards.
    async fn register(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Exchanges a provider ID token for a session.
    async fn sign_in_with_federated_credential(
        &self,
        provider_token: &str,
    ) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Identity Toolkit REST client.
#[derive(Debug, Clone)]
pub struct RestIdentityGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    request_uri: String,
}

impl RestIdentityGateway {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
            request_uri: google::DEFAULT_REDIRECT_URI.to_string(),
        }
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(config.base_url.clone(), config.api_key.clone())
            .with_request_uri(config.google_redirect_uri.clone())
    }

    /// `requestUri` sent with federated exchanges.
    #[must_use]
    pub fn with_request_uri(mut self, request_uri: impl Into<String>) -> Self {
        self.request_uri = request_uri.into();
        self
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/v1/accounts:{action}", self.base_url.trim_end_matches('/'))
    }

    async fn call(&self, action: &str, body: serde_json::Value) -> Result<AuthSession, AuthError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(AuthError::NotConfigured("ROSTER_API_KEY or identity.api_key"))?;

        tracing::debug!(action, "Calling identity service");

        let response = self
            .http
            .post(self.endpoint(action))
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = rejection_from_body(status.as_u16(), &text);
            tracing::warn!(action, status = status.as_u16(), error = %err, "Identity request rejected");
            return Err(err);
        }

        let token: TokenResponse =
            serde_json::from_str(&text).map_err(|e| AuthError::Decode(e.to_string()))?;
        tracing::info!(
            action,
            user = token.local_id.as_deref().unwrap_or("-"),
            expires_in = token.expires_in.as_deref().unwrap_or("-"),
            "Identity request succeeded"
        );

        Ok(AuthSession {
            email: token.email.filter(|email| !email.is_empty()),
            token: token.id_token,
        })
    }
}

#[async_trait]
impl IdentityGateway for RestIdentityGateway {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.call(
            "signInWithPassword",
            json!({ "email": email, "password": password, "returnSecureToken": true }),
        )
        .await
    }

    async fn register(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.call(
            "signUp",
            json!({ "email": email, "password": password, "returnSecureToken": true }),
        )
        .await
    }

    async fn sign_in_with_federated_credential(
        &self,
        provider_token: &str,
    ) -> Result<AuthSession, AuthError> {
        let post_body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id_token", provider_token)
            .append_pair("providerId", GOOGLE_PROVIDER_ID)
            .finish();

        self.call(
            "signInWithIdp",
            json!({
                "postBody": post_body,
                "requestUri": self.request_uri,
                "returnSecureToken": true,
                "returnIdpCredential": true,
            }),
        )
        .await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // ID tokens carry no server-side session to revoke.
        tracing::debug!("Signing out locally");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    local_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn rejection_from_body(status: u16, body: &str) -> AuthError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return AuthError::Rejected {
            code: format!("HTTP_{status}"),
            message: format!("Identity service returned HTTP {status}"),
        };
    };

    // Messages look like "WEAK_PASSWORD : Password should be at least 6 characters".
    let raw = envelope.error.message;
    let code = raw
        .split_once(" : ")
        .map_or(raw.as_str(), |(code, _)| code)
        .trim()
        .to_string();
    let message = friendly_message(&code).map_or(raw, str::to_string);

    AuthError::Rejected { code, message }
}

/// User-facing text for known provider error codes.
pub fn friendly_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "EMAIL_NOT_FOUND" => "No account exists for this email",
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => "Incorrect email or password",
        "EMAIL_EXISTS" => "An account already exists for this email",
        "WEAK_PASSWORD" => "Password is too weak",
        "INVALID_EMAIL" => "Invalid email",
        "USER_DISABLED" => "This account has been disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts, try again later",
        "OPERATION_NOT_ALLOWED" => "This sign-in method is disabled",
        "INVALID_IDP_RESPONSE" => "Google sign-in was rejected",
        "MISSING_OR_INVALID_NONCE" => "Google sign-in nonce did not match",
        _ => return None,
    };
    Some(message)
}
