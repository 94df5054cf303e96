//! Identity handlers.

use roster_core::session::Authenticator;

use crate::common::TaskId;
use crate::effects::AuthRequest;
use crate::events::UiEvent;

/// Runs one auth request. Success means the session is already persisted.
pub async fn authenticate(auth: Authenticator, task: TaskId, request: AuthRequest) -> UiEvent {
    let op = request.op();
    let result = match &request {
        AuthRequest::Password { email, password } => {
            auth.sign_in_with_password(email, password).await
        }
        AuthRequest::Register { email, password } => {
            auth.register_then_sign_in(email, password).await
        }
        AuthRequest::Federated { id_token } => {
            auth.sign_in_with_federated_credential(id_token).await
        }
    };

    if let Err(err) = &result {
        tracing::warn!(?op, error = %err, "Auth request failed");
    }
    UiEvent::AuthFinished {
        task,
        op,
        result: result.map_err(|err| err.to_string()),
    }
}

/// Provider sign-out plus removal of the stored token.
pub async fn sign_out(auth: Authenticator, task: TaskId) -> UiEvent {
    let result = auth.sign_out().await;
    if let Err(err) = &result {
        tracing::warn!(error = %err, "Sign-out reported an error");
    }
    UiEvent::SignedOut {
        task,
        result: result.map_err(|err| err.to_string()),
    }
}
