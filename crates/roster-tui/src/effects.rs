//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only; the reducer never performs I/O
//! itself.

use roster_core::pipeline::FetchTicket;

use crate::common::TaskId;
use crate::events::AuthOp;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Run an auth operation against the identity service.
    Authenticate { task: TaskId, request: AuthRequest },

    /// Sign out with the provider and clear the stored session.
    SignOut { task: TaskId },

    /// Fetch the directory for the given refresh ticket.
    FetchDirectory {
        ticket: FetchTicket,
        bearer: Option<String>,
    },

    /// Open a URL in the system browser.
    OpenBrowser { url: String },
}

/// Input for an `Authenticate` effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Password { email: String, password: String },
    Register { email: String, password: String },
    Federated { id_token: String },
}

impl AuthRequest {
    pub fn op(&self) -> AuthOp {
        match self {
            AuthRequest::Password { .. } => AuthOp::SignIn,
            AuthRequest::Register { .. } => AuthOp::Register,
            AuthRequest::Federated { .. } => AuthOp::Federated,
        }
    }
}
