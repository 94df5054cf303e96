//! UI events fed to the reducer.

use crossterm::event::Event;
use roster_core::error::DirectoryError;
use roster_core::model::RawPerson;
use roster_core::pipeline::FetchTicket;
use roster_core::token_store::StoredSession;

use crate::common::TaskId;

/// Which auth form started a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOp {
    SignIn,
    Register,
    Federated,
}

#[derive(Debug)]
pub enum UiEvent {
    /// Animation tick.
    Tick,
    Terminal(Event),
    AuthFinished {
        task: TaskId,
        op: AuthOp,
        result: Result<StoredSession, String>,
    },
    SignedOut {
        task: TaskId,
        result: Result<(), String>,
    },
    DirectoryFetched {
        ticket: FetchTicket,
        result: Result<Vec<RawPerson>, DirectoryError>,
    },
}
