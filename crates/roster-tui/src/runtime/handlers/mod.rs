//! Effect handlers for the TUI runtime.
//!
//! Handlers are pure async functions that return a `UiEvent`. They perform
//! I/O and never touch `AppState`; the runtime spawns them and forwards the
//! result to the inbox.

pub mod auth;
pub mod directory;

pub use auth::*;
pub use directory::*;
