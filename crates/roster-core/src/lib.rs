//! Core of the roster employee directory client: identity, session storage,
//! directory fetch, enrichment and the listing view state.

pub mod config;
pub mod directory;
pub mod enrich;
pub mod error;
pub mod identity;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod token_store;
pub mod validate;

pub use error::{Error, Result};
