//! Feature slices. Each owns its state, reducer and view.

pub mod auth;
pub mod directory;
