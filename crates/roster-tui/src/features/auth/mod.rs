//! Auth feature slice: sign-in, registration and Google sign-in screens.

mod render;
mod state;
mod update;

pub use render::{render_federated, render_login, render_register};
pub use state::{AuthState, CredentialsForm, FederatedForm, FormField};
pub use update::{
    handle_auth_finished, handle_federated_key, handle_login_key, handle_paste,
    handle_register_key, handle_signed_out,
};
