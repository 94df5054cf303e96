//! Auth feature state: the login, register and Google forms.

use roster_core::identity::google;

use crate::common::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Email,
    Password,
}

impl FormField {
    pub fn toggle(self) -> Self {
        match self {
            FormField::Email => FormField::Password,
            FormField::Password => FormField::Email,
        }
    }
}

/// Email and password form shared by the login and register screens.
#[derive(Debug, Clone)]
pub struct CredentialsForm {
    pub email: TextInput,
    pub password: TextInput,
    pub focus: FormField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl Default for CredentialsForm {
    fn default() -> Self {
        Self {
            email: TextInput::default(),
            password: TextInput::masked(),
            focus: FormField::Email,
            error: None,
            submitting: false,
        }
    }
}

impl CredentialsForm {
    pub fn focused_mut(&mut self) -> &mut TextInput {
        match self.focus {
            FormField::Email => &mut self.email,
            FormField::Password => &mut self.password,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Google sign-in: the prepared authorization URL and the pasted redirect.
#[derive(Debug, Clone, Default)]
pub struct FederatedForm {
    pub request: Option<google::AuthRequest>,
    pub input: TextInput,
    pub error: Option<String>,
    pub submitting: bool,
}

impl FederatedForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub login: CredentialsForm,
    pub register: CredentialsForm,
    pub federated: FederatedForm,
    /// Informational line on the login screen (e.g. after sign-out).
    pub notice: Option<String>,
}

impl AuthState {
    /// Clears every form after a successful sign-in.
    pub fn reset(&mut self) {
        self.login.reset();
        self.register.reset();
        self.federated.reset();
        self.notice = None;
    }
}
