//! Readiness checks for the sign-in and sign-up forms.
//!
//! These decide whether the submit buttons are enabled. The controller never
//! consults them; backend validation is authoritative.

use crate::SessionState;

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Sign-in screen fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields are filled and no request is in flight.
    pub fn can_submit(&self, state: &SessionState) -> bool {
        filled(&self.email) && filled(&self.password) && !state.is_in_flight()
    }

    /// "Forgot password" needs only an email.
    pub fn can_request_reset(&self) -> bool {
        filled(&self.email)
    }
}

/// Sign-up screen fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role_label: String,
}

impl SignUpForm {
    /// Every field is filled, the passwords match and no request is in flight.
    pub fn can_submit(&self, state: &SessionState) -> bool {
        filled(&self.display_name)
            && filled(&self.email)
            && filled(&self.password)
            && filled(&self.confirm_password)
            && filled(&self.role_label)
            && self.password == self.confirm_password
            && !state.is_in_flight()
    }
}
