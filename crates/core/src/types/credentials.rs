//! Credentials submitted to the login and registration endpoints.
//!
//! Both types implement `Debug` manually to redact the password.

use core::fmt;

use serde::Serialize;

use crate::Email;

/// Email/password login.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub email: Email,
    pub password: String,
}

impl LoginCredentials {
    #[must_use]
    pub fn new(email: Email, password: impl Into<String>) -> Self {
        Self {
            email,
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Account registration.
#[derive(Clone, Serialize)]
pub struct RegisterCredentials {
    pub name: String,
    pub email: Email,
    pub password: String,
}

impl RegisterCredentials {
    #[must_use]
    pub fn new(name: impl Into<String>, email: Email, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email,
            password: password.into(),
        }
    }

    /// The login credentials for the same account, used to obtain a session
    /// when registration does not return one.
    #[must_use]
    pub fn to_login(&self) -> LoginCredentials {
        LoginCredentials::new(self.email.clone(), self.password.clone())
    }
}

impl fmt::Debug for RegisterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterCredentials")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
