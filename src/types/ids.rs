use std::fmt;

use crate::error::GupshupError;

/// Partner account e-mail used for credential login.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn new(email: impl Into<String>) -> Result<Self, GupshupError> {
        let email = email.into().trim().to_string();
        if email.is_empty() {
            return Err(GupshupError::InvalidArgument(
                "partner email must not be empty".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(GupshupError::InvalidArgument(format!(
                "partner email must contain '@', got {}",
                email
            )));
        }
        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Partner account password. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Result<Self, GupshupError> {
        let password = password.into();
        if password.is_empty() {
            return Err(GupshupError::InvalidArgument(
                "partner password must not be empty".to_string(),
            ));
        }
        Ok(Self(password))
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// Partner login credentials. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: Email,
    password: Password,
}

impl Credentials {
    pub fn new(email: Email, password: Password) -> Self {
        Self { email, password }
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub(crate) fn password(&self) -> &Password {
        &self.password
    }
}
