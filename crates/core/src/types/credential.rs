//! Account credential types.
//!
//! Local validation for registration and login forms. Checks run in a fixed
//! order and only the first failure is reported, so the user always sees a
//! single reason.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Errors that can occur when validating credentials.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The username is empty.
    #[error("username required")]
    UsernameRequired,
    /// The username is shorter than the minimum.
    #[error("username minimum {min} characters")]
    UsernameTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The password is empty.
    #[error("password required")]
    PasswordRequired,
    /// The password is shorter than the minimum.
    #[error("password minimum {min} characters")]
    PasswordTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,
}

/// An account username.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Minimum length accepted at registration.
    pub const MIN_LENGTH: usize = 6;

    /// Parse a username for registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or shorter than six characters.
    pub fn parse(s: &str) -> Result<Self, CredentialError> {
        if s.is_empty() {
            return Err(CredentialError::UsernameRequired);
        }
        if s.chars().count() < Self::MIN_LENGTH {
            return Err(CredentialError::UsernameTooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An account password.
///
/// Held as a [`SecretString`] so it never shows up in logs.
#[derive(Clone)]
pub struct Password(SecretString);

impl Password {
    /// Minimum length accepted at registration.
    pub const MIN_LENGTH: usize = 6;

    /// Parse a password for registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or shorter than six characters.
    pub fn parse(s: &str) -> Result<Self, CredentialError> {
        if s.is_empty() {
            return Err(CredentialError::PasswordRequired);
        }
        if s.chars().count() < Self::MIN_LENGTH {
            return Err(CredentialError::PasswordTooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(Self(SecretString::from(s)))
    }

    /// Expose the password for sending to the backend.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// A validated registration form.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The new account's username.
    pub username: Username,
    /// The new account's password.
    pub password: Password,
}

impl Registration {
    /// Validate a registration form.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, in this order: username required,
    /// username length, password required, password length, confirmation match.
    pub fn new(username: &str, password: &str, confirm: &str) -> Result<Self, CredentialError> {
        let username = Username::parse(username)?;
        let password = Password::parse(password)?;
        if password.expose() != confirm {
            return Err(CredentialError::PasswordMismatch);
        }
        Ok(Self { username, password })
    }
}

/// A validated login form.
///
/// Login only requires both fields to be present; length rules apply at
/// registration.
#[derive(Debug, Clone)]
pub struct Login {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: SecretString,
}

impl Login {
    /// Validate a login form.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or password is empty.
    pub fn new(username: &str, password: &str) -> Result<Self, CredentialError> {
        if username.is_empty() {
            return Err(CredentialError::UsernameRequired);
        }
        if password.is_empty() {
            return Err(CredentialError::PasswordRequired);
        }
        Ok(Self {
            username: username.to_owned(),
            password: SecretString::from(password),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_valid() {
        let form = Registration::new("crio.do", "learnbydoing", "learnbydoing").unwrap();
        assert_eq!(form.username.as_str(), "crio.do");
        assert_eq!(form.password.expose(), "learnbydoing");
    }

    #[test]
    fn test_registration_check_order() {
        assert_eq!(
            Registration::new("", "", "x").unwrap_err(),
            CredentialError::UsernameRequired
        );
        assert_eq!(
            Registration::new("crio", "", "x").unwrap_err(),
            CredentialError::UsernameTooShort { min: 6 }
        );
        assert_eq!(
            Registration::new("crio.do", "", "x").unwrap_err(),
            CredentialError::PasswordRequired
        );
        assert_eq!(
            Registration::new("crio.do", "short", "x").unwrap_err(),
            CredentialError::PasswordTooShort { min: 6 }
        );
        assert_eq!(
            Registration::new("crio.do", "learnbydoing", "learnbydoin").unwrap_err(),
            CredentialError::PasswordMismatch
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CredentialError::UsernameTooShort { min: 6 }.to_string(),
            "username minimum 6 characters"
        );
        assert_eq!(
            CredentialError::PasswordMismatch.to_string(),
            "passwords do not match"
        );
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert_eq!(
            Login::new("", "pw").unwrap_err(),
            CredentialError::UsernameRequired
        );
        assert_eq!(
            Login::new("crio.do", "").unwrap_err(),
            CredentialError::PasswordRequired
        );
        // Short credentials are fine at login
        assert!(Login::new("abc", "pw").is_ok());
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::parse("hunter22").unwrap();
        let debug = format!("{password:?}");
        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("REDACTED"));
    }
}
