//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] satchel_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account already exists for this email.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password rejected by the identity provider.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The account has been disabled.
    #[error("account disabled")]
    UserDisabled,

    /// The provider is throttling sign-in attempts.
    #[error("too many attempts")]
    TooManyAttempts,

    /// Sign-in requires a verified email address.
    #[error("email address not verified")]
    EmailNotVerified,

    /// The identity provider rejected the request for another reason.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// HTTP transport error talking to the identity provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider's response could not be understood.
    #[error("unexpected identity provider response: {0}")]
    Parse(String),
}

impl AuthError {
    /// Map an Identity Toolkit error code (e.g. `EMAIL_NOT_FOUND`) to an error.
    ///
    /// Codes may carry a trailing explanation (`WEAK_PASSWORD : Password
    /// should be at least 6 characters`).
    #[must_use]
    pub fn from_provider_message(message: &str) -> Self {
        let (code, detail) = match message.split_once(':') {
            Some((code, detail)) => (code.trim(), detail.trim()),
            None => (message.trim(), ""),
        };
        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_EMAIL" => Self::InvalidCredentials,
            "EMAIL_EXISTS" => Self::UserAlreadyExists,
            "WEAK_PASSWORD" => Self::WeakPassword(detail.to_owned()),
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            _ => Self::Provider(message.to_owned()),
        }
    }

    /// Whether the failure is on our side (transport or protocol) rather
    /// than caused by what the user entered.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Http(_) | Self::Parse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_codes_map_to_variants() {
        assert!(matches!(
            AuthError::from_provider_message("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from_provider_message("EMAIL_EXISTS"),
            AuthError::UserAlreadyExists
        ));
        assert!(matches!(
            AuthError::from_provider_message("TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"),
            AuthError::TooManyAttempts
        ));
        assert!(matches!(
            AuthError::from_provider_message("CONFIGURATION_NOT_FOUND"),
            AuthError::Provider(_)
        ));
    }

    #[test]
    fn test_weak_password_keeps_detail() {
        let err = AuthError::from_provider_message(
            "WEAK_PASSWORD : Password should be at least 6 characters",
        );
        assert!(
            matches!(err, AuthError::WeakPassword(detail) if detail == "Password should be at least 6 characters")
        );
    }

    #[test]
    fn test_server_error_classification() {
        assert!(AuthError::Parse("x".to_owned()).is_server_error());
        assert!(!AuthError::InvalidCredentials.is_server_error());
        assert!(!AuthError::EmailNotVerified.is_server_error());
    }
}
