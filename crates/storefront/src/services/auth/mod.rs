//! Authentication service.
//!
//! Thin adapter over an [`IdentityProvider`]: maps provider accounts to the
//! local [`User`] shape and applies optional email-verification gating.
//! Session state itself lives in each shopper's [`SessionObserver`].

mod error;
mod identity;
mod observer;

pub use error::AuthError;
pub use identity::{
    FirebaseIdentityClient, GOOGLE_PROVIDER_ID, IdentityProvider, ProviderAccount,
};
pub use observer::{SessionObserver, Subscription};

use std::sync::Arc;

use tracing::instrument;

use satchel_core::Email;

use crate::models::User;
use crate::store::Notice;

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub enum Registration {
    /// The account is usable immediately.
    SignedIn(User),
    /// A verification email was sent; the user must verify before signing in.
    VerificationSent { email: Email },
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    require_email_verification: bool,
}

impl AuthService {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, require_email_verification: bool) -> Self {
        Self {
            provider,
            require_email_verification,
        }
    }

    /// Whether unverified accounts are refused a session.
    #[must_use]
    pub const fn requires_email_verification(&self) -> bool {
        self.require_email_verification
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed address,
    /// `AuthError::EmailNotVerified` when gating is on and the account is
    /// unverified, or the provider's error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let account = self.provider.sign_in_with_password(&email, password).await?;
        self.admit(account)
    }

    /// Register a new email/password account.
    ///
    /// With verification gating on, a verification email is sent and no
    /// session is started.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed address, or the
    /// provider's error (e.g. `UserAlreadyExists`, `WeakPassword`).
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Registration, AuthError> {
        let email = Email::parse(email)?;
        let account = self
            .provider
            .sign_up(&email, password, Some(name))
            .await?;

        if self.require_email_verification && !account.email_verified {
            self.provider
                .send_email_verification(&account.id_token)
                .await?;
            tracing::info!(uid = %account.uid, "verification email sent");
            return Ok(Registration::VerificationSent { email });
        }
        Ok(Registration::SignedIn(to_user(account)))
    }

    /// Sign in with a Google id token.
    ///
    /// # Errors
    ///
    /// Returns the provider's error, or `AuthError::EmailNotVerified` under
    /// gating.
    #[instrument(skip(self, id_token))]
    pub async fn sign_in_with_google(&self, id_token: &str) -> Result<User, AuthError> {
        let account = self
            .provider
            .sign_in_with_idp(GOOGLE_PROVIDER_ID, id_token)
            .await?;
        self.admit(account)
    }

    /// Request a password reset email.
    ///
    /// Provider failures (including unknown addresses) are logged and not
    /// reported, so callers cannot probe which emails have accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` only for a malformed address.
    #[instrument(skip(self))]
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        if let Err(e) = self.provider.send_password_reset(&email).await {
            tracing::warn!(error = %e, "password reset request failed");
        }
        Ok(())
    }

    fn admit(&self, account: ProviderAccount) -> Result<User, AuthError> {
        if self.require_email_verification && !account.email_verified {
            tracing::info!(uid = %account.uid, "sign-in refused: email not verified");
            return Err(AuthError::EmailNotVerified);
        }
        Ok(to_user(account))
    }
}

fn to_user(account: ProviderAccount) -> User {
    User::from_provider(
        account.uid,
        account.display_name.as_deref(),
        account.email.as_deref(),
    )
}

/// Notice shown after a successful sign-in.
#[must_use]
pub fn login_notice(user: &User) -> Notice {
    Notice::info("Login Successful", format!("Welcome back, {}!", user.name))
}

/// Notice shown after signing out.
#[must_use]
pub fn logout_notice() -> Notice {
    Notice::info("Logged Out", "You have been successfully logged out.")
}

/// Notice shown when Google sign-in fails.
#[must_use]
pub fn google_failure_notice() -> Notice {
    Notice::destructive(
        "Login Failed",
        "Could not sign in with Google. Please try again.",
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use secrecy::SecretString;

    use super::*;

    #[derive(Default)]
    struct FakeProvider {
        verified: bool,
        fail_reset: bool,
        verification_sent: Mutex<u32>,
    }

    impl FakeProvider {
        fn account(&self, email: &Email, name: Option<&str>) -> ProviderAccount {
            ProviderAccount {
                uid: format!("uid-{}", email.local_part()),
                display_name: name.map(str::to_owned),
                email: Some(email.to_string()),
                email_verified: self.verified,
                id_token: SecretString::from("token"),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn sign_in_with_password(
            &self,
            email: &Email,
            password: &str,
        ) -> Result<ProviderAccount, AuthError> {
            if password == "correct-horse" {
                Ok(self.account(email, None))
            } else {
                Err(AuthError::InvalidCredentials)
            }
        }

        async fn sign_up(
            &self,
            email: &Email,
            _password: &str,
            display_name: Option<&str>,
        ) -> Result<ProviderAccount, AuthError> {
            Ok(self.account(email, display_name))
        }

        async fn sign_in_with_idp(
            &self,
            provider_id: &str,
            _id_token: &str,
        ) -> Result<ProviderAccount, AuthError> {
            assert_eq!(provider_id, GOOGLE_PROVIDER_ID);
            Ok(ProviderAccount {
                uid: "google-uid".to_owned(),
                display_name: Some("Grace".to_owned()),
                email: None,
                email_verified: true,
                id_token: SecretString::from("token"),
            })
        }

        async fn send_password_reset(&self, _email: &Email) -> Result<(), AuthError> {
            if self.fail_reset {
                Err(AuthError::InvalidCredentials)
            } else {
                Ok(())
            }
        }

        async fn send_email_verification(&self, _id_token: &SecretString) -> Result<(), AuthError> {
            *self.verification_sent.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn service(provider: FakeProvider, gated: bool) -> (AuthService, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        (AuthService::new(provider.clone(), gated), provider)
    }

    #[tokio::test]
    async fn test_login_maps_defaults() {
        let (auth, _) = service(FakeProvider::default(), false);
        let user = auth.login("ada@example.com", "correct-horse").await.unwrap();
        assert_eq!(user.name, "User");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.id.as_str(), "uid-ada");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (auth, _) = service(FakeProvider::default(), false);
        let result = auth.login("ada@example.com", "nope").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_email() {
        let (auth, _) = service(FakeProvider::default(), false);
        let result = auth.login("not-an-email", "correct-horse").await;
        assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
    }

    #[tokio::test]
    async fn test_gating_refuses_unverified_login() {
        let (auth, _) = service(FakeProvider::default(), true);
        let result = auth.login("ada@example.com", "correct-horse").await;
        assert!(matches!(result, Err(AuthError::EmailNotVerified)));
    }

    #[tokio::test]
    async fn test_register_with_gating_sends_verification() {
        let (auth, provider) = service(FakeProvider::default(), true);
        let outcome = auth
            .register("Ada", "ada@example.com", "correct-horse")
            .await
            .unwrap();

        assert!(matches!(outcome, Registration::VerificationSent { .. }));
        assert_eq!(*provider.verification_sent.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_without_gating_signs_in() {
        let (auth, provider) = service(FakeProvider::default(), false);
        let outcome = auth
            .register("Ada", "ada@example.com", "correct-horse")
            .await
            .unwrap();

        assert!(matches!(outcome, Registration::SignedIn(user) if user.name == "Ada"));
        assert_eq!(*provider.verification_sent.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_google_sign_in() {
        let (auth, _) = service(FakeProvider::default(), true);
        let user = auth.sign_in_with_google("google-token").await.unwrap();
        assert_eq!(user.name, "Grace");
        assert_eq!(user.email, "");
    }

    #[tokio::test]
    async fn test_password_reset_hides_provider_failure() {
        let provider = FakeProvider {
            fail_reset: true,
            ..FakeProvider::default()
        };
        let (auth, _) = service(provider, false);
        assert!(auth.send_password_reset("ghost@example.com").await.is_ok());
        assert!(auth.send_password_reset("bad").await.is_err());
    }

    #[test]
    fn test_login_notice_uses_name() {
        let user = User::from_provider("u", Some("Ada"), None);
        assert_eq!(login_notice(&user).description, "Welcome back, Ada!");
    }
}
