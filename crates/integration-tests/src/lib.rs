//! Integration tests for Satchel.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p satchel-integration-tests
//! ```
//!
//! The storefront router is driven in-process with `tower::ServiceExt::oneshot`.
//! External services are replaced by [`FakeIdentity`] and [`FakeCompletion`];
//! [`TestApp`] carries the session cookie between requests like a browser.
//!
//! # Test Categories
//!
//! - `catalog` - product listing, filtering and detail
//! - `shopper_state` - cart, wishlist and browsing history
//! - `checkout` - order summary and placement
//! - `auth` - sign-in, registration, sign-out
//! - `recommendations` - Claude-backed suggestions

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use satchel_core::Email;
use satchel_storefront::catalog::Catalog;
use satchel_storefront::claude::{ClaudeError, TextCompletion};
use satchel_storefront::config::StorefrontConfig;
use satchel_storefront::services::auth::{AuthError, IdentityProvider, ProviderAccount};
use satchel_storefront::state::AppState;

/// Password accepted for every account created through [`FakeIdentity::with_account`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Google id token that [`FakeIdentity`] accepts.
pub const VALID_GOOGLE_TOKEN: &str = "google-id-token";

const TEST_API_KEY: &str = "AIzaSyD4f9Qk2Lm7Xw1Pz8Rb3Tn6Vc0Hj5Ge";

// ============================================================================
// Fake identity provider
// ============================================================================

struct FakeAccount {
    password: String,
    display_name: Option<String>,
    verified: bool,
}

/// In-memory identity provider.
#[derive(Default)]
pub struct FakeIdentity {
    accounts: Mutex<HashMap<String, FakeAccount>>,
    verify_on_sign_up: bool,
    reset_requests: Mutex<Vec<String>>,
    verification_emails: Mutex<u32>,
}

impl FakeIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts created by sign-up start out verified.
    #[must_use]
    pub fn verifying_on_sign_up(mut self) -> Self {
        self.verify_on_sign_up = true;
        self
    }

    /// Seed an account with [`TEST_PASSWORD`].
    #[must_use]
    pub fn with_account(self, email: &str, name: &str, verified: bool) -> Self {
        self.accounts.lock().expect("accounts lock").insert(
            email.to_owned(),
            FakeAccount {
                password: TEST_PASSWORD.to_owned(),
                display_name: Some(name.to_owned()),
                verified,
            },
        );
        self
    }

    /// Emails for which a password reset was requested.
    pub fn reset_requests(&self) -> Vec<String> {
        self.reset_requests.lock().expect("reset lock").clone()
    }

    /// Number of verification emails sent.
    pub fn verification_emails(&self) -> u32 {
        *self.verification_emails.lock().expect("verification lock")
    }

    fn account(email: &str, account: &FakeAccount) -> ProviderAccount {
        ProviderAccount {
            uid: format!("uid-{email}"),
            display_name: account.display_name.clone(),
            email: Some(email.to_owned()),
            email_verified: account.verified,
            id_token: SecretString::from(format!("token-{email}")),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<ProviderAccount, AuthError> {
        let accounts = self.accounts.lock().expect("accounts lock");
        match accounts.get(email.as_str()) {
            Some(account) if account.password == password => {
                Ok(Self::account(email.as_str(), account))
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<ProviderAccount, AuthError> {
        if password.len() < 6 {
            return Err(AuthError::WeakPassword(
                "Password should be at least 6 characters".to_owned(),
            ));
        }
        let mut accounts = self.accounts.lock().expect("accounts lock");
        if accounts.contains_key(email.as_str()) {
            return Err(AuthError::UserAlreadyExists);
        }
        let account = FakeAccount {
            password: password.to_owned(),
            display_name: display_name.map(str::to_owned),
            verified: self.verify_on_sign_up,
        };
        let provider_account = Self::account(email.as_str(), &account);
        accounts.insert(email.as_str().to_owned(), account);
        Ok(provider_account)
    }

    async fn sign_in_with_idp(
        &self,
        _provider_id: &str,
        id_token: &str,
    ) -> Result<ProviderAccount, AuthError> {
        if id_token != VALID_GOOGLE_TOKEN {
            return Err(AuthError::Provider("INVALID_IDP_RESPONSE".to_owned()));
        }
        Ok(ProviderAccount {
            uid: "google-uid".to_owned(),
            display_name: Some("Grace Hopper".to_owned()),
            email: Some("grace@example.com".to_owned()),
            email_verified: true,
            id_token: SecretString::from("google-session"),
        })
    }

    async fn send_password_reset(&self, email: &Email) -> Result<(), AuthError> {
        self.reset_requests
            .lock()
            .expect("reset lock")
            .push(email.to_string());
        if self
            .accounts
            .lock()
            .expect("accounts lock")
            .contains_key(email.as_str())
        {
            Ok(())
        } else {
            Err(AuthError::Provider("EMAIL_NOT_FOUND".to_owned()))
        }
    }

    async fn send_email_verification(&self, _id_token: &SecretString) -> Result<(), AuthError> {
        *self.verification_emails.lock().expect("verification lock") += 1;
        Ok(())
    }
}

// ============================================================================
// Fake completion backend
// ============================================================================

/// Completion backend with a scripted reply. `None` simulates an outage.
#[derive(Default)]
pub struct FakeCompletion {
    reply: Mutex<Option<String>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompletion {
    #[must_use]
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Mutex::new(Some(reply.to_owned())),
            prompts: Mutex::default(),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl TextCompletion for FakeCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, ClaudeError> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(prompt.to_owned());
        self.reply
            .lock()
            .expect("reply lock")
            .clone()
            .ok_or(ClaudeError::EmptyCompletion)
    }
}

// ============================================================================
// Test application
// ============================================================================

/// A decoded JSON response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Builder for [`TestApp`].
pub struct TestAppBuilder {
    identity: FakeIdentity,
    completion: Option<Arc<FakeCompletion>>,
    require_email_verification: bool,
    state_dir: Option<PathBuf>,
}

impl TestAppBuilder {
    #[must_use]
    pub fn identity(mut self, identity: FakeIdentity) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub fn completion(mut self, completion: FakeCompletion) -> Self {
        self.completion = Some(Arc::new(completion));
        self
    }

    #[must_use]
    pub const fn require_email_verification(mut self) -> Self {
        self.require_email_verification = true;
        self
    }

    #[must_use]
    pub fn state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> TestApp {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("IDENTITY_API_KEY", TEST_API_KEY),
        ]);
        let mut config =
            StorefrontConfig::from_source(&|key: &str| vars.get(key).map(|v| (*v).to_owned()))
                .expect("test configuration is valid");
        config.identity.require_email_verification = self.require_email_verification;
        config.state_dir = self.state_dir;

        let identity = Arc::new(self.identity);
        let completion = self
            .completion
            .clone()
            .map(|completion| completion as Arc<dyn TextCompletion>);
        let state = AppState::new(
            config,
            Catalog::bundled().expect("bundled catalog loads"),
            identity.clone(),
            completion,
        );

        TestApp {
            router: satchel_storefront::router(state, false),
            cookie: None,
            identity,
            completion: self.completion,
        }
    }
}

/// The storefront plus one browser's cookie jar.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    pub identity: Arc<FakeIdentity>,
    pub completion: Option<Arc<FakeCompletion>>,
}

impl TestApp {
    /// Storefront with no accounts and recommendations disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            identity: FakeIdentity::new(),
            completion: None,
            require_email_verification: false,
            state_dir: None,
        }
    }

    /// A second browser on the same storefront, with an empty cookie jar.
    #[must_use]
    pub fn new_browser(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
            identity: Arc::clone(&self.identity),
            completion: self.completion.clone(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::get(uri)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    pub async fn post(&mut self, uri: &str, body: &Value) -> TestResponse {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request.headers_mut().insert(
                header::COOKIE,
                cookie.parse().expect("cookie is a valid header value"),
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .expect("set-cookie is ASCII")
                .split(';')
                .next()
                .unwrap_or_default();
            self.cookie = Some(pair.to_owned());
        }

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
