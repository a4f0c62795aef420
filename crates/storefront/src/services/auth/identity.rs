//! Identity provider boundary.
//!
//! [`FirebaseIdentityClient`] talks to the Identity Toolkit REST API
//! (`accounts:*` endpoints). Tests substitute their own [`IdentityProvider`].

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;

use satchel_core::Email;

use crate::config::IdentityConfig;

use super::AuthError;

/// Provider id of Google sign-in.
pub const GOOGLE_PROVIDER_ID: &str = "google.com";

/// An authenticated account as reported by the identity provider.
#[derive(Debug, Clone)]
pub struct ProviderAccount {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    /// Short-lived provider token for follow-up calls on this account.
    pub id_token: SecretString,
}

/// Operations the storefront needs from an identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password.
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<ProviderAccount, AuthError>;

    /// Create an email/password account, optionally setting a display name.
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<ProviderAccount, AuthError>;

    /// Exchange a federated provider's id token (e.g. Google) for an account.
    async fn sign_in_with_idp(
        &self,
        provider_id: &str,
        id_token: &str,
    ) -> Result<ProviderAccount, AuthError>;

    /// Email a password reset link.
    async fn send_password_reset(&self, email: &Email) -> Result<(), AuthError>;

    /// Email a verification link to the account behind `id_token`.
    async fn send_email_verification(&self, id_token: &SecretString) -> Result<(), AuthError>;
}

/// Identity Toolkit REST client.
#[derive(Clone)]
pub struct FirebaseIdentityClient {
    inner: Arc<FirebaseInner>,
}

struct FirebaseInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    request_uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseIdentityClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &IdentityConfig, request_uri: &str) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self {
            inner: Arc::new(FirebaseInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.clone(),
                request_uri: request_uri.to_owned(),
            }),
        })
    }

    /// `accounts:{method}` URL with the API key attached.
    fn endpoint(&self, method: &str) -> Result<url::Url, AuthError> {
        url::Url::parse_with_params(
            &format!("{}/accounts:{method}", self.inner.base_url),
            &[("key", self.inner.api_key.expose_secret())],
        )
        .map_err(|e| AuthError::Parse(format!("invalid identity endpoint: {e}")))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, AuthError> {
        let url = self.endpoint(method)?;
        let response = self
            .inner
            .client
            .post(url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| AuthError::Parse(e.to_string()))
        } else {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            tracing::debug!(%method, %status, %message, "identity provider rejected request");
            Err(AuthError::from_provider_message(&message))
        }
    }

    async fn lookup(&self, id_token: &str) -> Result<LookupUser, AuthError> {
        let response: LookupResponse = self.call("lookup", json!({ "idToken": id_token })).await?;
        response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::Parse("lookup returned no users".to_owned()))
    }
}

impl From<TokenResponse> for ProviderAccount {
    fn from(token: TokenResponse) -> Self {
        Self {
            uid: token.local_id,
            display_name: token.display_name.filter(|name| !name.is_empty()),
            email: token.email,
            email_verified: token.email_verified.unwrap_or(false),
            id_token: SecretString::from(token.id_token),
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<ProviderAccount, AuthError> {
        let token: TokenResponse = self
            .call(
                "signInWithPassword",
                json!({ "email": email.as_str(), "password": password, "returnSecureToken": true }),
            )
            .await?;

        // The password endpoint does not report verification status.
        let profile = self.lookup(&token.id_token).await?;
        let mut account = ProviderAccount::from(token);
        account.email_verified = profile.email_verified;
        if account.display_name.is_none() {
            account.display_name = profile.display_name.filter(|name| !name.is_empty());
        }
        Ok(account)
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<ProviderAccount, AuthError> {
        let token: TokenResponse = self
            .call(
                "signUp",
                json!({ "email": email.as_str(), "password": password, "returnSecureToken": true }),
            )
            .await?;
        let mut account = ProviderAccount::from(token);

        if let Some(name) = display_name.map(str::trim).filter(|name| !name.is_empty()) {
            let _: serde_json::Value = self
                .call(
                    "update",
                    json!({
                        "idToken": account.id_token.expose_secret(),
                        "displayName": name,
                        "returnSecureToken": false,
                    }),
                )
                .await?;
            account.display_name = Some(name.to_owned());
        }
        Ok(account)
    }

    #[instrument(skip(self, id_token))]
    async fn sign_in_with_idp(
        &self,
        provider_id: &str,
        id_token: &str,
    ) -> Result<ProviderAccount, AuthError> {
        let post_body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id_token", id_token)
            .append_pair("providerId", provider_id)
            .finish();
        let token: TokenResponse = self
            .call(
                "signInWithIdp",
                json!({
                    "postBody": post_body,
                    "requestUri": self.inner.request_uri,
                    "returnIdpCredential": true,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        Ok(token.into())
    }

    #[instrument(skip(self), fields(email = %email))]
    async fn send_password_reset(&self, email: &Email) -> Result<(), AuthError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                json!({ "requestType": "PASSWORD_RESET", "email": email.as_str() }),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, id_token))]
    async fn send_email_verification(&self, id_token: &SecretString) -> Result<(), AuthError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                json!({ "requestType": "VERIFY_EMAIL", "idToken": id_token.expose_secret() }),
            )
            .await?;
        Ok(())
    }
}
