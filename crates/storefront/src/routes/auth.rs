//! Authentication route handlers.
//!
//! Sign-in and sign-out go through the shopper's session observer; the
//! shopper's store listens to it and caches the user, so handlers never
//! write the user themselves.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{CurrentShopper, OptionalAuth};
use crate::models::User;
use crate::services::auth::{Registration, google_failure_notice, login_notice, logout_notice};
use crate::shoppers::Shopper;
use crate::state::AppState;
use crate::store::Notice;

// =============================================================================
// Request Types
// =============================================================================

/// Login request body.
///
/// Not `Debug`: carries the password.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Google sign-in request body: the id token from Google Identity Services.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleForm {
    pub id_token: String,
}

/// Forgot password request body.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// A started session.
#[derive(Debug, Serialize)]
pub struct SignedIn {
    pub user: User,
    pub notice: Notice,
    pub redirect: &'static str,
}

/// A notice plus where to go next.
#[derive(Debug, Serialize)]
pub struct NoticeResponse {
    pub notice: Notice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
}

/// The current session.
#[derive(Debug, Serialize)]
pub struct Me {
    pub user: Option<User>,
}

fn start_session(shopper: &Shopper, user: User) -> SignedIn {
    shopper.session().publish(Some(user.clone()));
    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("auth", "Signed in", Some(&[("user_id", user.id.as_str())]));

    SignedIn {
        notice: login_notice(&user),
        user,
        redirect: "/",
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Sign in with email and password.
#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn login(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(form): Json<LoginForm>,
) -> Result<Json<SignedIn>> {
    let user = state
        .auth()
        .login(&form.email, &form.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "login failed"))?;

    Ok(Json(start_session(&shopper, user)))
}

/// Register a new account.
///
/// Answers 201 with a session, or 202 when the account must verify its
/// email first.
#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn register(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(form): Json<RegisterForm>,
) -> Result<Response> {
    let registration = state
        .auth()
        .register(&form.name, &form.email, &form.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "registration failed"))?;

    let response = match registration {
        Registration::SignedIn(user) => {
            (StatusCode::CREATED, Json(start_session(&shopper, user))).into_response()
        }
        Registration::VerificationSent { email } => (
            StatusCode::ACCEPTED,
            Json(NoticeResponse {
                notice: Notice::info(
                    "Verify your email",
                    format!("We sent a verification link to {email}. Verify it, then sign in."),
                ),
                redirect: Some("/login"),
            }),
        )
            .into_response(),
    };
    Ok(response)
}

/// Sign in with a Google id token.
///
/// Failures answer with the provider error's status and a destructive
/// notice; the session is left as it was.
#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn google(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(form): Json<GoogleForm>,
) -> Response {
    match state.auth().sign_in_with_google(&form.id_token).await {
        Ok(user) => Json(start_session(&shopper, user)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "google sign-in failed");
            let error = AppError::from(e);
            (
                error.status(),
                Json(json!({
                    "error": error.message(),
                    "notice": google_failure_notice(),
                })),
            )
                .into_response()
        }
    }
}

/// Sign out. The cart, wishlist and history stay with the browser session.
#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn logout(CurrentShopper(shopper): CurrentShopper) -> Json<NoticeResponse> {
    shopper.session().publish(None);
    clear_sentry_user();
    add_breadcrumb("auth", "Signed out", None);

    Json(NoticeResponse {
        notice: logout_notice(),
        redirect: Some("/login"),
    })
}

/// Request a password reset email.
///
/// Reports success whether or not the address has an account.
#[instrument(skip(state))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(form): Json<ForgotPasswordForm>,
) -> Result<Json<NoticeResponse>> {
    state.auth().send_password_reset(&form.email).await?;

    Ok(Json(NoticeResponse {
        notice: Notice::info(
            "Check your email!",
            "If an account with that email exists, we have sent a password reset link.",
        ),
        redirect: None,
    }))
}

/// The signed-in user, if any.
pub async fn me(OptionalAuth(user): OptionalAuth) -> Json<Me> {
    Json(Me { user })
}
