use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    accounts::{
        dto::{
            ForgotPasswordRequest, MessageResponse, PublicUser, ResetPasswordRequest,
            SigninRequest, SigninResponse, SignupRequest,
        },
        model::NewAccount,
        reset::{generate_reset_token, RESET_TOKEN_TTL},
    },
    auth::{
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::AppError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

/// Emails are matched exactly after trimming and lowercasing; the same
/// normalization runs at every entry point.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!(email = %email, "signup invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    if payload.password != payload.confirm_password {
        warn!(email = %email, "signup password mismatch");
        return Err(AppError::Validation("Passwords do not match".into()));
    }

    let password_hash = hash_password(&payload.password, state.config.hash_cost)?;

    // No check-then-insert here: the store's unique index decides.
    let account = state
        .store
        .create(NewAccount {
            fullname: payload.fullname,
            email,
            password_hash,
            school: payload.school,
        })
        .await?;

    info!(account_id = %account.id, email = %account.email, "account created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Signup successful")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<SigninResponse>, AppError> {
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!(email = %email, "signin invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    // Unknown email and wrong password produce the same error on purpose.
    let account = state
        .store
        .find_by_email(&email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "signin unknown email");
            AppError::InvalidCredentials
        })?;

    if !verify_password(&payload.password, &account.password_hash)? {
        warn!(account_id = %account.id, "signin invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(&state).sign_session(account.id)?;

    info!(account_id = %account.id, "signin successful");
    Ok(Json(SigninResponse {
        message: "Signin successful".into(),
        token,
        user: PublicUser::from(account),
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = normalize_email(&payload.email);

    // 404 reveals whether an account exists. The original behaves this way
    // and the frontend depends on it; kept as-is.
    let mut account = state
        .store
        .find_by_email(&email)
        .await?
        .ok_or(AppError::NotFound)?;

    // Overwrites any pending token: latest token wins.
    let token = generate_reset_token();
    let expiry = OffsetDateTime::now_utc() + RESET_TOKEN_TTL;
    account.set_pending_reset(token.clone(), expiry);
    state.store.save(&account).await?;

    // If this fails the token stays persisted and valid; the client sees 500
    // and retries, which issues a fresh token.
    state
        .mailer
        .send_reset_email(&account.email, &token)
        .await
        .map_err(|e| {
            error!(account_id = %account.id, error = ?e, "reset email failed");
            AppError::Internal(e)
        })?;

    info!(account_id = %account.id, "reset token issued");
    Ok(Json(MessageResponse::new("Password reset email sent")))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let now = OffsetDateTime::now_utc();

    // Wrong and expired tokens are indistinguishable here, by contract.
    let mut account = state
        .store
        .find_by_active_reset_token(&payload.token, now)
        .await?
        .ok_or_else(|| {
            warn!("reset with invalid or expired token");
            AppError::InvalidOrExpiredToken
        })?;

    account.password_hash = hash_password(&payload.new_password, state.config.hash_cost)?;
    account.clear_pending_reset();
    // One write: the new hash lands together with the token being cleared.
    state.store.save(&account).await?;

    info!(account_id = %account.id, "password reset");
    Ok(Json(MessageResponse::new("Password has been reset")))
}
