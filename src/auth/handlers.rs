use axum::{
    extract::{FromRef, Path, State},
    http::{header, HeaderMap},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use time::Duration;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm, ResetPasswordForm, ResetRequestForm},
        extractors::{clear_session_cookie, session_cookie, session_token, CurrentUser, MaybeUser},
        password::{hash_password, verify_password},
        repo::User,
        tokens::ResetTokenKeys,
    },
    errors::{AppError, AppResult},
    state::AppState,
};

// One message for unknown email and wrong password, so responses do not
// reveal which accounts exist.
const BAD_CREDENTIALS: &str = "Invalid email or password";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/reset_password", get(reset_request_page).post(reset_request))
        .route(
            "/reset_password/:token",
            get(reset_password_page).post(reset_password),
        )
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn validate_username(username: &str) -> AppResult<()> {
    if !(2..=20).contains(&username.chars().count()) {
        return Err(AppError::Validation(
            "Username must be between 2 and 20 characters".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < 8 {
        return Err(AppError::Validation("Password too short".into()));
    }
    Ok(())
}

async fn register_page(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(state.renderer.render("register", &json!({ "title": "Register" }))).into_response()
}

#[instrument(skip(state, form))]
async fn register(
    State(state): State<AppState>,
    Form(mut form): Form<RegisterForm>,
) -> AppResult<Response> {
    form.username = form.username.trim().to_string();
    form.email = form.email.trim().to_lowercase();

    validate_username(&form.username)?;
    validate_email(&form.email)?;
    validate_password(&form.password)?;

    if User::find_by_username(&state.db, &form.username).await?.is_some() {
        warn!(username = %form.username, "username already taken");
        return Err(AppError::Conflict("Username already taken".into()));
    }
    if User::find_by_email(&state.db, &form.email).await?.is_some() {
        warn!(email = %form.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&form.password)?;
    let user = User::create(&state.db, &form.username, &form.email, &hash).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(Redirect::to("/login").into_response())
}

async fn login_page(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(state.renderer.render("login", &json!({ "title": "Log in" }))).into_response()
}

#[instrument(skip(state, form))]
async fn login(
    State(state): State<AppState>,
    Form(mut form): Form<LoginForm>,
) -> AppResult<Response> {
    form.email = form.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &form.email).await? {
        Some(user) => user,
        None => {
            warn!(email = %form.email, "login with unknown email");
            return Err(AppError::Auth(BAD_CREDENTIALS.into()));
        }
    };

    if !verify_password(&form.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(AppError::Auth(BAD_CREDENTIALS.into()));
    }

    let ttl = if form.remember.is_some() {
        Duration::minutes(state.config.sessions.remember_ttl_minutes)
    } else {
        Duration::minutes(state.config.sessions.ttl_minutes)
    };
    let token = state.sessions.insert(user.id, ttl).await?;

    info!(user_id = %user.id, "user logged in");
    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token, ttl))]),
        Redirect::to("/"),
    )
        .into_response())
}

#[instrument(skip(state, headers))]
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Response> {
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(token).await?;
    }
    info!(user_id = %user_id, "user logged out");
    Ok((
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
        Redirect::to("/"),
    )
        .into_response())
}

async fn reset_request_page(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(
        state
            .renderer
            .render("reset_request", &json!({ "title": "Reset Password" })),
    )
    .into_response()
}

fn reset_email_body(link: &str) -> String {
    format!(
        "To reset your password, visit the following link:\n{link}\n\n\
         If you did not make this request then simply ignore this email \
         and no changes will be made.\n"
    )
}

/// Issue a reset token and hand the email off to the mail channel. The
/// response is identical whether or not the address is known, and delivery
/// runs detached: a failed send is logged and otherwise lost.
#[instrument(skip(state, form))]
async fn reset_request(
    State(state): State<AppState>,
    Form(form): Form<ResetRequestForm>,
) -> AppResult<Response> {
    let email = form.email.trim().to_lowercase();

    if let Some(user) = User::find_by_email(&state.db, &email).await? {
        let token = ResetTokenKeys::from_ref(&state).sign(user.id)?;
        let link = format!("{}/reset_password/{}", state.config.base_url, token);
        let mailer = state.mailer.clone();
        let to = user.email.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer
                .send(&to, "Password Reset Request", &reset_email_body(&link))
                .await
            {
                warn!(error = %e, "reset email delivery failed");
            }
        });
        info!(user_id = %user.id, "reset email queued");
    } else {
        warn!("password reset requested for unknown email");
    }

    Ok(Redirect::to("/login").into_response())
}

async fn reset_password_page(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Response> {
    // Reject dead tokens before showing the form, mirroring the submit path.
    ResetTokenKeys::from_ref(&state).verify(&token)?;
    Ok(Html(state.renderer.render(
        "reset_password",
        &json!({
            "title": "Choose a new password",
            "action": format!("/reset_password/{token}"),
        }),
    ))
    .into_response())
}

#[instrument(skip(state, token, form))]
async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> AppResult<Response> {
    let user_id = ResetTokenKeys::from_ref(&state).verify(&token)?;
    validate_password(&form.password)?;

    let hash = hash_password(&form.password)?;
    User::update_password(&state.db, user_id, &hash).await?;

    info!(user_id = %user_id, "password reset");
    Ok(Redirect::to("/login").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("user@nodot"));
    }

    #[test]
    fn username_length_bounds() {
        assert!(validate_username("ab").is_ok());
        assert!(validate_username(&"x".repeat(20)).is_ok());
        assert!(validate_username("a").is_err());
        assert!(validate_username(&"x".repeat(21)).is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
    }

    #[test]
    fn reset_email_contains_the_link() {
        let body = reset_email_body("http://localhost:8080/reset_password/abc");
        assert!(body.contains("http://localhost:8080/reset_password/abc"));
        assert!(body.contains("ignore this email"));
    }
}
