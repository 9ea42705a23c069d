use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    response::Redirect,
};
use std::convert::Infallible;
use time::Duration;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{auth::sessions::SESSION_COOKIE, state::AppState};

/// Pull the session token out of the Cookie header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}

pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.whole_seconds()
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Resolves the session cookie to a user id; pages behind it bounce
/// anonymous visitors to the login form.
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Err(Redirect::to("/login"));
        };
        match state.sessions.lookup(token).await {
            Ok(Some(user_id)) => Ok(CurrentUser(user_id)),
            Ok(None) => {
                warn!("session token unknown or expired");
                Err(Redirect::to("/login"))
            }
            Err(e) => {
                error!(error = %e, "session lookup failed");
                Err(Redirect::to("/login"))
            }
        }
    }
}

/// Like `CurrentUser` but never rejects; pages that render for both signed-in
/// and anonymous visitors use this.
pub struct MaybeUser(pub Option<Uuid>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = match session_token(&parts.headers) {
            Some(token) => state.sessions.lookup(token).await.ok().flatten(),
            None => None,
        };
        Ok(MaybeUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn finds_session_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; session=abc123; lang=en");
        assert_eq!(session_token(&headers), Some("abc123"));
    }

    #[test]
    fn missing_cookie_header_yields_none() {
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn other_cookies_do_not_match() {
        let headers = headers_with_cookie("sessionx=abc; xsession=def");
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn set_cookie_carries_ttl_and_flags() {
        let cookie = session_cookie("tok", Duration::minutes(2));
        assert_eq!(cookie, "session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=120");
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(clear_session_cookie().ends_with("Max-Age=0"));
    }

    #[tokio::test]
    async fn current_user_resolves_a_live_session() {
        use crate::auth::sessions::SessionStore;
        use axum::http::Request;

        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = state
            .sessions
            .insert(user_id, Duration::hours(1))
            .await
            .unwrap();

        let request = Request::builder()
            .uri("/account")
            .header(header::COOKIE, format!("session={token}"))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let CurrentUser(resolved) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("session should resolve");
        assert_eq!(resolved, user_id);
    }

    #[tokio::test]
    async fn current_user_rejects_without_session() {
        use axum::http::Request;

        let state = AppState::fake();
        let request = Request::builder().uri("/account").body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        assert!(CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .is_err());
    }
}
