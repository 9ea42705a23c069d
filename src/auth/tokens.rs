use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    state::AppState,
};

/// Claims carried by a password-reset token. Only the user id matters; the
/// expiry bounds how long the emailed link stays valid.
#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

/// Signs and verifies password-reset tokens (HS256, keyed by the app
/// secret). Expiry is checked with zero leeway so the configured TTL is
/// exact.
#[derive(Clone)]
pub struct ResetTokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for ResetTokenKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            &state.config.tokens.secret,
            state.config.tokens.reset_ttl_secs,
        )
    }
}

impl ResetTokenKeys {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn sign(&self, user_id: Uuid) -> AppResult<String> {
        self.sign_issued_at(user_id, OffsetDateTime::now_utc())
    }

    fn sign_issued_at(&self, user_id: Uuid, issued_at: OffsetDateTime) -> AppResult<String> {
        let claims = ResetClaims {
            sub: user_id,
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + self.ttl).unix_timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(e.into()))?;
        debug!(user_id = %user_id, "reset token signed");
        Ok(token)
    }

    /// Returns the embedded user id, or `AppError::Token` when the signature
    /// does not check out or the token has expired.
    pub fn verify(&self, token: &str) -> AppResult<Uuid> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        match decode::<ResetClaims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(e) => {
                warn!(error = %e, "reset token rejected");
                Err(AppError::Token("invalid or expired reset token".into()))
            }
        }
    }
}
