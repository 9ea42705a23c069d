use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration form body.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form body. `remember` arrives as a checkbox value when ticked.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember: Option<String>,
}

/// Body of the request-a-reset form.
#[derive(Debug, Deserialize)]
pub struct ResetRequestForm {
    pub email: String,
}

/// Body of the set-new-password form.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
}

/// Profile fields safe to hand to the presentation layer.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&crate::auth::repo::User> for PublicUser {
    fn from(user: &crate::auth::repo::User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
