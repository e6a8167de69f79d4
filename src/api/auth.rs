//! Account endpoints: login, logout, registration, profile, password reset.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use taskdeck_common::{Role, User};

use crate::api::ApiClient;
use crate::errors::ApiError;

const LOGIN_PATH: &str = "/api/users/login/";
const LOGOUT_PATH: &str = "/api/users/logout/";
const REGISTER_PATH: &str = "/api/users/register/";
const PROFILE_PATH: &str = "/api/users/profile/";
const PASSWORD_RESET_PATH: &str = "/api/users/password-reset/";
const PASSWORD_RESET_CONFIRM_PATH: &str = "/api/users/password-reset-confirm/";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
    user: User,
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    refresh: &'a str,
}

/// Fields for registering a new account. Only admins and managers may
/// call this; the backend demotes manager-created accounts to employee.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Partial profile update; omitted fields are left unchanged.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

impl ApiClient {
    /// Log in with credentials, persisting the returned token pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let body: LoginResponse = self
            .post_public(LOGIN_PATH, &LoginRequest { username, password }, "login")
            .await?;
        self.store().set_tokens(&body.access, &body.refresh)?;
        debug!(username, "logged in");
        Ok(body.user)
    }

    /// Log out: blacklist the refresh token server-side, then drop the
    /// local session. The network half is best-effort — the local session
    /// is cleared even when the backend is unreachable.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(refresh) = self.store().refresh_token() {
            let result: Result<MessageResponse, ApiError> = self
                .send_json(
                    Method::POST,
                    LOGOUT_PATH,
                    &LogoutRequest { refresh: &refresh },
                    "logout",
                )
                .await;
            if let Err(err) = result {
                warn!(%err, "logout request failed; clearing local session anyway");
            }
        }
        self.store().clear()
    }

    /// Register a new user account (admin/manager only).
    pub async fn register(&self, new_user: &NewUser) -> Result<User, ApiError> {
        let body: UserEnvelope = self
            .send_json(Method::POST, REGISTER_PATH, new_user, "register")
            .await?;
        Ok(body.user)
    }

    /// Fetch the calling user's profile.
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.get_json(PROFILE_PATH, "profile").await
    }

    /// Update the calling user's profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let body: UserEnvelope = self
            .send_json(Method::PUT, PROFILE_PATH, update, "profile update")
            .await?;
        Ok(body.user)
    }

    /// Ask the backend to send a password-reset email. Always answers with
    /// a neutral message whether or not the address exists.
    pub async fn request_password_reset(&self, email: &str) -> Result<String, ApiError> {
        let body: MessageResponse = self
            .post_public(
                PASSWORD_RESET_PATH,
                &serde_json::json!({ "email": email }),
                "password reset",
            )
            .await?;
        Ok(body
            .message
            .unwrap_or_else(|| "If email exists, reset link sent".to_string()))
    }

    /// Complete a password reset with the uid/token pair from the email.
    pub async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        let body: MessageResponse = self
            .post_public(
                PASSWORD_RESET_CONFIRM_PATH,
                &serde_json::json!({ "uid": uid, "token": token, "password": password }),
                "password reset confirm",
            )
            .await?;
        Ok(body
            .message
            .unwrap_or_else(|| "Password updated".to_string()))
    }
}
