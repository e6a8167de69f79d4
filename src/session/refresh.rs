//! Single-flight access-token refresh.
//!
//! N requests can hit 401 at the same moment; they must not fan out into
//! N refresh calls racing to overwrite each other's tokens. All callers
//! funnel through one coordinator: the first caller through the gate
//! performs the network exchange, and everyone queued behind it observes
//! the rotated token and returns without touching the network.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::{ApiError, AuthError};
use crate::session::store::TokenStore;

const REFRESH_PATH: &str = "/api/users/token/refresh/";

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Serializes concurrent refresh attempts against one [`TokenStore`].
pub struct RefreshCoordinator {
    http: reqwest::Client,
    refresh_url: String,
    store: Arc<TokenStore>,
    gate: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new(http: reqwest::Client, api_url: &str, store: Arc<TokenStore>) -> Self {
        Self {
            http,
            refresh_url: format!("{}{}", api_url.trim_end_matches('/'), REFRESH_PATH),
            store,
            gate: Mutex::new(()),
        }
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// `observed_access` is the access token the caller just saw rejected.
    /// If the stored token already differs by the time this caller gets
    /// through the gate, another caller refreshed first and the stored
    /// token is returned as-is. Under N concurrent 401s exactly one
    /// network exchange happens.
    ///
    /// With no stored refresh token this fails immediately, without a
    /// network call. A rejected refresh clears the session; a transport
    /// error leaves it intact so the caller can retry later.
    pub async fn refresh(&self, observed_access: Option<&str>) -> Result<String, ApiError> {
        let _permit = self.gate.lock().await;

        if let Some(current) = self.store.access() {
            if observed_access != Some(current.as_str()) {
                debug!("access token already rotated by a concurrent refresh");
                return Ok(current);
            }
        }

        let refresh = self
            .store
            .refresh_token()
            .ok_or(AuthError::NoRefreshToken)?;

        debug!("exchanging refresh token for a new access token");
        let response = self
            .http
            .post(&self.refresh_url)
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "refresh rejected, clearing session");
            self.store.clear()?;
            return Err(AuthError::RefreshRejected {
                status: status.as_u16(),
            }
            .into());
        }

        let body: RefreshResponse = response.json().await?;
        self.store.set_access(&body.access)?;
        debug!("access token rotated");
        Ok(body.access)
    }
}
