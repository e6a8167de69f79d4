//! Authenticated HTTP client for the backend REST contract.
//!
//! [`ApiClient`] is the single path every request takes: it injects the
//! bearer token, detects 401, coordinates a single-flight refresh, retries
//! the original request exactly once with the rotated token, and raises the
//! expired-session signal on terminal failure. Feature modules
//! ([`auth`], [`employees`], [`groups`], [`tasks`]) are thin typed wrappers
//! over it — none of them carries its own refresh-and-retry logic.
//!
//! Non-401 error statuses pass through untouched; interpreting a 400
//! validation payload or a 403 is the caller's job, not this layer's.

pub mod auth;
pub mod employees;
pub mod groups;
pub mod tasks;

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use taskdeck_common::ListPayload;

use crate::config::Config;
use crate::errors::{ApiError, AuthError};
use crate::session::{RefreshCoordinator, SessionEvents, TokenStore};

/// Authenticated client over the backend REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    store: Arc<TokenStore>,
    refresher: RefreshCoordinator,
    events: Arc<SessionEvents>,
}

impl ApiClient {
    /// Build a client from resolved configuration, opening the session
    /// store at its configured path.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let store = Arc::new(TokenStore::open(&config.session_file));
        Self::with_store(config, store, Arc::new(SessionEvents::new()))
    }

    /// Build a client over an existing store and event hub. Used wherever
    /// the caller needs to share or observe session state.
    pub fn with_store(
        config: &Config,
        store: Arc<TokenStore>,
        events: Arc<SessionEvents>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let refresher = RefreshCoordinator::new(http.clone(), &config.api_url, Arc::clone(&store));
        Ok(Self {
            http,
            base: config.api_url.trim_end_matches('/').to_string(),
            store,
            refresher,
            events,
        })
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Send one authenticated request.
    ///
    /// The flow mandated for every data-bearing call: inject the current
    /// access token; on 401 run the single-flight refresh and retry the
    /// original request exactly once with the rotated token. A second 401
    /// is terminal — the session is cleared and the expired signal fires
    /// rather than looping.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        let request_id = Uuid::new_v4();
        let access = self.store.access();

        debug!(%request_id, %method, path, "sending request");
        let response = self
            .dispatch(method.clone(), &url, body, access.as_deref())
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(%request_id, path, "unauthorized, refreshing access token");
        let rotated = match self.refresher.refresh(access.as_deref()).await {
            Ok(token) => token,
            Err(err) => {
                if err.is_terminal_auth() {
                    self.on_terminal_auth_failure();
                }
                return Err(err);
            }
        };

        let retried = self
            .dispatch(method, &url, body, Some(rotated.as_str()))
            .await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!(%request_id, path, "still unauthorized after refresh");
            self.on_terminal_auth_failure();
            return Err(AuthError::TokenNotAccepted.into());
        }
        Ok(retried)
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        access: Option<&str>,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self.http.request(method, url);
        if let Some(token) = access {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await
    }

    /// Clear the session and raise the one-shot expired signal.
    fn on_terminal_auth_failure(&self) {
        if let Err(err) = self.store.clear() {
            warn!(%err, "failed to clear session file");
        }
        if self.events.notify_expired() {
            warn!("session expired; login required");
        }
    }

    // ── Typed helpers used by the feature modules ─────────────────────

    /// GET a single object.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        context: &'static str,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, None).await?;
        decode(expect_success(response).await?, context).await
    }

    /// GET a collection, normalizing whichever envelope the backend used.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        context: &'static str,
    ) -> Result<Vec<T>, ApiError> {
        let response = self.send(Method::GET, path, None).await?;
        let payload: ListPayload<T> = decode(expect_success(response).await?, context).await?;
        Ok(payload.into_vec())
    }

    /// Send a body-bearing request and decode the response.
    pub(crate) async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        context: &'static str,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|source| ApiError::Decode {
            context,
            source,
        })?;
        let response = self.send(method, path, Some(&body)).await?;
        decode(expect_success(response).await?, context).await
    }

    /// DELETE, discarding any response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.send(Method::DELETE, path, None).await?;
        expect_success(response).await?;
        Ok(())
    }

    /// POST to an endpoint that takes no bearer token (login, password
    /// reset). No refresh, no retry.
    pub(crate) async fn post_public<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        context: &'static str,
    ) -> Result<T, ApiError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        decode(expect_success(response).await?, context).await
    }
}

/// Map non-2xx statuses to [`ApiError::Status`], body included verbatim.
async fn expect_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(
    response: Response,
    context: &'static str,
) -> Result<T, ApiError> {
    let raw = response.text().await?;
    serde_json::from_str(&raw).map_err(|source| ApiError::Decode { context, source })
}
