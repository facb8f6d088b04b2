//! Authenticated HTTP plumbing for the service-management API.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::credentials::CredentialStore;
use crate::error::{ClientError, Result};
use crate::session::SessionGuard;

/// Client for the remote service API. Attaches the stored bearer token to
/// every authenticated request at send time (the credential may change
/// mid-session) and always speaks JSON. Owns the 401 teardown: the store
/// is cleared and the guard notified before [`ClientError::AuthExpired`]
/// is returned, so the caller's nominal paths never run.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    store: CredentialStore,
    guard: Arc<dyn SessionGuard>,
}

impl ApiClient {
    pub fn new(base: &str, store: CredentialStore, guard: Arc<dyn SessionGuard>) -> Result<Self> {
        let mut base: Url = base
            .parse()
            .map_err(|err| ClientError::Validation(format!("invalid API base url: {err}")))?;
        // Endpoint paths are joined relative to the base; a missing trailing
        // slash would swallow its last path segment.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let http = reqwest::Client::builder().build()?;
        Ok(ApiClient {
            http,
            base,
            store,
            guard,
        })
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    fn endpoint(&self, path: &str) -> Url {
        // Paths are static, relative, and known to join.
        self.base
            .join(path)
            .unwrap_or_else(|_| self.base.clone())
    }

    /// Clear both credential surfaces and notify the guard. Returns the
    /// error value the interrupted operation must propagate.
    fn tear_down(&self) -> ClientError {
        if let Err(err) = self.store.clear() {
            warn!(%err, "failed to clear stored credential");
        }
        self.guard.session_expired();
        ClientError::AuthExpired
    }

    fn bearer(&self) -> Result<String> {
        match self.store.get() {
            Some(token) => Ok(format!("Bearer {token}")),
            // An absent credential gets the same handling as a 401, without
            // a request ever being issued.
            None => {
                debug!("no stored credential; tearing session down");
                Err(self.tear_down())
            }
        }
    }

    /// Authenticated GET returning the decoded JSON body.
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let bearer = self.bearer()?;
        let response = self
            .http
            .get(self.endpoint(path))
            .header(AUTHORIZATION, bearer)
            .send()
            .await?;
        self.decode(response).await
    }

    /// Authenticated POST with a JSON body, returning the decoded JSON body.
    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let bearer = self.bearer()?;
        let response = self
            .http
            .post(self.endpoint(path))
            .header(AUTHORIZATION, bearer)
            .json(body)
            .send()
            .await?;
        self.decode(response).await
    }

    /// Unauthenticated POST. No bearer header, and a 401 here is an
    /// application error for the caller to interpret, not a teardown.
    pub async fn post_public<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(StatusCode, Vec<u8>)> {
        let response = self
            .http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        Ok((status, bytes.to_vec()))
    }

    async fn decode(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(self.tear_down());
        }
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::Application {
                status: status.as_u16(),
                message: extract_message(&bytes)
                    .unwrap_or_else(|| status_text(status)),
            });
        }
        // An empty success body is tolerated; several endpoints return none.
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| ClientError::Format(format!("response body is not valid JSON: {err}")))
    }
}

/// Pull a human-readable message out of a JSON error body: `detail` first,
/// then `message`. `None` when the body is not JSON or has neither field.
pub(crate) fn extract_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    for key in ["detail", "message"] {
        if let Some(text) = value.get(key).and_then(Value::as_str) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

pub(crate) fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}
