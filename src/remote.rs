use std::time::Duration;

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RemoteError;

/// Thin JSON request wrapper around one `reqwest::Client`. Every call is
/// bounded by the client timeout so a hung connection cannot pin the sync
/// engine's single-flight guard. No retries here: the next sync attempt is
/// the retry mechanism.
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
}

/// Caller-side cancellation for an individual request (e.g. on UI teardown).
/// Aborting resolves the call to `RemoteError::Cancelled`, never to a
/// success, so no record can be marked synced by an abandoned push.
pub struct CancelHandle(AbortHandle);

impl CancelHandle {
    pub fn new_pair() -> (CancelHandle, AbortRegistration) {
        let (handle, registration) = AbortHandle::new_pair();
        (CancelHandle(handle), registration)
    }

    pub fn cancel(&self) {
        self.0.abort();
    }
}

impl RemoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let resp = self.http.get(self.url(path)).send().await?;
        decode(resp).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        decode(resp).await
    }

    /// POST where only success matters; the response body is discarded. The
    /// bulk `/sync` endpoints reply with nothing useful.
    pub async fn post_json_ok<B>(&self, path: &str, body: &B) -> Result<(), RemoteError>
    where
        B: Serialize + ?Sized,
    {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(error_for(status, resp).await);
        }
        Ok(())
    }

    pub async fn get_json_with_cancel<T: DeserializeOwned>(
        &self,
        path: &str,
        registration: AbortRegistration,
    ) -> Result<T, RemoteError> {
        match Abortable::new(self.get_json(path), registration).await {
            Ok(res) => res,
            Err(_aborted) => Err(RemoteError::Cancelled),
        }
    }

    pub async fn post_json_with_cancel<B, T>(
        &self,
        path: &str,
        body: &B,
        registration: AbortRegistration,
    ) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match Abortable::new(self.post_json(path, body), registration).await {
            Ok(res) => res,
            Err(_aborted) => Err(RemoteError::Cancelled),
        }
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, RemoteError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(error_for(status, resp).await);
    }
    Ok(resp.json::<T>().await?)
}

// Non-2xx: prefer the server-supplied message, fall back to a status-derived
// one.
async fn error_for(status: reqwest::StatusCode, resp: reqwest::Response) -> RemoteError {
    let message = match resp.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        Err(_) => None,
    };
    RemoteError::Status {
        status: status.as_u16(),
        message: message.unwrap_or_else(|| {
            format!(
                "request failed: {}",
                status.canonical_reason().unwrap_or("unknown status")
            )
        }),
    }
}
