//! HTTP client for the delivery API.
//!
//! Provides a minimal client that attaches Basic credentials from an injected
//! `Session`, generic GET/POST/PUT/DELETE helpers, and one domain method per
//! endpoint (see `api`). Domain methods turn any transport or status failure
//! into a `ClientError` labeled with the operation that was attempted.

pub mod api;
pub mod session;

use std::time::Duration;

use anyhow::Context;
use delivery_core::{ClientConfig, ClientError, Operation};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

pub use session::{CredentialStore, Credentials, Session};

/// Failure of a single HTTP exchange, before it is tied to an operation.
#[derive(Debug)]
pub struct RequestError {
    /// Status code when the server answered with a non-success status.
    pub status: Option<u16>,
    pub source: anyhow::Error,
}

impl RequestError {
    fn transport(source: anyhow::Error) -> Self {
        Self {
            status: None,
            source,
        }
    }

    /// True when the server refused the credentials.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }

    /// Attach the operation this request belonged to.
    pub fn into_client_error(self, operation: Operation) -> ClientError {
        if self.is_auth_rejection() {
            tracing::warn!(%operation, "credentials rejected, sign in again");
        }
        tracing::debug!(
            %operation,
            status = ?self.status,
            error = %self.source,
            "request failed"
        );
        ClientError::request_failed(operation, self.status, &self.source)
    }
}

pub type RequestResult<T> = Result<T, RequestError>;

/// HTTP client for the delivery API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: String, session: Session, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &ClientConfig, session: Session) -> anyhow::Result<Self> {
        Self::new(
            config.api_url.clone(),
            session,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    /// Create client from environment (`DELIVERY_*`), signed in with whatever
    /// credentials the configured session file holds.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = ClientConfig::from_env().context("Invalid client configuration")?;
        let session = CredentialStore::new(&config.session_file)
            .session()
            .context("Failed to load stored session")?;
        Self::from_config(&config, session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.authorization_header() {
            Some(header) => request.header(reqwest::header::AUTHORIZATION, header),
            None => request,
        }
    }

    /// Send and fail on any non-success status, keeping the server's text.
    async fn send(&self, request: RequestBuilder) -> RequestResult<Response> {
        let response = request
            .send()
            .await
            .context("Failed to send request")
            .map_err(RequestError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RequestError {
                status: Some(status.as_u16()),
                source: anyhow::anyhow!(
                    "API request failed with status {}: {}",
                    status,
                    error_text
                ),
            });
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> RequestResult<T> {
        response
            .json()
            .await
            .context("Failed to parse response as JSON")
            .map_err(RequestError::transport)
    }

    /// Body as JSON, or `null` when the server sent nothing (or plain text).
    async fn read_json_lenient(response: Response) -> RequestResult<serde_json::Value> {
        let text = response
            .text()
            .await
            .context("Failed to read response body")
            .map_err(RequestError::transport)?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> RequestResult<T> {
        let url = self.build_url(path);
        tracing::debug!(method = "GET", %url, "sending request");
        let request = self.apply_auth(self.client.get(&url));
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> RequestResult<T> {
        let url = self.build_url(path);
        tracing::debug!(method = "POST", %url, "sending request");
        let request = self.apply_auth(self.client.post(&url).json(body));
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    /// POST JSON body; the response body is optional.
    pub async fn post_json_lenient<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> RequestResult<serde_json::Value> {
        let url = self.build_url(path);
        tracing::debug!(method = "POST", %url, "sending request");
        let request = self.apply_auth(self.client.post(&url).json(body));
        let response = self.send(request).await?;
        Self::read_json_lenient(response).await
    }

    /// POST without credentials (sign-in and sign-up); the response body is optional.
    pub async fn post_json_anonymous<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> RequestResult<serde_json::Value> {
        let url = self.build_url(path);
        tracing::debug!(method = "POST", %url, "sending anonymous request");
        let response = self.send(self.client.post(&url).json(body)).await?;
        Self::read_json_lenient(response).await
    }

    /// PUT without a body. Returns Ok(()) on success.
    pub async fn put_empty(&self, path: &str) -> RequestResult<()> {
        let url = self.build_url(path);
        tracing::debug!(method = "PUT", %url, "sending request");
        let request = self.apply_auth(self.client.put(&url));
        self.send(request).await?;
        Ok(())
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> RequestResult<()> {
        let url = self.build_url(path);
        tracing::debug!(method = "DELETE", %url, "sending request");
        let request = self.apply_auth(self.client.delete(&url));
        self.send(request).await?;
        Ok(())
    }
}
