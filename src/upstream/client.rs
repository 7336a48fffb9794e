//! Backend HTTP client.
//!
//! # Responsibilities
//! - Join backend paths onto the configured base URL
//! - Issue exactly one request per call, bounded by the configured timeout
//! - Decode 2xx JSON bodies; leave status classification to the caller

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::BackendConfig;
use crate::error::GatewayError;
use crate::observability::metrics;

/// Transport or protocol failure talking to the backend. Always fatal.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid backend base URL: {0}")]
    BaseUrl(String),

    #[error("failed to read backend CA certificate '{path}': {source}")]
    CaCert {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build backend client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("backend request to '{endpoint}' failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed JSON from backend endpoint '{endpoint}': {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A backend path: an endpoint name plus an optional item identifier.
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    endpoint: &'static str,
    id: Option<&'a str>,
}

impl<'a> Resource<'a> {
    pub fn collection(endpoint: &'static str) -> Self {
        Self { endpoint, id: None }
    }

    pub fn item(endpoint: &'static str, id: &'a str) -> Self {
        Self {
            endpoint,
            id: Some(id),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }
}

/// Status and decoded body of one backend call.
///
/// `body` is only populated for 2xx replies that carried content.
#[derive(Debug)]
pub struct Reply<T> {
    pub status: StatusCode,
    pub body: Option<T>,
    endpoint: &'static str,
}

impl<T: Default> Reply<T> {
    /// Any status >= 300 is fatal. Yields the body, if any.
    pub fn success(self) -> Result<Option<T>, GatewayError> {
        if self.status.as_u16() >= 300 {
            return Err(GatewayError::UnexpectedStatus {
                endpoint: self.endpoint,
                status: self.status,
            });
        }
        Ok(self.body)
    }

    /// Any status >= 300 is fatal. An empty 2xx body decodes as the default.
    pub fn expect_success(self) -> Result<T, GatewayError> {
        Ok(self.success()?.unwrap_or_default())
    }

    /// 404 means "nothing there yet" and yields `None`; other statuses >= 300 are fatal.
    pub fn success_or_absent(self) -> Result<Option<T>, GatewayError> {
        if self.status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(self.expect_success()?))
    }
}

/// Single-attempt JSON client for the backend.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base: Url,
}

impl UpstreamClient {
    pub fn new(config: &BackendConfig) -> Result<Self, UpstreamError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::BaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(UpstreamError::BaseUrl(config.base_url.clone()));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        if let Some(path) = &config.ca_cert_path {
            let pem = std::fs::read(path).map_err(|source| UpstreamError::CaCert {
                path: path.clone(),
                source,
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(UpstreamError::Client)?;
            builder = builder.add_root_certificate(cert);
        }
        let http = builder.build().map_err(UpstreamError::Client)?;

        tracing::info!(
            base_url = %base,
            timeout_secs = config.timeout_secs,
            "Backend client initialized"
        );

        Ok(Self { http, base })
    }

    /// Absolute URL of a backend resource. Identifiers are percent-encoded as one segment.
    pub fn url_for(&self, resource: Resource<'_>, query: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(resource.endpoint);
            if let Some(id) = resource.id {
                segments.push(id);
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    pub async fn get<T>(&self, resource: Resource<'_>) -> Result<Reply<T>, UpstreamError>
    where
        T: DeserializeOwned,
    {
        self.call::<(), T>(Method::GET, resource, &[], None).await
    }

    pub async fn get_with_query<T>(
        &self,
        resource: Resource<'_>,
        query: &[(&str, &str)],
    ) -> Result<Reply<T>, UpstreamError>
    where
        T: DeserializeOwned,
    {
        self.call::<(), T>(Method::GET, resource, query, None).await
    }

    pub async fn put<B, T>(
        &self,
        resource: Resource<'_>,
        body: &B,
    ) -> Result<Reply<T>, UpstreamError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::PUT, resource, &[], Some(body)).await
    }

    pub async fn post<B, T>(
        &self,
        resource: Resource<'_>,
        body: &B,
    ) -> Result<Reply<T>, UpstreamError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::POST, resource, &[], Some(body)).await
    }

    pub async fn delete<T>(&self, resource: Resource<'_>) -> Result<Reply<T>, UpstreamError>
    where
        T: DeserializeOwned,
    {
        self.call::<(), T>(Method::DELETE, resource, &[], None).await
    }

    async fn call<B, T>(
        &self,
        method: Method,
        resource: Resource<'_>,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Reply<T>, UpstreamError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = resource.endpoint;
        let url = self.url_for(resource, query);
        let start = Instant::now();

        tracing::debug!(method = %method, url = %url, "Calling backend");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let transport = |source| UpstreamError::Transport { endpoint, source };
        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                metrics::record_upstream(endpoint, None, start);
                return Err(transport(source));
            }
        };
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;
        metrics::record_upstream(endpoint, Some(status.as_u16()), start);

        let body = if status.is_success() && !bytes.is_empty() {
            let decoded = serde_json::from_slice(&bytes)
                .map_err(|source| UpstreamError::Decode { endpoint, source })?;
            Some(decoded)
        } else {
            None
        };

        tracing::debug!(endpoint, status = status.as_u16(), "Backend replied");

        Ok(Reply {
            status,
            body,
            endpoint,
        })
    }
}
