//! HTTP transport backed by reqwest
//!
//! Executes prepared requests as tokio tasks against a shared reqwest
//! client. Cancellation aborts the task; redirects are followed by the
//! client, so the delivered metadata carries the final URL.

use super::types::{
    CancelHandle, RawResponse, ResponseMeta, Transport, TransportCallback, TransportFailure,
    TransportFailureKind,
};
use super::PreparedRequest;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("fetchkit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpTransportConfig {
    /// Create a new config builder
    pub fn builder() -> HttpTransportConfigBuilder {
        HttpTransportConfigBuilder::default()
    }
}

/// Builder for HTTP transport config
#[derive(Default)]
pub struct HttpTransportConfigBuilder {
    config: HttpTransportConfig,
}

impl HttpTransportConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpTransportConfig {
        self.config
    }
}

/// Transport executing requests over HTTP with reqwest.
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
    runtime: Handle,
}

impl HttpTransport {
    /// Create a transport with default configuration.
    ///
    /// Must be called within a tokio runtime; submissions are spawned onto
    /// the runtime that is current at construction time.
    pub fn new() -> Self {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a transport with custom configuration.
    ///
    /// Must be called within a tokio runtime.
    pub fn with_config(config: HttpTransportConfig) -> Self {
        Self::with_runtime(config, Handle::current())
    }

    /// Create a transport spawning submissions onto the given runtime.
    pub fn with_runtime(config: HttpTransportConfig, runtime: Handle) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            config,
            runtime,
        }
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    async fn perform(
        client: Client,
        default_headers: HashMap<String, String>,
        prepared: PreparedRequest,
    ) -> Result<RawResponse, TransportFailure> {
        let mut request = client.request(prepared.method().clone(), prepared.url().clone());

        for (key, value) in &default_headers {
            request = request.header(key.as_str(), value.as_str());
        }
        request = request.headers(prepared.headers().clone());

        if let Some(body) = prepared.request_body() {
            request = request.body(body.clone());
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        debug!("received {} from {}", status.as_u16(), url);

        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(RawResponse {
            meta: ResponseMeta::new(url, status, headers),
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn submit(&self, request: PreparedRequest, on_complete: TransportCallback) -> CancelHandle {
        debug!("submitting {} {}", request.method(), request.url());

        let client = self.client.clone();
        let default_headers = self.config.default_headers.clone();
        let task = self.runtime.spawn(async move {
            let outcome = Self::perform(client, default_headers, request).await;
            if let Err(failure) = &outcome {
                warn!("transport failure: {}", failure.message);
            }
            on_complete(outcome);
        });

        CancelHandle::new(move || task.abort())
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Map a reqwest error to a transport failure, classifying common
/// connectivity conditions.
fn map_reqwest_error(error: reqwest::Error) -> TransportFailure {
    let kind = if error.is_timeout() {
        TransportFailureKind::Timeout
    } else if error.is_connect() {
        TransportFailureKind::ConnectionFailed
    } else {
        TransportFailureKind::Other
    };

    TransportFailure {
        kind,
        message: error.to_string(),
        source: Some(std::sync::Arc::new(error)),
    }
}
