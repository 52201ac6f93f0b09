/*!
 * HTTP transport abstraction.
 *
 * The executor only talks to a [`Transport`], which lets tests replace the
 * network with a scripted implementation. [`ReqwestTransport`] is the one
 * used in production.
 */

use async_trait::async_trait;
use reqwest::{Client, multipart};
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::request::{HttpRequest, HttpResponse, RequestBody};
use crate::errors::{DeepLError, Result};

/// Failure below the HTTP layer; every variant is treated as transient
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete in time
    #[error("request timed out: {0}")]
    Timeout(String),

    /// No connection could be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// Sending the request or reading the response failed
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

/// Sends a single HTTP request, without any retry logic
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Send `request` to the absolute `url` and buffer the response
    async fn send(&self, url: Url, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with connection pooling and keep-alive enabled
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(20)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| DeepLError::Connection(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one configured with a proxy
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, url: Url, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(request.method.clone(), url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Multipart { fields, file } => {
                let mut form = multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name.clone(), value.clone());
                }
                let part = multipart::Part::bytes(file.content.to_vec())
                    .file_name(file.filename.clone());
                builder.multipart(form.part(file.field_name.clone(), part))
            }
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(HttpResponse { status, body })
    }
}
