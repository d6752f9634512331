//! HTTP seam between the TMDB client and the network.
//!
//! TMDB is read with plain `GET`s returning JSON, so a request is just a URL
//! and a response is a status plus body bytes. Unit tests swap in
//! [`MockTransport`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// A `GET` for a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response carrying `body` serialized as JSON.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string().into_bytes(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Body as lossy UTF-8, for error messages.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("request timed out: GET {url}")]
    Timeout { url: String },

    #[error("no mock response registered for GET {url}")]
    NoMockResponse { url: String },
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

#[cfg(feature = "tmdb")]
pub mod reqwest_transport {
    use std::time::Duration;

    use reqwest::header::{ACCEPT, HeaderValue};

    use super::*;

    /// Transport backed by a shared `reqwest::Client`.
    #[derive(Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(client: reqwest::Client) -> Self {
            Self { client }
        }

        pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
            reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(concat!("reelsync/", env!("CARGO_PKG_VERSION")))
                .build()
                .map(Self::new)
                .map_err(|e| HttpError::Transport(e.to_string()))
        }
    }

    fn classify(url: &str, err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout {
                url: url.to_string(),
            }
        } else {
            HttpError::Transport(err.to_string())
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let resp = self
                .client
                .get(&request.url)
                .header(ACCEPT, HeaderValue::from_static("application/json"))
                .send()
                .await
                .map_err(|e| classify(&request.url, e))?;

            let status = resp.status().as_u16();
            let body = resp
                .bytes()
                .await
                .map_err(|e| classify(&request.url, e))?;

            Ok(HttpResponse {
                status,
                body: body.to_vec(),
            })
        }
    }
}

// ─── Test transport ─────────────────────────────────────────────────────────

#[cfg(test)]
pub use mock::MockTransport;
