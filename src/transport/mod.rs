//! Transport seam.
//!
//! A [`Form`](crate::Form) never talks to the network itself. It hands a
//! built [`Payload`] to a [`Transport`], which performs the request and
//! reports upload progress through the [`RequestConfig`] it receives.

pub mod http;

pub use http::{HttpTransport, HttpTransportConfig};

use crate::form::payload::Payload;
use crate::form::progress::UploadProgress;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// HTTP verbs a submission can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Post, Method::Patch, Method::Put, Method::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "post" => Ok(Method::Post),
            "patch" => Ok(Method::Patch),
            "put" => Ok(Method::Put),
            "delete" => Ok(Method::Delete),
            _ => Err(crate::Error::validation_with_context(
                format!("unsupported submission method '{}'", s),
                crate::ErrorContext::new()
                    .with_field_path("method")
                    .with_details("expected one of post, patch, put, delete"),
            )),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Upload progress callback.
pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// Per-request configuration handed to the transport.
#[derive(Clone, Default)]
pub struct RequestConfig {
    /// Correlation id for the submission, if any.
    pub request_id: Option<String>,
    pub on_upload_progress: Option<ProgressCallback>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn on_upload_progress(
        mut self,
        callback: impl Fn(UploadProgress) + Send + Sync + 'static,
    ) -> Self {
        self.on_upload_progress = Some(Arc::new(callback));
        self
    }

    /// Forward a progress event to the callback, if one is set.
    pub fn report_progress(&self, progress: UploadProgress) {
        if let Some(callback) = &self.on_upload_progress {
            callback(progress);
        }
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("request_id", &self.request_id)
            .field("on_upload_progress", &self.on_upload_progress.is_some())
            .finish()
    }
}

/// A successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub data: Value,
}

impl TransportResponse {
    pub fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }
}

/// Anything that can carry a submission to the server.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        url: &str,
        payload: Payload,
        config: RequestConfig,
    ) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with HTTP {status}")]
    Response { status: u16, data: Value },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn response(status: u16, data: Value) -> Self {
        TransportError::Response { status, data }
    }

    /// HTTP status of the failed response, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Response { status, .. } => Some(*status),
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Body of the failed response, if the server answered.
    pub fn response_body(&self) -> Option<&Value> {
        match self {
            TransportError::Response { data, .. } => Some(data),
            _ => None,
        }
    }
}
