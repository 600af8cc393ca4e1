use super::{Method, RequestConfig, Transport, TransportError, TransportResponse};
use crate::form::payload::{FileUpload, MultipartValue, Payload};
use crate::form::progress::UploadProgress;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Proxy};
use serde_json::Value;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Size of the slices a request body is streamed in, for progress reporting.
const UPLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    /// Relative submission URLs are resolved against this.
    pub base_url: Option<String>,
    pub proxy_url: Option<String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            base_url: None,
            proxy_url: None,
        }
    }
}

impl HttpTransportConfig {
    /// Defaults, overridden by `FORM_HTTP_*`, `FORM_BASE_URL` and `FORM_PROXY_URL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout: env_parse::<u64>("FORM_HTTP_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            pool_max_idle_per_host: env_parse("FORM_HTTP_POOL_MAX_IDLE_PER_HOST")
                .unwrap_or(defaults.pool_max_idle_per_host),
            pool_idle_timeout: env_parse::<u64>("FORM_HTTP_POOL_IDLE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.pool_idle_timeout),
            base_url: env::var("FORM_BASE_URL").ok().filter(|s| !s.is_empty()),
            proxy_url: env::var("FORM_PROXY_URL").ok().filter(|s| !s.is_empty()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}

/// reqwest-backed [`Transport`].
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-requested-with",
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(config.pool_idle_timeout));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy: {}", e),
                    ErrorContext::new()
                        .with_field_path("proxy_url")
                        .with_source("http_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        let base_url = config
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid base URL: {}", e),
                    ErrorContext::new()
                        .with_field_path("base_url")
                        .with_source("http_transport"),
                )
            })?;

        Ok(Self { client, base_url })
    }

    /// Resolve a submission URL against the configured base.
    pub fn resolve_url(&self, url: &str) -> std::result::Result<Url, TransportError> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => Ok(base.join(url)?),
                None => Err(url::ParseError::RelativeUrlWithoutBase.into()),
            },
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        payload: Payload,
        config: RequestConfig,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let url = self.resolve_url(url)?;
        let mut req = self.client.request(method.into(), url);

        if let Some(id) = &config.request_id {
            req = req.header("x-request-id", id);
        }

        let mut settled = None;
        req = match payload {
            Payload::Json(value) => {
                let body = Bytes::from(
                    serde_json::to_vec(&value).map_err(|e| TransportError::Other(e.to_string()))?,
                );
                let len = body.len() as u64;
                let loaded = Arc::new(AtomicU64::new(0));
                req.header(CONTENT_TYPE, "application/json")
                    .header(CONTENT_LENGTH, len)
                    .body(tracked_body(body, loaded, len, config.clone()))
            }
            Payload::Multipart(parts) => {
                let (form, done) = multipart_form(parts, &config)?;
                settled = done;
                req.multipart(form)
            }
        };

        let response = req.send().await?;
        if let Some(progress) = settled {
            config.report_progress(progress);
        }
        let status = response.status();
        let bytes = response.bytes().await?;
        let data = parse_body(&bytes);

        if status.is_success() {
            Ok(TransportResponse::new(status.as_u16(), data))
        } else {
            Err(TransportError::response(status.as_u16(), data))
        }
    }
}

/// Response bodies are JSON when they parse as JSON, otherwise text.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Stream `bytes` in chunks, reporting `loaded` against `total` as each chunk goes out.
fn tracked_body(bytes: Bytes, loaded: Arc<AtomicU64>, total: u64, config: RequestConfig) -> Body {
    let chunks: Vec<Bytes> = (0..bytes.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| bytes.slice(start..(start + UPLOAD_CHUNK_SIZE).min(bytes.len())))
        .collect();
    let chunks = chunks.into_iter().map(move |chunk| {
        let sent = loaded.fetch_add(chunk.len() as u64, Ordering::SeqCst) + chunk.len() as u64;
        config.report_progress(UploadProgress::new(sent, Some(total)));
        Ok::<_, std::io::Error>(chunk)
    });
    Body::wrap_stream(stream::iter(chunks))
}

/// Build the multipart body. The second value is the completion event to
/// report once the request is sent when no file bytes stream through the
/// tracked parts.
fn multipart_form(
    parts: Vec<(String, MultipartValue)>,
    config: &RequestConfig,
) -> std::result::Result<(reqwest::multipart::Form, Option<UploadProgress>), TransportError> {
    let total: u64 = parts
        .iter()
        .map(|(_, v)| match v {
            MultipartValue::Text(s) => s.len() as u64,
            MultipartValue::File(f) => f.len() as u64,
        })
        .sum();
    // text parts are small and go out with the headers; count them up front
    let text_bytes: u64 = parts
        .iter()
        .filter_map(|(_, v)| match v {
            MultipartValue::Text(s) => Some(s.len() as u64),
            MultipartValue::File(_) => None,
        })
        .sum();
    let loaded = Arc::new(AtomicU64::new(text_bytes));
    let settled = if total == text_bytes {
        // an empty body still counts as one unit so the percentage is defined
        let done = total.max(1);
        Some(UploadProgress::new(done, Some(done)))
    } else {
        None
    };

    let mut form = reqwest::multipart::Form::new();
    for (name, value) in parts {
        form = match value {
            MultipartValue::Text(text) => form.text(name, text),
            MultipartValue::File(file) => {
                form.part(name, file_part(file, Arc::clone(&loaded), total, config)?)
            }
        };
    }
    Ok((form, settled))
}

fn file_part(
    file: FileUpload,
    loaded: Arc<AtomicU64>,
    total: u64,
    config: &RequestConfig,
) -> std::result::Result<reqwest::multipart::Part, TransportError> {
    let len = file.len() as u64;
    let body = tracked_body(file.bytes, loaded, total, config.clone());
    let mut part = reqwest::multipart::Part::stream_with_length(body, len)
        .file_name(file.file_name.unwrap_or_else(|| "blob".to_string()));
    if let Some(mime) = file.mime {
        part = part
            .mime_str(&mime)
            .map_err(|e| TransportError::Other(format!("invalid MIME type '{}': {}", mime, e)))?;
    }
    Ok(part)
}
