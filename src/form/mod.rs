//! Submission controller.
//!
//! A [`Form`] tracks one logical resource being created or updated. Each
//! submission resets progress and errors, builds the request payload, hands
//! it to the transport and, when the server rejects the data with a 422,
//! records the field errors in the form's [`ErrorBag`].
//!
//! Overlapping submissions on one form are not coordinated unless the form
//! was built with [`FormBuilder::exclusive`]: the last call to write
//! `progress`, `errors` or the pending flag wins.

pub mod builder;
pub mod observer;
pub mod payload;
pub mod progress;

pub use builder::FormBuilder;
pub use observer::{FormEvent, FormObserver, InMemoryObserver, NoopObserver};
pub use payload::{FileUpload, FormData, FormValue, MultipartValue, Payload};
pub use progress::UploadProgress;

use crate::bag::{ErrorBag, ErrorBody};
use crate::transport::{Method, RequestConfig, Transport, TransportError};
use crate::{Error, Result};
use progress::ProgressCell;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// HTTP status carrying a validation error bag.
pub const UNPROCESSABLE_ENTITY: u16 = 422;

/// Point-in-time view of a form's observable state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSnapshot {
    pub progress: u8,
    pub is_pending: bool,
    pub errors: ErrorBag,
}

pub struct Form {
    transport: Arc<dyn Transport>,
    observer: Arc<dyn FormObserver>,
    exclusive: bool,
    progress: Arc<ProgressCell>,
    pending: AtomicBool,
    errors: Mutex<ErrorBag>,
}

/// Clears the pending flag when the submission ends, even if its future is dropped.
struct PendingGuard<'a> {
    form: &'a Form,
    submission_id: String,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.form.pending.store(false, Ordering::SeqCst);
        self.form.observer.notify(&FormEvent::Finished {
            submission_id: std::mem::take(&mut self.submission_id),
        });
    }
}

impl Form {
    /// Form using the process-wide default transport.
    pub fn new() -> Result<Self> {
        FormBuilder::new().build()
    }

    pub fn builder() -> FormBuilder {
        FormBuilder::new()
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::from_parts(transport, observer::noop_observer(), false)
    }

    pub(crate) fn from_parts(
        transport: Arc<dyn Transport>,
        observer: Arc<dyn FormObserver>,
        exclusive: bool,
    ) -> Self {
        Self {
            transport,
            observer,
            exclusive,
            progress: Arc::new(ProgressCell::default()),
            pending: AtomicBool::new(false),
            errors: Mutex::new(ErrorBag::new()),
        }
    }

    /// Upload progress of the current request, 0..=100.
    pub fn progress(&self) -> u8 {
        self.progress.get()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Copy of the current error bag.
    pub fn errors(&self) -> ErrorBag {
        self.bag().clone()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.bag().has(field)
    }

    /// First error message for a field.
    pub fn error(&self, field: &str) -> Option<String> {
        self.bag().get(field).map(str::to_string)
    }

    pub fn clear_error(&self, field: &str) {
        self.bag().clear_field(field);
        self.observer.notify(&FormEvent::ErrorsCleared {
            field: Some(field.to_string()),
        });
    }

    pub fn clear_errors(&self) {
        self.bag().clear();
        self.observer.notify(&FormEvent::ErrorsCleared { field: None });
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            progress: self.progress(),
            is_pending: self.is_pending(),
            errors: self.errors(),
        }
    }

    /// Whether any top-level field of `data` is a file.
    pub fn has_files(data: &FormData) -> bool {
        data.has_files()
    }

    /// Submit `data` to `url` with the given method and return the response body.
    ///
    /// On failure the transport error is returned as-is; a 422 response with
    /// a recognizable body also fills the error bag first.
    pub async fn submit(&self, method: Method, url: &str, data: FormData) -> Result<Value> {
        if self.exclusive
            && self
                .pending
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
        {
            return Err(Error::SubmissionInProgress);
        }

        self.progress.reset();
        self.clear_errors();
        self.pending.store(true, Ordering::SeqCst);

        let submission_id = Uuid::new_v4().to_string();
        let guard = PendingGuard {
            form: self,
            submission_id: submission_id.clone(),
        };
        self.observer.notify(&FormEvent::Started {
            submission_id: submission_id.clone(),
            method,
            url: url.to_string(),
        });

        let payload = Payload::from_form_data(data);
        debug!(
            submission_id = %submission_id,
            %method,
            url,
            multipart = payload.is_multipart(),
            "submitting form"
        );

        let config = self.request_config(&submission_id);
        let result = match self.transport.send(method, url, payload, config).await {
            Ok(response) => {
                info!(submission_id = %submission_id, status = response.status, "form submitted");
                self.observer.notify(&FormEvent::Succeeded {
                    submission_id: submission_id.clone(),
                    status: response.status,
                });
                Ok(response.data)
            }
            Err(err) => {
                let validation = self.handle_error(&err);
                warn!(
                    submission_id = %submission_id,
                    status = ?err.status(),
                    validation,
                    "form submission failed: {}",
                    err
                );
                self.observer.notify(&FormEvent::Failed {
                    submission_id: submission_id.clone(),
                    status: err.status(),
                    validation,
                });
                Err(Error::Transport(err))
            }
        };

        drop(guard);
        result
    }

    /// Parse a method name (case-insensitive) and [`submit`](Self::submit).
    pub async fn submit_named(&self, method: &str, url: &str, data: FormData) -> Result<Value> {
        let method = method.parse::<Method>()?;
        self.submit(method, url, data).await
    }

    pub async fn post(&self, url: &str, data: FormData) -> Result<Value> {
        self.submit(Method::Post, url, data).await
    }

    pub async fn patch(&self, url: &str, data: FormData) -> Result<Value> {
        self.submit(Method::Patch, url, data).await
    }

    pub async fn put(&self, url: &str, data: FormData) -> Result<Value> {
        self.submit(Method::Put, url, data).await
    }

    pub async fn delete(&self, url: &str, data: FormData) -> Result<Value> {
        self.submit(Method::Delete, url, data).await
    }

    /// Create or update `resource` depending on whether it has an `id`.
    ///
    /// With an id the resource is patched at `{url}/{id}` (trailing slashes
    /// of `url` removed); without one it is posted to `url`.
    pub async fn save(&self, url: &str, resource: FormData) -> Result<Value> {
        match resource.get("id") {
            Some(id) => {
                let url = resource_url(url, &id.to_path_segment());
                self.patch(&url, resource).await
            }
            None => self.post(url, resource).await,
        }
    }

    fn request_config(&self, submission_id: &str) -> RequestConfig {
        let progress = Arc::clone(&self.progress);
        let observer = Arc::clone(&self.observer);
        let id = submission_id.to_string();
        RequestConfig::new()
            .with_request_id(submission_id)
            .on_upload_progress(move |event| {
                if let Some(percent) = event.percent() {
                    progress.set(percent);
                    observer.notify(&FormEvent::Progress {
                        submission_id: id.clone(),
                        percent,
                    });
                }
            })
    }

    /// Record a 422 error bag. Returns whether the bag was populated.
    fn handle_error(&self, err: &TransportError) -> bool {
        let TransportError::Response { status, data } = err else {
            return false;
        };
        if *status != UNPROCESSABLE_ENTITY {
            return false;
        }
        match ErrorBody::parse(data) {
            Some(body) => {
                let messages = body.into_messages();
                debug!(fields = messages.len(), "recorded validation errors");
                self.bag().set(messages);
                true
            }
            None => {
                debug!("422 response body is not an error bag, leaving errors untouched");
                false
            }
        }
    }

    fn bag(&self) -> MutexGuard<'_, ErrorBag> {
        self.errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("progress", &self.progress())
            .field("is_pending", &self.is_pending())
            .field("errors", &self.errors())
            .field("exclusive", &self.exclusive)
            .finish()
    }
}

/// `url` without trailing slashes, then `/{id}`.
pub fn resource_url(url: &str, id: &str) -> String {
    format!("{}/{}", url.trim_end_matches('/'), id)
}
