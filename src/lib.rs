//! # form-submit
//!
//! Submission lifecycle for forms backed by an HTTP API.
//!
//! A [`Form`] submits key/value data (or multipart data when a file is
//! attached), tracks whether a request is pending and how much of it has
//! been uploaded, and when the server rejects the data with
//! `422 Unprocessable Entity` keeps the field errors in an [`ErrorBag`] for
//! the UI to render.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use form_submit::{Form, FormData};
//!
//! #[tokio::main]
//! async fn main() -> form_submit::Result<()> {
//!     let form = Form::new()?;
//!     let profile = FormData::new().field("id", 42).field("name", "Ada");
//!
//!     match form.save("https://api.example.com/users", profile).await {
//!         Ok(body) => println!("saved: {}", body),
//!         Err(_) if form.has_error("name") => {
//!             println!("name: {}", form.error("name").unwrap_or_default());
//!         }
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bag`] | Field-keyed error bag and 422 body parsing |
//! | [`form`] | Submission controller, payloads, progress, observers |
//! | [`transport`] | Transport trait and the reqwest-backed default |
//! | [`defaults`] | Process-wide default transport |

pub mod bag;
pub mod defaults;
pub mod form;
pub mod transport;

pub use bag::{ErrorBag, ErrorBody, ErrorMessages};
pub use defaults::{default_transport, set_default_transport};
pub use form::{
    FileUpload, Form, FormBuilder, FormData, FormEvent, FormObserver, FormSnapshot, FormValue,
    InMemoryObserver, NoopObserver, Payload, UploadProgress,
};
pub use transport::{
    HttpTransport, HttpTransportConfig, Method, RequestConfig, Transport, TransportError,
    TransportResponse,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
