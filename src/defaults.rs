//! Process-wide default transport.
//!
//! Forms built without an explicit transport share this one. Set it once at
//! startup with [`set_default_transport`]; if nothing is set, the first use
//! builds an [`HttpTransport`] from the environment.

use crate::transport::{HttpTransport, HttpTransportConfig, Transport};
use crate::{Error, ErrorContext, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;

static DEFAULT_TRANSPORT: OnceCell<Arc<dyn Transport>> = OnceCell::new();

/// Install the default transport. Fails if one is already in place.
pub fn set_default_transport(transport: Arc<dyn Transport>) -> Result<()> {
    DEFAULT_TRANSPORT.set(transport).map_err(|_| {
        Error::configuration_with_context(
            "default transport is already set",
            ErrorContext::new().with_source("defaults"),
        )
    })
}

/// The default transport, initializing it from the environment if needed.
pub fn default_transport() -> Result<Arc<dyn Transport>> {
    DEFAULT_TRANSPORT
        .get_or_try_init(|| {
            let transport = HttpTransport::new(HttpTransportConfig::from_env())?;
            tracing::debug!("initialized default HTTP transport from environment");
            Ok::<_, Error>(Arc::new(transport) as Arc<dyn Transport>)
        })
        .cloned()
}
