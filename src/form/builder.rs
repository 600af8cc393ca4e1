use crate::form::observer::{noop_observer, FormObserver};
use crate::form::Form;
use crate::transport::Transport;
use crate::Result;
use std::sync::Arc;

/// Builder for creating forms with custom configuration.
pub struct FormBuilder {
    transport: Option<Arc<dyn Transport>>,
    observer: Arc<dyn FormObserver>,
    exclusive: bool,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self {
            transport: None,
            observer: noop_observer(),
            exclusive: false,
        }
    }

    /// Use this transport instead of the process-wide default.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Inject an observer. Default is a no-op observer.
    pub fn observer(mut self, observer: Arc<dyn FormObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Reject a submission while another one on the same form is pending.
    ///
    /// Off by default: overlapping submissions run concurrently and the
    /// last one to write progress, errors or the pending flag wins.
    pub fn exclusive(mut self, enable: bool) -> Self {
        self.exclusive = enable;
        self
    }

    /// Build the form, falling back to the default transport.
    pub fn build(self) -> Result<Form> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => crate::defaults::default_transport()?,
        };
        Ok(Form::from_parts(transport, self.observer, self.exclusive))
    }
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}
