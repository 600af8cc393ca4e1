//! In-process transport that records requests and replays scripted outcomes.

use async_trait::async_trait;
use form_submit::{
    Method, Payload, RequestConfig, Transport, TransportError, TransportResponse, UploadProgress,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub payload: Payload,
    pub request_id: Option<String>,
}

#[derive(Default)]
pub struct FakeTransport {
    calls: Mutex<Vec<RecordedCall>>,
    outcomes: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    progress: Vec<UploadProgress>,
    gate: Option<Arc<Notify>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn respond(self, status: u16, data: Value) -> Self {
        self.push(Ok(TransportResponse::new(status, data)))
    }

    /// Queue a failed response.
    pub fn fail(self, status: u16, data: Value) -> Self {
        self.push(Err(TransportError::response(status, data)))
    }

    pub fn fail_with(self, err: TransportError) -> Self {
        self.push(Err(err))
    }

    /// Report these progress events once the request is released.
    pub fn with_progress(mut self, events: Vec<UploadProgress>) -> Self {
        self.progress = events;
        self
    }

    /// Hold every request until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls().pop().expect("no request was sent")
    }

    fn push(self, outcome: Result<TransportResponse, TransportError>) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        payload: Payload,
        config: RequestConfig,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            payload,
            request_id: config.request_id.clone(),
        });

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        for event in &self.progress {
            config.report_progress(*event);
        }

        let next = self.outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(TransportResponse::new(200, Value::Null)))
    }
}
