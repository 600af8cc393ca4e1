use crate::fake_transport::FakeTransport;
use form_submit::{FileUpload, Form};
use std::sync::Arc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn form_with(transport: &Arc<FakeTransport>) -> Form {
    init_tracing();
    Form::with_transport(transport.clone())
}

pub fn avatar() -> FileUpload {
    FileUpload::new(&b"fake-png-bytes"[..])
        .file_name("avatar.png")
        .mime("image/png")
}
