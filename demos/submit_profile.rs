//! Submit a profile form and print field errors on rejection.
//!
//! Run with: FORM_BASE_URL=http://localhost:8000/api/ cargo run --example submit_profile

use form_submit::{FileUpload, Form, FormData, InMemoryObserver};
use std::sync::Arc;

#[tokio::main]
async fn main() -> form_submit::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let observer = Arc::new(InMemoryObserver::new(64));
    let form = Form::builder().observer(observer.clone()).build()?;

    let profile = FormData::new()
        .field("id", 1)
        .field("name", "Ada Lovelace")
        .field("email", "ada@example.com")
        .file(
            "avatar",
            FileUpload::new(vec![0u8; 64 * 1024])
                .file_name("avatar.png")
                .mime("image/png"),
        );

    match form.save("users", profile).await {
        Ok(body) => println!("saved: {}", body),
        Err(e) if e.is_validation_failure() => {
            for (field, messages) in form.errors().iter() {
                println!("{}: {}", field, messages.join(", "));
            }
        }
        Err(e) => eprintln!("submission failed: {}", e),
    }

    println!("observed {} events, progress {}%", observer.len(), form.progress());
    Ok(())
}
