//! HttpTransport against a mockito server.

use crate::mock_server::MockServerFixture;
use crate::support::avatar;
use form_submit::{
    Error, FileUpload, Form, FormData, HttpTransport, HttpTransportConfig, TransportError,
};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn creates_a_resource_with_a_json_body() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_exchange(
            "POST",
            "/users",
            json!({"name": "Ada", "bio": null}),
            201,
            r#"{"id":1,"name":"Ada"}"#,
        )
        .await;
    let form = fixture.form();

    let body = form
        .save(
            "/users",
            FormData::new().field("name", "Ada").field("bio", None::<String>),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(body, json!({"id": 1, "name": "Ada"}));
    assert_eq!(form.progress(), 100);
    assert!(!form.is_pending());
}

#[tokio::test]
async fn updates_with_multipart_when_a_file_is_attached() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("PATCH", "/users/42")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="avatar"; filename="avatar.png""#.into()),
            Matcher::Regex("fake-png-bytes".into()),
            Matcher::Regex(r#"name="name"\r\n\r\nAda\r\n"#.into()),
            Matcher::Regex(r#"name="nickname"\r\n\r\n\r\n"#.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":42}"#)
        .create_async()
        .await;
    let form = fixture.form();

    let body = form
        .save(
            "/users/",
            FormData::new()
                .field("id", 42)
                .field("name", "Ada")
                .field("nickname", None::<String>)
                .file("avatar", avatar()),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(body, json!({"id": 42}));
    assert_eq!(form.progress(), 100);
}

#[tokio::test]
async fn multipart_with_only_empty_files_completes_progress() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/u")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
        .with_status(200)
        .create_async()
        .await;
    let form = fixture.form();

    form.post(
        "/u",
        FormData::new()
            .field("name", "Ada")
            .file("avatar", FileUpload::new(Vec::<u8>::new())),
    )
    .await
    .unwrap();

    mock.assert_async().await;
    assert_eq!(form.progress(), 100);
}

#[tokio::test]
async fn unprocessable_entity_fills_the_error_bag() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json(
            "POST",
            "/users",
            422,
            r#"{"message":"The given data was invalid.","errors":{"email":["The email has already been taken."]}}"#,
        )
        .await;
    let form = fixture.form();

    let err = form
        .post("/users", FormData::new().field("email", "taken@example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert!(err.is_validation_failure());
    assert_eq!(
        form.error("email").as_deref(),
        Some("The email has already been taken.")
    );
}

#[tokio::test]
async fn server_errors_are_propagated_without_touching_errors() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("DELETE", "/users/1")
        .with_status(500)
        .with_body("server error")
        .create_async()
        .await;
    let form = fixture.form();

    let err = form.delete("/users/1", FormData::new()).await.unwrap_err();

    match &err {
        Error::Transport(TransportError::Response { status, data }) => {
            assert_eq!(*status, 500);
            assert_eq!(data, &json!("server error"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!form.errors().any());
    assert!(!form.is_pending());
}

#[tokio::test]
async fn every_request_carries_a_request_id() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("PUT", "/posts/3")
        .match_header("x-request-id", Matcher::Regex("^[0-9a-f-]{36}$".into()))
        .match_header("accept", "application/json")
        .with_status(204)
        .create_async()
        .await;
    let form = fixture.form();

    let body = form.put("/posts/3", FormData::new()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(body, serde_json::Value::Null);
}

#[tokio::test]
async fn connection_failures_are_transport_errors() {
    let transport = HttpTransport::new(
        HttpTransportConfig::default().with_base_url("http://127.0.0.1:1/"),
    )
    .unwrap();
    let form = Form::with_transport(Arc::new(transport));

    let err = form.post("/users", FormData::new()).await.unwrap_err();

    assert!(matches!(err, Error::Transport(TransportError::Http(_))));
    assert_eq!(err.status(), None);
    assert!(!form.errors().any());
}
