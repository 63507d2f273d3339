use api_kit::http::{HttpError, Payload, WriterFactory};
use api_kit::{Body, HttpEnvelope, NegotiationHint, RequestContext, ResponseBuilder};
use axum::http::header::{CONTENT_TYPE, VARY};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Serialize)]
struct Product {
    id: u32,
    name: String,
}

fn product() -> Body {
    Body::record(&Product {
        id: 7,
        name: "Pen".to_string(),
    })
    .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header<'a>(response: &'a Response, name: axum::http::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_text_is_written_as_plain_text() {
    let response = ResponseBuilder::default()
        .build("hello", NegotiationHint::None)
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, CONTENT_TYPE), Some("text/plain"));
    assert!(response.headers().get(VARY).is_none());
    assert_eq!(body_string(response).await, "hello");
}

#[tokio::test]
async fn test_envelope_keeps_status_and_content_type() {
    let envelope = HttpEnvelope::new(StatusCode::ACCEPTED, Body::Text("<p>queued</p>".to_string()))
        .with_header(CONTENT_TYPE, HeaderValue::from_static("text/html"));
    let response = ResponseBuilder::default()
        .build(envelope, NegotiationHint::None)
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(header(&response, CONTENT_TYPE), Some("text/html"));
    assert_eq!(body_string(response).await, "<p>queued</p>");
}

#[tokio::test]
async fn test_empty_body_is_no_content() {
    let envelope = HttpEnvelope::new(StatusCode::CREATED, Body::Null)
        .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let response = ResponseBuilder::default()
        .build(envelope, NegotiationHint::None)
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get(CONTENT_TYPE).is_none());
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_accept_negotiates_json() {
    let request = RequestContext::new(Some("application/json"), "");
    let response = ResponseBuilder::default().build(product(), &request).unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, CONTENT_TYPE), Some("application/json"));
    assert_eq!(header(&response, VARY), Some("Accept"));

    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, json!({"id": 7, "name": "Pen"}));
}

#[tokio::test]
async fn test_missing_accept_defaults_to_json() {
    let request = RequestContext::new(None, "");
    let response = ResponseBuilder::default().build(product(), &request).unwrap();
    assert_eq!(header(&response, CONTENT_TYPE), Some("application/json"));
}

#[tokio::test]
async fn test_jsonp_callback_from_query() {
    let request = RequestContext::new(Some("text/javascript"), "callback=handle");
    let response = ResponseBuilder::default().build(product(), &request).unwrap();

    assert_eq!(header(&response, CONTENT_TYPE), Some("application/javascript"));
    assert_eq!(header(&response, VARY), Some("Accept"));
    assert_eq!(
        body_string(response).await,
        r#"handle({"id":7,"name":"Pen"})"#
    );
}

#[tokio::test]
async fn test_format_beats_accept() {
    let request = RequestContext::new(Some("application/json"), "format=jsonp");
    let response = ResponseBuilder::default().build(product(), &request).unwrap();

    assert_eq!(header(&response, CONTENT_TYPE), Some("application/javascript"));
    assert!(response.headers().get(VARY).is_none());
    assert!(body_string(response).await.starts_with("callback("));
}

#[test]
fn test_format_is_limited_to_supported_writers() {
    let request = RequestContext::new(Some("application/json"), "format=form");
    let err = ResponseBuilder::default().build(product(), &request).unwrap_err();

    assert!(matches!(err, HttpError::NotAcceptable { .. }));
    assert_eq!(err.into_response().status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_format_selects_enabled_form_writer() {
    let builder = ResponseBuilder::new(
        Arc::new(WriterFactory::default()),
        vec!["json".to_string(), "form".to_string()],
    );
    let request = RequestContext::new(Some("application/json"), "format=form");
    let response = builder.build(product(), &request).unwrap();

    assert_eq!(
        header(&response, CONTENT_TYPE),
        Some("application/x-www-form-urlencoded")
    );
    assert!(response.headers().get(VARY).is_none());
}

#[tokio::test]
async fn test_json_string_is_written_as_text() {
    let request = RequestContext::new(Some("application/json"), "");
    let response = ResponseBuilder::default()
        .build(json!("hello"), &request)
        .unwrap();

    assert_eq!(header(&response, CONTENT_TYPE), Some("text/plain"));
    assert!(response.headers().get(VARY).is_none());
    assert_eq!(body_string(response).await, "hello");
}

#[tokio::test]
async fn test_explicit_writer_type() {
    let response = ResponseBuilder::default()
        .build(product(), NegotiationHint::Writer("form"))
        .unwrap();

    assert_eq!(
        header(&response, CONTENT_TYPE),
        Some("application/x-www-form-urlencoded")
    );
    assert!(response.headers().get(VARY).is_none());
    assert_eq!(body_string(response).await, "id=7&name=Pen");
}

#[test]
fn test_unknown_writer_type_is_not_acceptable() {
    let err = ResponseBuilder::default()
        .build(product(), "xml")
        .unwrap_err();

    assert!(matches!(err, HttpError::NotAcceptable { .. }));
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(err.into_response().status(), StatusCode::NOT_ACCEPTABLE);
}

#[test]
fn test_unsupported_accept_is_not_acceptable() {
    let request = RequestContext::new(Some("image/png"), "");
    let err = ResponseBuilder::default().build(product(), &request).unwrap_err();
    assert!(matches!(err, HttpError::NotAcceptable { .. }));
}

#[test]
fn test_write_failure_is_internal_error() {
    let nested = Body::Record(json!({"product": {"id": 7}}));
    let err = ResponseBuilder::default()
        .build(nested, NegotiationHint::Writer("form"))
        .unwrap_err();

    assert!(matches!(err, HttpError::InternalError { .. }));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_native_bodies_skip_negotiation() {
    let builder = ResponseBuilder::default();
    let request = RequestContext::new(Some("text/javascript"), "");

    let response = builder.build(Body::Json(json!([1, 2])), &request).unwrap();
    assert_eq!(header(&response, CONTENT_TYPE), Some("application/json"));
    assert!(response.headers().get(VARY).is_none());
    assert_eq!(body_string(response).await, "[1,2]");

    let form = Body::Form(vec![("q".to_string(), "a b".to_string())]);
    let response = builder.build(form, &request).unwrap();
    assert_eq!(
        header(&response, CONTENT_TYPE),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(body_string(response).await, "q=a+b");

    let stream = Body::Stream(axum::body::Body::from("raw bytes"));
    let response = builder.build(stream, &request).unwrap();
    assert_eq!(header(&response, CONTENT_TYPE), Some("application/octet-stream"));
    assert_eq!(body_string(response).await, "raw bytes");
}

#[tokio::test]
async fn test_response_passes_through() {
    let response = (StatusCode::IM_A_TEAPOT, "short and stout").into_response();
    let response = ResponseBuilder::default()
        .build(Payload::Response(response), NegotiationHint::None)
        .unwrap();

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(body_string(response).await, "short and stout");
}

async fn show_product(request: RequestContext) -> Result<Response, HttpError> {
    ResponseBuilder::default().build(product(), &request)
}

#[tokio::test]
async fn test_handler_style_usage() {
    let response = show_product(RequestContext::new(Some("*/*"), "format=json"))
        .await
        .unwrap();
    assert_eq!(header(&response, CONTENT_TYPE), Some("application/json"));

    let response = show_product(RequestContext::new(Some("application/xml"), ""))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}
