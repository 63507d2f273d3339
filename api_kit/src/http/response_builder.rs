//! Content negotiation for handler results.
//!
//! A handler hands its result to [`ResponseBuilder::build`] together with a
//! [`NegotiationHint`]. Plain text, streams, JSON values and forms are
//! written directly; any other data goes through the [`WriterFactory`],
//! picked by explicit writer type, then `?format=`, then the `Accept` header.

use super::error::HttpError;
use super::request::RequestContext;
use super::writer::{Writer, WriterFactory, WriterNotFound};
use crate::config::ApiKitConfig;
use axum::body::Body as HttpBody;
use axum::http::header::{CONTENT_TYPE, VARY};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

const TEXT: &str = "text/plain";
const BINARY: &str = "application/octet-stream";
const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Response data before it is rendered.
pub enum Body {
    Null,
    Text(String),
    Stream(HttpBody),
    /// A value that is already JSON and bypasses negotiation.
    Json(Value),
    Form(Vec<(String, String)>),
    /// Data rendered by the negotiated writer.
    Record(Value),
}

impl Body {
    pub fn record<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Body::Record(serde_json::to_value(value)?))
    }

    /// Empty bodies are answered with `204 No Content`.
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Null => true,
            Body::Text(text) => text.is_empty(),
            Body::Stream(_) => false,
            Body::Json(value) | Body::Record(value) => is_empty_value(value),
            Body::Form(pairs) => pairs.is_empty(),
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Null => f.write_str("Null"),
            Body::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
            Body::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Body::Form(pairs) => f.debug_tuple("Form").field(pairs).finish(),
            Body::Record(value) => f.debug_tuple("Record").field(value).finish(),
        }
    }
}

/// A body with an explicit status and headers.
#[derive(Debug)]
pub struct HttpEnvelope {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl HttpEnvelope {
    pub fn new(status: StatusCode, body: Body) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: axum::http::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Anything a handler may return to the builder.
#[derive(Debug)]
pub enum Payload {
    /// Passed through untouched.
    Response(Response),
    Envelope(HttpEnvelope),
    Body(Body),
}

impl From<Response> for Payload {
    fn from(response: Response) -> Self {
        Payload::Response(response)
    }
}

impl From<HttpEnvelope> for Payload {
    fn from(envelope: HttpEnvelope) -> Self {
        Payload::Envelope(envelope)
    }
}

impl From<Body> for Payload {
    fn from(body: Body) -> Self {
        Payload::Body(body)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Body(Body::Text(text))
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Body(Body::Text(text.to_string()))
    }
}

/// A JSON string is plain text; every other value is a record.
impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Payload::Body(Body::Text(text)),
            value => Payload::Body(Body::Record(value)),
        }
    }
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Payload::Body(Body::Null)
    }
}

/// What the builder may use to pick a writer.
#[derive(Debug, Clone, Copy, Default)]
pub enum NegotiationHint<'a> {
    /// Always written as `json`.
    #[default]
    None,
    /// A writer type, such as `jsonp`.
    Writer(&'a str),
    /// Negotiate from the request's `Accept` header and query.
    Request(&'a RequestContext),
}

impl<'a> From<&'a RequestContext> for NegotiationHint<'a> {
    fn from(request: &'a RequestContext) -> Self {
        NegotiationHint::Request(request)
    }
}

impl<'a> From<&'a str> for NegotiationHint<'a> {
    fn from(writer_type: &'a str) -> Self {
        NegotiationHint::Writer(writer_type)
    }
}

type WriterCallback<'a> = Box<dyn Fn(&mut dyn Writer) + 'a>;

/// Inputs to writer selection for one response.
#[derive(Default)]
pub struct WriterOptions<'a> {
    pub content_type: Option<String>,
    pub format: Option<String>,
    pub writer_type: Option<String>,
    pub supported_writers: Vec<String>,
    /// Invoked on the selected writer before it writes.
    pub callback: Option<WriterCallback<'a>>,
}

impl fmt::Debug for WriterOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterOptions")
            .field("content_type", &self.content_type)
            .field("format", &self.format)
            .field("writer_type", &self.writer_type)
            .field("supported_writers", &self.supported_writers)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Renders handler results into responses.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    writers: Arc<WriterFactory>,
    supported_writers: Vec<String>,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::from_config(&ApiKitConfig::default())
    }
}

impl ResponseBuilder {
    pub fn new(writers: Arc<WriterFactory>, supported_writers: Vec<String>) -> Self {
        Self {
            writers,
            supported_writers,
        }
    }

    pub fn from_config(config: &ApiKitConfig) -> Self {
        Self::new(
            Arc::new(WriterFactory::default()),
            config.supported_writers.clone(),
        )
    }

    pub fn writers(&self) -> &WriterFactory {
        &self.writers
    }

    pub fn supported_writers(&self) -> &[String] {
        &self.supported_writers
    }

    pub fn build<'a>(
        &self,
        payload: impl Into<Payload>,
        hint: impl Into<NegotiationHint<'a>>,
    ) -> Result<Response, HttpError> {
        let (status, mut headers, body) = match payload.into() {
            Payload::Response(response) => return Ok(response),
            Payload::Envelope(envelope) => (envelope.status, envelope.headers, envelope.body),
            Payload::Body(body) => (StatusCode::OK, HeaderMap::new(), body),
        };

        if body.is_empty() {
            return Ok(StatusCode::NO_CONTENT.into_response());
        }

        match body {
            Body::Null => Ok(StatusCode::NO_CONTENT.into_response()),
            Body::Text(text) => {
                set_default_content_type(&mut headers, TEXT);
                Ok((status, headers, text).into_response())
            }
            Body::Stream(stream) => {
                set_default_content_type(&mut headers, BINARY);
                Ok((status, headers, stream).into_response())
            }
            Body::Json(value) => {
                let bytes = serde_json::to_vec(&value).map_err(HttpError::internal)?;
                set_default_content_type(&mut headers, JSON);
                Ok((status, headers, bytes).into_response())
            }
            Body::Form(pairs) => {
                let encoded = serde_urlencoded::to_string(&pairs).map_err(HttpError::internal)?;
                set_default_content_type(&mut headers, FORM);
                Ok((status, headers, encoded).into_response())
            }
            Body::Record(value) => {
                let options = self.writer_options(hint.into());
                self.build_with_writer(status, headers, &value, options)
            }
        }
    }

    fn build_with_writer(
        &self,
        status: StatusCode,
        mut headers: HeaderMap,
        data: &Value,
        options: WriterOptions<'_>,
    ) -> Result<Response, HttpError> {
        let writer_type = match (&options.writer_type, &options.format) {
            (Some(writer_type), _) => Some(writer_type.clone()),
            (None, Some(format)) if !format.is_empty() => {
                match self.writers.writer_type_by_format(format) {
                    // A client picked format may only name a supported writer.
                    Some(name)
                        if !options.supported_writers.is_empty()
                            && !options.supported_writers.iter().any(|s| s == name) =>
                    {
                        return Err(HttpError::not_acceptable(WriterNotFound::NotSupported(
                            name.to_string(),
                        )));
                    }
                    name => name.map(str::to_string),
                }
            }
            _ => None,
        };

        let mut writer = self
            .writers
            .get_writer(
                options.content_type.as_deref(),
                writer_type.as_deref(),
                &options.supported_writers,
            )
            .map_err(HttpError::not_acceptable)?;

        if let Some(callback) = &options.callback {
            callback(writer.as_mut());
        }

        let bytes = writer.write(data).map_err(HttpError::internal)?;

        // Without a fixed writer the representation depends on Accept.
        if writer_type.is_none() {
            headers.insert(VARY, HeaderValue::from_static("Accept"));
        }
        set_default_content_type(&mut headers, writer.content_type());

        Ok((status, headers, bytes).into_response())
    }

    fn writer_options<'a>(&self, hint: NegotiationHint<'a>) -> WriterOptions<'a> {
        match hint {
            NegotiationHint::None => WriterOptions {
                writer_type: Some("json".to_string()),
                ..Default::default()
            },
            NegotiationHint::Writer(writer_type) => WriterOptions {
                writer_type: Some(writer_type.to_string()),
                ..Default::default()
            },
            NegotiationHint::Request(request) => WriterOptions {
                content_type: request.accept().map(str::to_string),
                format: request.query_param("format").map(str::to_string),
                writer_type: None,
                supported_writers: self.supported_writers.clone(),
                callback: Some(Box::new(move |writer: &mut dyn Writer| {
                    if let Some(jsonp) = writer.as_jsonp_mut() {
                        if jsonp.callback_name().is_none() {
                            if let Some(callback) = request.query_param("callback") {
                                jsonp.set_callback_name(callback);
                            }
                        }
                    }
                })),
            },
        }
    }
}

fn set_default_content_type(headers: &mut HeaderMap, content_type: &'static str) {
    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_bodies_are_no_content() {
        let builder = ResponseBuilder::default();
        for body in [
            Body::Null,
            Body::Text(String::new()),
            Body::Record(json!({})),
            Body::Json(json!([])),
            Body::Form(vec![]),
        ] {
            let envelope = HttpEnvelope::new(StatusCode::CREATED, body)
                .with_header(CONTENT_TYPE, HeaderValue::from_static("text/html"));
            let response = builder.build(envelope, NegotiationHint::None).unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
            assert!(response.headers().get(CONTENT_TYPE).is_none());
        }
    }

    #[test]
    fn test_writer_options_from_request() {
        let builder = ResponseBuilder::default();
        let request = RequestContext::new(Some("text/javascript"), "format=jsonp");
        let options = builder.writer_options(NegotiationHint::Request(&request));
        assert_eq!(options.content_type.as_deref(), Some("text/javascript"));
        assert_eq!(options.format.as_deref(), Some("jsonp"));
        assert_eq!(options.writer_type, None);
        assert_eq!(options.supported_writers, vec!["json", "jsonp"]);
        assert!(options.callback.is_some());

        let options = builder.writer_options(NegotiationHint::None);
        assert_eq!(options.writer_type.as_deref(), Some("json"));
    }

    #[test]
    fn test_response_passes_through() {
        let response = (StatusCode::IM_A_TEAPOT, "tea").into_response();
        let built = ResponseBuilder::default()
            .build(response, NegotiationHint::None)
            .unwrap();
        assert_eq!(built.status(), StatusCode::IM_A_TEAPOT);
    }
}
