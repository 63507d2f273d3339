use axum::extract::FromRequestParts;
use axum::http::header::ACCEPT;
use axum::http::request::Parts;
use std::convert::Infallible;

/// The parts of a request content negotiation looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    accept: Option<String>,
    query: Vec<(String, String)>,
}

impl RequestContext {
    pub fn new(accept: Option<&str>, query: &str) -> Self {
        Self {
            accept: accept.map(str::to_string),
            query: serde_urlencoded::from_str(query).unwrap_or_default(),
        }
    }

    pub fn from_parts(parts: &Parts) -> Self {
        let accept = parts.headers.get(ACCEPT).and_then(|v| v.to_str().ok());
        Self::new(accept, parts.uri.query().unwrap_or_default())
    }

    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// First value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestContext::from_parts(parts))
    }
}
