use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures that end a request with an error status.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("{message}")]
    NotAcceptable {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("{message}")]
    InternalError {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("{0}")]
    BadRequest(String),
}

impl HttpError {
    pub fn not_acceptable<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HttpError::NotAcceptable {
            message: source.to_string(),
            source: Box::new(source),
        }
    }

    pub fn internal<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HttpError::InternalError {
            message: source.to_string(),
            source: Box::new(source),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            HttpError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            HttpError::InternalError { source, .. } => {
                tracing::error!(error = %self, cause = %source, "failed to render response");
            }
            HttpError::NotAcceptable { source, .. } => {
                tracing::debug!(error = %self, cause = %source, "no acceptable representation");
            }
            HttpError::BadRequest(_) => {
                tracing::debug!(error = %self, "bad request");
            }
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = HttpError::not_acceptable(std::io::Error::other("no writer"));
        assert_eq!(err.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(err.to_string(), "no writer");
        assert!(std::error::Error::source(&err).is_some());

        let err = HttpError::internal(std::io::Error::other("boom"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = HttpError::BadRequest("Missing query parameter \"id\"".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
