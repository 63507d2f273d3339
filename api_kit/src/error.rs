use crate::api::Method;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("No HTTP methods configured at route {route} you need to configure a concrete HTTP method for every route")]
    NoMethodConfigured { route: String },

    #[error("Multiple HTTP methods configured at route {route} you need to configure exactly one HTTP method at a route")]
    AmbiguousMethod { route: String, methods: Vec<Method> },

    #[error("Controller {controller} can not be described: {reason}")]
    NotDescribable { controller: String, reason: String },

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Toml Error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("SerdeJson Error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Errors that only concern a single route or controller.
    ///
    /// The scanner skips the controller that raised one of these and keeps
    /// going; everything else aborts the scan.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NoMethodConfigured { .. }
                | Error::AmbiguousMethod { .. }
                | Error::NotDescribable { .. }
        )
    }

    pub(crate) fn not_describable(controller: &str, reason: impl Into<String>) -> Self {
        Error::NotDescribable {
            controller: controller.to_string(),
            reason: reason.into(),
        }
    }
}
