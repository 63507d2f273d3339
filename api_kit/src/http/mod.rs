//! Rendering handler results into `axum` responses.

pub mod error;
pub mod media_type;
pub mod parameter;
pub mod request;
pub mod response_builder;
pub mod writer;

pub use error::HttpError;
pub use media_type::{parse_accept, MediaRange};
pub use parameter::{ParamLocation, ParamType, ParamValue, ParameterReader, ParameterSpec};
pub use request::RequestContext;
pub use response_builder::{Body, HttpEnvelope, NegotiationHint, Payload, ResponseBuilder, WriterOptions};
pub use writer::{FormWriter, JsonWriter, JsonpWriter, WriteError, Writer, WriterFactory, WriterNotFound};
