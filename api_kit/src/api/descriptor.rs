use crate::error::{Error, Result};
use axum::http;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// The HTTP verbs an operation can be described with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Maps a router verb onto a describable one. HEAD, OPTIONS, TRACE,
    /// CONNECT and extension methods have no counterpart.
    pub fn from_http(method: &http::Method) -> Option<Self> {
        match *method {
            http::Method::GET => Some(Method::Get),
            http::Method::POST => Some(Method::Post),
            http::Method::PUT => Some(Method::Put),
            http::Method::PATCH => Some(Method::Patch),
            http::Method::DELETE => Some(Method::Delete),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single piece of metadata attached to an operation.
///
/// Attributes are declared on controller actions through `#[api(...)]` and
/// carried through the specification untouched, so the variants only hold
/// borrowed-or-owned strings. This keeps them constructible in `static`
/// tables emitted by the macros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Attribute {
    OperationId(Cow<'static, str>),
    Description(Cow<'static, str>),
    Tag(Cow<'static, str>),
    /// Name of the schema accepted as request body.
    Incoming(Cow<'static, str>),
    Outgoing {
        status: u16,
        schema: Cow<'static, str>,
    },
    PathParam {
        name: Cow<'static, str>,
        schema: Cow<'static, str>,
    },
    QueryParam {
        name: Cow<'static, str>,
        schema: Cow<'static, str>,
        required: bool,
    },
    Deprecated,
    /// Marker appended by the descriptor builder.
    Method(Method),
}

/// Identity of an operation inside a [`Specification`](super::Specification).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationKey {
    pub method: Method,
    pub path: String,
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Normalized description of one API operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptor {
    path: String,
    method: Method,
    metadata: Vec<Attribute>,
}

impl Descriptor {
    pub fn new(
        path: impl Into<String>,
        method: Option<Method>,
        metadata: Vec<Attribute>,
    ) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(Error::InvalidDescriptor("path must not be empty".to_string()));
        }
        let method = method.ok_or_else(|| {
            Error::InvalidDescriptor(format!("no method given for {}", path))
        })?;

        Ok(Self {
            path,
            method,
            metadata,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn metadata(&self) -> &[Attribute] {
        &self.metadata
    }

    pub fn key(&self) -> OperationKey {
        OperationKey {
            method: self.method,
            path: self.path.clone(),
        }
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.metadata.iter().find_map(|attr| match attr {
            Attribute::OperationId(id) => Some(id.as_ref()),
            _ => None,
        })
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.iter().find_map(|attr| match attr {
            Attribute::Description(text) => Some(text.as_ref()),
            _ => None,
        })
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.metadata.iter().filter_map(|attr| match attr {
            Attribute::Tag(tag) => Some(tag.as_ref()),
            _ => None,
        })
    }

    pub fn is_deprecated(&self) -> bool {
        self.metadata.contains(&Attribute::Deprecated)
    }
}
