//! # api_kit - API descriptions and negotiated responses for `axum` services
//!
//! `api_kit` records the routes of an `axum` application together with the
//! controller actions handling them, and turns them into a deduplicated
//! [`Specification`] that generators (OpenAPI, native JSON) consume.
//!
//! ## Core Features:
//!
//! - **`#[api_controller]`**: declares the public methods of an `impl` block
//!   as controller actions and emits their `#[api(...)]` metadata as a static
//!   table, collected through `inventory`.
//!
//! - **`ApiRouter`**: a thin wrapper around `axum::Router` that remembers each
//!   registered path, its verbs and the action it points to.
//!
//! - **`RouterScanner`**: walks the recorded routes controller by controller
//!   and merges the descriptors into one [`Specification`]. The first
//!   descriptor for a given verb and path wins.
//!
//! - **`ResponseBuilder`**: renders handler results with content negotiation
//!   (`Accept`, `?format=`, explicit writer type) over a registry of writers.
//!
//! - **`command`** (feature `cli`): a `clap` entry point writing generated
//!   documents to disk.

extern crate self as api_kit;

pub mod api;
#[cfg(feature = "cli")]
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod generator;
pub mod http;
pub mod routing;

// Re-exported so that macro expansions can reach them through `::api_kit`.
pub use inventory;
pub use utoipa;

#[cfg(feature = "macros")]
pub use api_kit_macros::{api_controller, api_schema};

pub use api::{
    Attribute, Descriptor, DescriptorBuilder, Filter, FilterFactory, Method, OperationKey,
    RouterScanner, Specification,
};
pub use config::ApiKitConfig;
pub use controller::{ActionMetadata, Controller, ControllerMetadata, ControllerRegistry};
pub use error::{Error, Result};
pub use generator::{Generator, GeneratorConfig, GeneratorFactory, SchemaMetadata};
pub use http::{Body, HttpEnvelope, HttpError, NegotiationHint, RequestContext, ResponseBuilder};
pub use routing::{ApiRouter, HandlerRef, Route, RouteCollection};
