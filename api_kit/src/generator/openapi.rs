use super::{Generator, GeneratorConfig};
use crate::api::{Attribute, Descriptor, Method, Specification};
use crate::config::ApiKitConfig;
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use utoipa::openapi::path::{OperationBuilder, ParameterBuilder, ParameterIn};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{ObjectBuilder, Type};
use utoipa::openapi::server::Server;
use utoipa::openapi::{
    self, ComponentsBuilder, ContentBuilder, Deprecated, Ref, RefOr, Required, ResponsesBuilder,
    Schema,
};

/// A schema linked into the binary, submitted by `#[api_schema]`.
pub struct SchemaMetadata {
    pub name: &'static str,
    pub schema_provider: fn() -> (String, RefOr<Schema>),
}
inventory::collect!(SchemaMetadata);

static COLON_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":(\w+)").expect("placeholder pattern is valid"));

/// `/pets/:id` -> `/pets/{id}`
pub fn to_openapi_path(path: &str) -> String {
    COLON_PLACEHOLDER.replace_all(path, "{$1}").into_owned()
}

fn primitive_schema(name: &str) -> Option<RefOr<Schema>> {
    let schema_type = match name {
        "String" | "string" | "&str" | "str" => Type::String,
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "usize" | "isize"
        | "integer" => Type::Integer,
        "f32" | "f64" | "number" => Type::Number,
        "bool" | "boolean" => Type::Boolean,
        _ => return None,
    };
    Some(RefOr::T(Schema::Object(
        ObjectBuilder::new().schema_type(schema_type).build(),
    )))
}

/// Builds an OpenAPI document from a specification.
#[derive(Clone)]
pub struct OpenApiGenerator {
    title: String,
    version: String,
    description: Option<String>,
    base_url: Option<String>,
    schemas: BTreeMap<String, RefOr<Schema>>,
}

impl fmt::Debug for OpenApiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenApiGenerator")
            .field("title", &self.title)
            .field("version", &self.version)
            .field("description", &self.description)
            .field("base_url", &self.base_url)
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl OpenApiGenerator {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            base_url: None,
            schemas: BTreeMap::new(),
        }
    }

    /// Project settings, overridable through `title`, `version` and
    /// `base_url` options. Includes every schema submitted with `#[api_schema]`.
    pub fn from_config(config: &ApiKitConfig, options: &GeneratorConfig) -> Self {
        let mut generator = Self::new(
            options.get("title").unwrap_or(&config.title),
            options.get("version").unwrap_or(&config.version),
        )
        .with_linked_schemas();
        generator.description = config.description.clone();
        generator.base_url = options
            .get("base_url")
            .map(str::to_string)
            .or_else(|| config.base_url.clone());
        generator
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_schema(mut self, name: impl Into<String>, schema: RefOr<Schema>) -> Self {
        self.schemas.insert(name.into(), schema);
        self
    }

    pub fn schema<T: utoipa::ToSchema>(self) -> Self {
        let name = T::name().into_owned();
        self.with_schema(name, T::schema())
    }

    pub fn with_linked_schemas(mut self) -> Self {
        for metadata in inventory::iter::<SchemaMetadata> {
            let (name, schema) = (metadata.schema_provider)();
            self.schemas.entry(name).or_insert(schema);
        }
        self
    }

    /// Registered schemas are referenced, primitive type names are inlined.
    fn schema_ref(&self, name: &str) -> RefOr<Schema> {
        if self.schemas.contains_key(name) {
            return RefOr::Ref(Ref::from_schema_name(name));
        }
        primitive_schema(name).unwrap_or_else(|| {
            tracing::debug!(schema = name, "unknown schema, leaving it untyped");
            RefOr::T(Schema::default())
        })
    }

    pub fn build(&self, specification: &Specification) -> openapi::OpenApi {
        let mut openapi = openapi::OpenApiBuilder::new()
            .info(
                openapi::InfoBuilder::new()
                    .title(&self.title)
                    .version(&self.version)
                    .description(self.description.as_deref())
                    .build(),
            )
            .paths(openapi::Paths::new())
            .build();

        if let Some(base_url) = &self.base_url {
            openapi.servers = Some(vec![Server::new(base_url)]);
        }

        for descriptor in specification {
            let operation = self.build_operation(descriptor);
            let path_item = openapi
                .paths
                .paths
                .entry(to_openapi_path(descriptor.path()))
                .or_default();

            match descriptor.method() {
                Method::Get => path_item.get = Some(operation),
                Method::Post => path_item.post = Some(operation),
                Method::Put => path_item.put = Some(operation),
                Method::Patch => path_item.patch = Some(operation),
                Method::Delete => path_item.delete = Some(operation),
            }
        }

        if !self.schemas.is_empty() {
            openapi.components = Some(
                ComponentsBuilder::new()
                    .schemas_from_iter(self.schemas.clone())
                    .build(),
            );
        }

        openapi
    }

    fn build_operation(&self, descriptor: &Descriptor) -> openapi::path::Operation {
        let mut operation_builder = OperationBuilder::new()
            .operation_id(descriptor.operation_id().map(str::to_string));

        if let Some(description) = descriptor.description() {
            let summary = description.lines().next().unwrap_or_default();
            operation_builder = operation_builder
                .summary(Some(summary))
                .description(Some(description));
        }
        for tag in descriptor.tags() {
            operation_builder = operation_builder.tag(tag);
        }
        if descriptor.is_deprecated() {
            operation_builder = operation_builder.deprecated(Some(Deprecated::True));
        }

        // Placeholders without a declared parameter are plain strings.
        let mut declared_path_params: Vec<&str> = Vec::new();
        for attribute in descriptor.metadata() {
            match attribute {
                Attribute::PathParam { name, schema } => {
                    declared_path_params.push(name.as_ref());
                    operation_builder = operation_builder.parameter(
                        ParameterBuilder::new()
                            .name(name.clone())
                            .parameter_in(ParameterIn::Path)
                            .required(Required::True)
                            .schema(Some(self.schema_ref(schema)))
                            .build(),
                    );
                }
                Attribute::QueryParam {
                    name,
                    schema,
                    required,
                } => {
                    operation_builder = operation_builder.parameter(
                        ParameterBuilder::new()
                            .name(name.clone())
                            // The builder forces `required` while the location is still `path`.
                            .parameter_in(ParameterIn::Query)
                            .required(if *required { Required::True } else { Required::False })
                            .schema(Some(self.schema_ref(schema)))
                            .build(),
                    );
                }
                Attribute::Incoming(schema) => {
                    let request_body = RequestBodyBuilder::new()
                        .required(Some(Required::True))
                        .content(
                            "application/json",
                            ContentBuilder::new()
                                .schema(Some(self.schema_ref(schema)))
                                .build(),
                        )
                        .build();
                    operation_builder = operation_builder.request_body(Some(request_body));
                }
                _ => {}
            }
        }
        for capture in COLON_PLACEHOLDER.captures_iter(descriptor.path()) {
            let name = &capture[1];
            if declared_path_params.contains(&name) {
                continue;
            }
            operation_builder = operation_builder.parameter(
                ParameterBuilder::new()
                    .name(name)
                    .required(Required::True)
                    .parameter_in(ParameterIn::Path)
                    .schema(primitive_schema("string"))
                    .build(),
            );
        }

        let mut responses_builder = ResponsesBuilder::new();
        let mut has_response = false;
        for attribute in descriptor.metadata() {
            if let Attribute::Outgoing { status, schema } = attribute {
                has_response = true;
                let response = openapi::ResponseBuilder::new()
                    .description(status_description(*status))
                    .content(
                        "application/json",
                        ContentBuilder::new()
                            .schema(Some(self.schema_ref(schema)))
                            .build(),
                    )
                    .build();
                responses_builder = responses_builder.response(status.to_string(), response);
            }
        }
        if !has_response {
            responses_builder = responses_builder.response(
                "200",
                openapi::ResponseBuilder::new().description("OK").build(),
            );
        }

        operation_builder.responses(responses_builder.build()).build()
    }
}

fn status_description(status: u16) -> &'static str {
    axum::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Response")
}

impl Generator for OpenApiGenerator {
    fn generate(&self, specification: &Specification) -> Result<String> {
        Ok(self.build(specification).to_pretty_json()?)
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }
}
