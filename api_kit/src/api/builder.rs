use super::descriptor::{Attribute, Descriptor, Method};
use crate::error::{Error, Result};
use crate::routing::Route;
use once_cell::sync::Lazy;
use regex::Regex;

// `{id}` as well as axum's catch-all `{*rest}`.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\*?(\w+)\}").expect("placeholder pattern is valid"));

/// Converts router placeholders into the colon form used by descriptors.
///
/// `/pets/{id}/toys/{toy}` becomes `/pets/:id/toys/:toy`. Literal segments are
/// kept as-is, so normalizing an already normalized path is a no-op.
pub fn normalize_path(path: &str) -> String {
    PLACEHOLDER.replace_all(path, ":$1").into_owned()
}

/// Picks the single describable verb of a route.
pub fn resolve_method(route: &Route) -> Result<Method> {
    let mut methods: Vec<Method> = Vec::new();
    for method in route.methods().iter().filter_map(Method::from_http) {
        if !methods.contains(&method) {
            methods.push(method);
        }
    }

    match methods.as_slice() {
        [] => Err(Error::NoMethodConfigured {
            route: route.label(),
        }),
        [method] => Ok(*method),
        _ => Err(Error::AmbiguousMethod {
            route: route.label(),
            methods,
        }),
    }
}

/// Turns one registered route plus the metadata declared on its handler into
/// a [`Descriptor`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptorBuilder;

impl DescriptorBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, route: &Route, declared: &[Attribute]) -> Result<Descriptor> {
        let method = resolve_method(route)?;

        let mut metadata = Vec::with_capacity(declared.len() + route.attributes().len() + 1);
        metadata.extend_from_slice(declared);
        metadata.extend_from_slice(route.attributes());
        metadata.push(Attribute::Method(method));

        Descriptor::new(normalize_path(route.path()), Some(method), metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HandlerRef;
    use axum::http::Method as HttpMethod;

    fn route(methods: &[HttpMethod]) -> Route {
        Route::new("/pets/{id}", methods.to_vec(), HandlerRef::Closure).with_name("pets.show")
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("{id}/{name}"), ":id/:name");
        assert_eq!(normalize_path("/pets/{id}/toys"), "/pets/:id/toys");
        assert_eq!(normalize_path("/files/{*path}"), "/files/:path");
        assert_eq!(normalize_path("/static/index.html"), "/static/index.html");
    }

    #[test]
    fn test_normalize_path_is_idempotent() {
        let once = normalize_path("/users/{user}/posts/{post}");
        assert_eq!(normalize_path(&once), once);
    }

    #[test]
    fn test_single_verb_builds_descriptor() {
        for (http_method, expected) in [
            (HttpMethod::GET, Method::Get),
            (HttpMethod::POST, Method::Post),
            (HttpMethod::PUT, Method::Put),
            (HttpMethod::PATCH, Method::Patch),
            (HttpMethod::DELETE, Method::Delete),
        ] {
            let descriptor = DescriptorBuilder::new()
                .build(&route(&[http_method]), &[Attribute::Tag("pet".into())])
                .unwrap();
            assert_eq!(descriptor.method(), expected);
            assert_eq!(descriptor.path(), "/pets/:id");
            assert_eq!(
                descriptor.metadata(),
                &[Attribute::Tag("pet".into()), Attribute::Method(expected)]
            );
        }
    }

    #[test]
    fn test_unrecognized_verbs_are_ignored() {
        let descriptor = DescriptorBuilder::new()
            .build(&route(&[HttpMethod::GET, HttpMethod::HEAD]), &[])
            .unwrap();
        assert_eq!(descriptor.method(), Method::Get);
    }

    #[test]
    fn test_no_verb_fails() {
        let err = DescriptorBuilder::new().build(&route(&[]), &[]).unwrap_err();
        assert!(matches!(err, Error::NoMethodConfigured { .. }));

        let err = DescriptorBuilder::new()
            .build(&route(&[HttpMethod::HEAD, HttpMethod::OPTIONS]), &[])
            .unwrap_err();
        assert!(matches!(err, Error::NoMethodConfigured { .. }));
        assert!(err.to_string().contains("pets.show (/pets/{id})"));
    }

    #[test]
    fn test_multiple_verbs_fail() {
        let err = DescriptorBuilder::new()
            .build(&route(&[HttpMethod::GET, HttpMethod::POST]), &[])
            .unwrap_err();
        match err {
            Error::AmbiguousMethod { methods, .. } => {
                assert_eq!(methods, vec![Method::Get, Method::Post])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_route_attributes_follow_declared_metadata() {
        let route = route(&[HttpMethod::GET]).with_attribute(Attribute::Deprecated);
        let descriptor = DescriptorBuilder::new()
            .build(&route, &[Attribute::Description("Show a pet".into())])
            .unwrap();
        assert_eq!(
            descriptor.metadata(),
            &[
                Attribute::Description("Show a pet".into()),
                Attribute::Deprecated,
                Attribute::Method(Method::Get),
            ]
        );
    }
}
