//! Route registration on top of `axum`.
//!
//! `axum::Router` does not expose what it has been given, so [`ApiRouter`]
//! forwards every registration to the inner router and records a [`Route`]
//! next to it. The recorded [`RouteCollection`] is what the scanner walks.

use crate::api::Attribute;
use crate::controller::{Controller, ControllerRegistry, INVOKE_ACTION};
use axum::handler::Handler;
use axum::http::Method;
use axum::routing::{self, MethodRouter};
use axum::Router;

/// How a route points at the code handling it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerRef {
    /// A typed controller action, see [`HandlerRef::instance`].
    Instance {
        controller: &'static str,
        action: &'static str,
    },
    /// `"Controller@action"` or `"Controller::action"`.
    Qualified(String),
    /// A bare controller name; the route maps to its `invoke` action.
    ClassName(String),
    /// A handler that does not belong to any controller.
    Closure,
}

/// The controller action a route resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub controller: &'static str,
    pub action: String,
}

impl HandlerRef {
    pub fn instance<C: Controller>(action: &'static str) -> Self {
        HandlerRef::Instance {
            controller: C::NAME,
            action,
        }
    }

    pub fn qualified(reference: impl Into<String>) -> Self {
        HandlerRef::Qualified(reference.into())
    }

    pub fn class_name(name: impl Into<String>) -> Self {
        HandlerRef::ClassName(name.into())
    }

    /// Resolves the reference to a controller action. Names that are not
    /// registered resolve to nothing.
    pub fn resolve(&self, registry: &ControllerRegistry) -> Option<RouteTarget> {
        match self {
            HandlerRef::Instance { controller, action } => Some(RouteTarget {
                controller: *controller,
                action: action.to_string(),
            }),
            HandlerRef::Qualified(reference) => {
                let (controller, action) = split_qualified(reference)?;
                let metadata = registry.get(controller)?;
                let action = if action.is_empty() { INVOKE_ACTION } else { action };
                Some(RouteTarget {
                    controller: metadata.name,
                    action: action.to_string(),
                })
            }
            HandlerRef::ClassName(name) => registry.get(name).map(|metadata| RouteTarget {
                controller: metadata.name,
                action: INVOKE_ACTION.to_string(),
            }),
            HandlerRef::Closure => None,
        }
    }
}

fn split_qualified(reference: &str) -> Option<(&str, &str)> {
    reference
        .split_once('@')
        .or_else(|| reference.rsplit_once("::"))
        .or_else(|| reference.rsplit_once(':'))
}

impl From<&str> for HandlerRef {
    fn from(reference: &str) -> Self {
        if reference.contains('@') || reference.contains(':') {
            HandlerRef::Qualified(reference.to_string())
        } else {
            HandlerRef::ClassName(reference.to_string())
        }
    }
}

/// One registered route as the router saw it.
#[derive(Debug, Clone)]
pub struct Route {
    path: String,
    methods: Vec<Method>,
    name: Option<String>,
    handler: HandlerRef,
    target: Option<RouteTarget>,
    attributes: Vec<Attribute>,
}

impl Route {
    pub fn new(path: impl Into<String>, methods: Vec<Method>, handler: HandlerRef) -> Self {
        Self {
            path: path.into(),
            methods,
            name: None,
            handler,
            target: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Set once the route has been added to a [`RouteCollection`].
    pub fn target(&self) -> Option<&RouteTarget> {
        self.target.as_ref()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// `name (path)`, used in error messages.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.path),
            None => format!("({})", self.path),
        }
    }
}

/// Every route registered through an [`ApiRouter`], in registration order.
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    routes: Vec<Route>,
    registry: ControllerRegistry,
}

impl RouteCollection {
    pub fn new(registry: ControllerRegistry) -> Self {
        Self {
            routes: Vec::new(),
            registry,
        }
    }

    pub fn add(&mut self, mut route: Route) {
        route.target = route.handler.resolve(&self.registry);
        if route.target.is_none() {
            tracing::debug!(path = %route.path, "route is not bound to a controller");
        }
        self.routes.push(route);
    }

    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn by_action(&self, controller: &str, action: &str) -> Option<&Route> {
        self.routes.iter().find(|route| {
            route
                .target
                .as_ref()
                .is_some_and(|t| t.controller == controller && t.action == action)
        })
    }

    /// Distinct controllers reachable from the routes, first seen first.
    pub fn controllers(&self) -> Vec<&'static str> {
        let mut controllers: Vec<&'static str> = Vec::new();
        for target in self.routes.iter().filter_map(Route::target) {
            if !controllers.contains(&target.controller) {
                controllers.push(target.controller);
            }
        }
        controllers
    }

    fn last_mut(&mut self) -> Option<&mut Route> {
        self.routes.last_mut()
    }
}

/// An `axum::Router` that remembers what was registered on it.
pub struct ApiRouter<S = ()> {
    router: Router<S>,
    routes: RouteCollection,
}

impl<S> Default for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// A router resolving handlers against every linked controller.
    pub fn new() -> Self {
        Self::with_registry(ControllerRegistry::global().clone())
    }

    pub fn with_registry(registry: ControllerRegistry) -> Self {
        Self {
            router: Router::new(),
            routes: RouteCollection::new(registry),
        }
    }

    pub fn route(
        mut self,
        path: &str,
        methods: &[Method],
        handler: impl Into<HandlerRef>,
        method_router: MethodRouter<S>,
    ) -> Self {
        self.router = self.router.route(path, method_router);
        self.routes.add(Route::new(path, methods.to_vec(), handler.into()));
        self
    }

    /// Like `axum::routing::get`, which also answers HEAD.
    pub fn get<H, T>(self, path: &str, handler_ref: impl Into<HandlerRef>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route(path, &[Method::GET, Method::HEAD], handler_ref, routing::get(handler))
    }

    pub fn post<H, T>(self, path: &str, handler_ref: impl Into<HandlerRef>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route(path, &[Method::POST], handler_ref, routing::post(handler))
    }

    pub fn put<H, T>(self, path: &str, handler_ref: impl Into<HandlerRef>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route(path, &[Method::PUT], handler_ref, routing::put(handler))
    }

    pub fn patch<H, T>(self, path: &str, handler_ref: impl Into<HandlerRef>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route(path, &[Method::PATCH], handler_ref, routing::patch(handler))
    }

    pub fn delete<H, T>(self, path: &str, handler_ref: impl Into<HandlerRef>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route(path, &[Method::DELETE], handler_ref, routing::delete(handler))
    }

    /// Answers every verb; such a route can not be described.
    pub fn any<H, T>(self, path: &str, handler_ref: impl Into<HandlerRef>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        let methods = [
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ];
        self.route(path, &methods, handler_ref, routing::any(handler))
    }

    /// Names the route registered last.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        if let Some(route) = self.routes.last_mut() {
            route.name = Some(name.into());
        }
        self
    }

    /// Attaches metadata to the route registered last.
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        if let Some(route) = self.routes.last_mut() {
            route.attributes.push(attribute);
        }
        self
    }

    pub fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    pub fn into_parts(self) -> (Router<S>, RouteCollection) {
        (self.router, self.routes)
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ActionMetadata, ControllerMetadata};

    static PETS: ControllerMetadata = ControllerMetadata {
        name: "PetController",
        actions: &[ActionMetadata {
            name: "show",
            attributes: &[],
        }],
    };

    fn registry() -> ControllerRegistry {
        ControllerRegistry::new().register(&PETS)
    }

    fn target(action: &str) -> Option<RouteTarget> {
        Some(RouteTarget {
            controller: "PetController",
            action: action.to_string(),
        })
    }

    #[test]
    fn test_handler_ref_resolution() {
        let registry = registry();
        assert_eq!(HandlerRef::from("PetController@show").resolve(&registry), target("show"));
        assert_eq!(HandlerRef::from("PetController::show").resolve(&registry), target("show"));
        assert_eq!(HandlerRef::from("PetController").resolve(&registry), target("invoke"));
        assert_eq!(HandlerRef::from("Missing@show").resolve(&registry), None);
        assert_eq!(HandlerRef::from("Missing").resolve(&registry), None);
        assert_eq!(HandlerRef::Closure.resolve(&registry), None);
    }

    #[test]
    fn test_collection_dedups_controllers() {
        let mut routes = RouteCollection::new(registry());
        routes.add(Route::new("/pets/{id}", vec![Method::GET], "PetController@show".into()));
        routes.add(Route::new("/pets", vec![Method::GET], "PetController@list".into()));
        routes.add(Route::new("/health", vec![Method::GET], HandlerRef::Closure));
        routes.add(Route::new("/other", vec![Method::GET], "Unknown@x".into()));

        assert_eq!(routes.controllers(), vec!["PetController"]);
        assert_eq!(routes.by_action("PetController", "show").unwrap().path(), "/pets/{id}");
        assert!(routes.by_action("PetController", "delete").is_none());
    }

    #[test]
    fn test_api_router_records_routes() {
        async fn show() -> &'static str {
            "pet"
        }

        let router: ApiRouter = ApiRouter::with_registry(registry())
            .get("/pets/{id}", "PetController@show", show)
            .name("pets.show")
            .attribute(Attribute::Tag("pet".into()))
            .delete("/pets/{id}", HandlerRef::Closure, show);

        let routes = router.routes();
        assert_eq!(routes.len(), 2);
        let first = &routes.routes()[0];
        assert_eq!(first.methods(), &[Method::GET, Method::HEAD]);
        assert_eq!(first.label(), "pets.show (/pets/{id})");
        assert_eq!(first.attributes(), &[Attribute::Tag("pet".into())]);
        assert_eq!(first.target(), target("show").as_ref());
        assert!(routes.routes()[1].target().is_none());
    }
}
