use api_kit::{ApiKitConfig, ApiRouter, HandlerRef, ResponseBuilder, RouteCollection};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub mod dtos;
pub mod handlers;

use handlers::ProductController;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub responses: Arc<ResponseBuilder>,
}

impl AppState {
    pub fn new(config: &ApiKitConfig) -> Self {
        Self {
            responses: Arc::new(ResponseBuilder::from_config(config)),
        }
    }
}

/// All routes of the service, recorded for the API description.
pub fn api_router() -> ApiRouter<AppState> {
    ApiRouter::new()
        .get("/v1/products", "ProductController@list", ProductController::list)
        .name("products.list")
        .get("/v1/products/{id}", "ProductController@show", ProductController::show)
        .name("products.show")
        .patch("/v1/products/{id}", "ProductController@update", ProductController::update)
        .name("products.update")
        .get("/v1/export", HandlerRef::instance::<ProductController>("export"), ProductController::export)
        .get("/v1/legacy", "ProductController::legacy", ProductController::legacy)
        .get("/health", HandlerRef::Closure, || async { "ok" })
}

/// Builds the application router and returns the recorded routes next to it.
pub fn app(config: &ApiKitConfig) -> (Router, RouteCollection) {
    let (router, routes) = api_router().into_parts();
    let router = router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState::new(config));
    (router, routes)
}
