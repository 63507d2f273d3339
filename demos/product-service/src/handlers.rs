use crate::dtos::{Category, LegacyData, Product, ProductUpdate};
use crate::AppState;
use api_kit::http::{ParamType, ParameterReader, ParameterSpec};
use api_kit::{api_controller, Body, HttpEnvelope, HttpError, RequestContext};
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use axum::Json;

pub struct ProductController;

fn sample_product(id: &str, name: &str, price: f64) -> Product {
    Product {
        id: id.to_string(),
        product_code: format!("P-{}", id.trim_start_matches("prod-")),
        name: name.to_string(),
        description: Some(format!("This is {}.", name)),
        price,
        category: Category {
            id: "cat-01".to_string(),
            name: "Electronics".to_string(),
            parent: None,
        },
    }
}

fn catalogue() -> Vec<Product> {
    vec![
        sample_product("prod-001", "Example Product 1", 99.99),
        sample_product("prod-002", "Example Product 2", 149.99),
    ]
}

fn record<T: serde::Serialize>(value: &T) -> Result<Body, HttpError> {
    Body::record(value).map_err(HttpError::internal)
}

#[api_controller]
impl ProductController {
    /// List all products
    /// Honours `Accept`, `?format=` and `?limit=`.
    #[api(
        tag = "product",
        query_param(name = "limit", schema = "u32"),
        outgoing(status = 200, schema = "Product")
    )]
    pub async fn list(
        State(state): State<AppState>,
        request: RequestContext,
    ) -> Result<Response, HttpError> {
        let limit = ParameterReader::new()
            .read_query(&request, &ParameterSpec::query("limit", ParamType::Integer).nullable())?
            .as_i64()
            .and_then(|limit| usize::try_from(limit).ok());

        let mut products = catalogue();
        if let Some(limit) = limit {
            products.truncate(limit);
        }
        state.responses.build(record(&products)?, &request)
    }

    /// Get a product by its ID
    #[api(
        operation_id = "getProduct",
        tag = "product",
        path_param(name = "id", schema = "String"),
        outgoing(status = 200, schema = "Product")
    )]
    pub async fn show(
        State(state): State<AppState>,
        request: RequestContext,
        Path(id): Path<String>,
    ) -> Result<Response, HttpError> {
        let product = catalogue().into_iter().find(|p| p.id == id);
        match product {
            Some(product) => state.responses.build(record(&product)?, &request),
            None => state.responses.build(
                HttpEnvelope::new(StatusCode::NOT_FOUND, Body::Text(format!("Product {} not found", id))),
                &request,
            ),
        }
    }

    /// Update a product
    #[api(
        tag = "product",
        incoming = "ProductUpdate",
        outgoing(status = 201, schema = "Product")
    )]
    pub async fn update(
        State(state): State<AppState>,
        request: RequestContext,
        Path(id): Path<String>,
        Json(payload): Json<ProductUpdate>,
    ) -> Result<Response, HttpError> {
        let mut product = sample_product(&id, "Old Name", 0.0);
        if let Some(name) = payload.name {
            product.name = name;
        }
        product.description = payload.description;
        if let Some(price) = payload.price {
            product.price = price;
        }

        let location = HeaderValue::from_str(&format!("/v1/products/{}", id))
            .map_err(HttpError::internal)?;
        let envelope = HttpEnvelope::new(StatusCode::CREATED, record(&product)?).with_header(LOCATION, location);
        state.responses.build(envelope, &request)
    }

    /// Export the catalogue as CSV
    #[api(tag = "product", deprecated)]
    pub async fn export(State(state): State<AppState>) -> Result<Response, HttpError> {
        let mut csv = String::from("id,name,price\n");
        for product in catalogue() {
            csv.push_str(&format!("{},{},{}\n", product.id, product.name, product.price));
        }
        state.responses.build(Body::Stream(axum::body::Body::from(csv)), "json")
    }

    /// Legacy account data
    #[api(tag = "legacy", outgoing(status = 200, schema = "LegacyData"))]
    pub async fn legacy(State(state): State<AppState>) -> Result<Response, HttpError> {
        let data = LegacyData {
            user_id: "user-123".to_string(),
            transaction_amount: 199.99,
        };
        state.responses.build(Body::Json(serde_json::to_value(data).map_err(HttpError::internal)?), "json")
    }
}
