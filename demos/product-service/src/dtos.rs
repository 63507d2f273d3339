use api_kit::api_schema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Represents a product in the system.
#[api_schema]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub product_code: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Category,
}

#[api_schema]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// A category can have a parent, creating a recursive structure.
    #[schema(no_recursion)]
    pub parent: Option<Box<Category>>,
}

/// DTO for updating a product.
#[api_schema]
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// This is a sample DTO with a different naming convention.
#[api_schema]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub struct LegacyData {
    pub user_id: String,
    pub transaction_amount: f64,
}
