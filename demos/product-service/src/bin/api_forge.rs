//! Writes API documents for the product service, e.g.
//! `cargo run --bin api-forge -- generate openapi --filter public`.

use api_kit::api::{FilterFactory, PathPrefixFilter, TagFilter};
use api_kit::command::{self, ApiForge};
use api_kit::ApiKitConfig;
use std::path::Path;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let project_dir = env!("CARGO_MANIFEST_DIR");
    let config = ApiKitConfig::from_project(Path::new(project_dir))?;
    let (_, routes) = product_service::app(&config);

    let filters = FilterFactory::new()
        .register("public", PathPrefixFilter::new("/v1/products"))
        .register("legacy", TagFilter::new("legacy"));
    let forge = ApiForge::with_config(Arc::new(routes), project_dir, config).filters(filters);

    command::run(&forge)
}
