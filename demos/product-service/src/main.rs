use api_kit::ApiKitConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ApiKitConfig::from_project(Path::new(env!("CARGO_MANIFEST_DIR")))?;
    let (app, routes) = product_service::app(&config);
    tracing::info!(routes = routes.len(), "routes registered");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    println!("🚀 Server running at http://127.0.0.1:3000");
    println!("📚 Generate the OpenAPI document with `cargo run --bin api-forge -- generate openapi`");

    axum::serve(listener, app).await?;
    Ok(())
}
