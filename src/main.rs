use std::sync::Arc;

use blogsphere_server::{config::Config, db::BlogsphereDB, endpoints::get_endpoints_router};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("blogsphere_server=info".parse()?))
        .init();

    if let Err(err) = dotenvy::dotenv() {
        warn!("no .env loaded: {}", err);
    }

    let config = Config::from_env()?;
    let db = BlogsphereDB::new(&config).await?;

    let app = axum::Router::new()
        .merge(get_endpoints_router(Arc::new(db), config.clone()))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
