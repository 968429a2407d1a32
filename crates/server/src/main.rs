//! pagemark HTTP service: fetches web pages and converts them to Markdown.

mod rate_limit;
mod routes;

use std::net::SocketAddr;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::routes::AppState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pagemark_server=info,tower_http=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let app = routes::router(AppState::default());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "pagemark server listening");

    axum::serve(listener, app).await
}
