//! aiburn-web - JSON API for aiburn using Axum

pub mod error;
pub mod rate_limit;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use rate_limit::RateLimiter;
pub use router::create_router;
pub use state::AppState;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Run the web server
pub async fn run(state: Arc<AppState>, port: u16) -> Result<()> {
    let router = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;

    info!("Web server listening on http://{}", addr);
    println!("Web server listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
