//! HTTP surface for the rules engine.
//!
//! Exposes the ManyChat keyword webhook, the Dialogflow intent webhook, a
//! direct intent lookup and a liveness probe over one axum router.

mod auth;
mod error;
mod handlers;
mod state;

pub use error::ServerError;
pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use log::info;
use tokio::net::TcpListener;

/// Build the service router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::alive))
        .route(
            "/manychat",
            post(handlers::manychat).fallback(handlers::method_not_allowed),
        )
        .route("/webhook", post(handlers::dialogflow))
        .route("/get-response", post(handlers::get_response))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    let local = listener.local_addr().map_err(ServerError::Serve)?;
    info!("rules engine listening (addr={})", local);
    axum::serve(listener, build_router(state))
        .await
        .map_err(ServerError::Serve)
}
