//! # colmeia-web
//!
//! axum HTTP layer for Colmeia.
//!
//! Serves the admin surface as JSON: the home and production dashboards,
//! the configurable navigation menu, the monthly CSV export, personal data
//! removal and CRUD endpoints for every registered model. Identity comes
//! from an upstream proxy through [`identity::USER_HEADER`].

pub mod error;
pub mod filters;
pub mod format;
pub mod handlers;
pub mod identity;
pub mod media;
pub mod menu;
pub mod registry;
pub mod routes;
pub mod state;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the full admin router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(routes::PRIVACY_POLICY, get(handlers::privacy::policy))
        .route(routes::PRIVACY_DELETE_ENTRY, get(handlers::privacy::delete_data_entry))
        .route("/admin/", get(handlers::home::index))
        .route("/admin/menu/", get(handlers::home::menu))
        .route("/admin/login/", get(handlers::account::login))
        .route(
            "/admin/excluir-meus-dados/",
            get(handlers::account::delete_summary).post(handlers::account::delete_personal_data),
        )
        .route("/admin/producao/", get(handlers::production::dashboard))
        .route(
            "/admin/producao/colmeia/{id}/",
            get(handlers::production::hive_detail),
        )
        .route(
            "/admin/apiary/revisionattachment/add/",
            post(handlers::admin::upload_attachment),
        )
        .route(
            "/admin/apiary/hive/{id}/photo/",
            post(handlers::admin::upload_hive_photo),
        )
        .route(
            "/admin/core/menuconfig/{id}/activate/",
            post(handlers::admin::activate_menu_config),
        )
        .route("/admin/{app}/", get(handlers::home::app_index))
        .route("/admin/{app}/{model}/", get(handlers::admin::changelist))
        .route("/admin/{app}/{model}/add/", post(handlers::admin::add))
        .route(
            "/admin/{app}/{model}/{id}/change/",
            get(handlers::admin::detail).post(handlers::admin::change),
        )
        .route("/admin/{app}/{model}/{id}/delete/", post(handlers::admin::delete))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve the router until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "colmeia admin listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
