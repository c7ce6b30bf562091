//! HTTP REST adapter ("openapi" mode)
//!
//! Depends only on core/. Never imports from mcp/.
//!
//! Every tool is served at `/<tool-name>` for both GET (query string)
//! and POST (JSON body, optionally combined with a query string).

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::core::services::Services;
use crate::core::tools;

pub use handlers::*;

/// Build the REST router with logging and CORS layers applied
pub fn router(services: Arc<Services>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/openapi.json", get(openapi_handler))
        .route(
            &format!("/{}", tools::CALC_HELP),
            get(calc_help_handler).post(calc_help_handler),
        )
        .route(
            &format!("/{}", tools::CALC_LIST_ALLOWED_FNS),
            get(calc_list_allowed_fns_handler).post(calc_list_allowed_fns_handler),
        )
        .route(
            &format!("/{}", tools::CALC_EVALUATE),
            get(calc_evaluate_handler).post(calc_evaluate_handler),
        )
        .route(
            &format!("/{}", tools::WEB_SEARCH_GOOGLE),
            get(web_search_google_handler).post(web_search_google_handler),
        )
        .route(
            &format!("/{}", tools::WEB_SEARCH_SEARXNG),
            get(web_search_searxng_handler).post(web_search_searxng_handler),
        )
        .route(
            &format!("/{}", tools::WEB_FETCH_WEBPAGE),
            get(web_fetch_webpage_handler).post(web_fetch_webpage_handler),
        )
        .layer(axum_middleware::from_fn(middleware::log_request))
        .layer(CorsLayer::permissive())
        .with_state(services)
}
