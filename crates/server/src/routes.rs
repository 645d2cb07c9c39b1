//! HTTP routes

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Path as UrlPath, State},
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::ApiError;
use crate::extract::ItemBody;
use crate::store::{ItemPatch, ItemStore, NewItem};

#[derive(Debug, Default)]
pub struct AppState {
    pub items: ItemStore,
}

/// Build the application router.
///
/// `/api/*` is served by the handlers below; every other path is looked up
/// under `static_dir`. Anything unmatched gets the JSON 404 envelope.
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let static_files = ServeDir::new(static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found_handler.into_service());

    // A known path with an unrouted method is as unmatched as an unknown path.
    let app = Router::new()
        .route("/api/health", get(health_handler).fallback(not_found_handler))
        .route(
            "/api/items",
            get(list_items_handler)
                .post(create_item_handler)
                .fallback(not_found_handler),
        )
        .route(
            "/api/items/:id",
            get(get_item_handler)
                .put(update_item_handler)
                .delete(delete_item_handler)
                .fallback(not_found_handler),
        )
        .with_state(state)
        .fallback_service(static_files);

    with_security_headers(app)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    base-uri 'self'; \
    font-src 'self' https: data:; \
    form-action 'self'; \
    frame-ancestors 'self'; \
    img-src 'self' data: https:; \
    object-src 'none'; \
    script-src 'self'; \
    script-src-attr 'none'; \
    style-src 'self' 'unsafe-inline'";

/// Response hardening headers, set on every response unless a handler set them
fn with_security_headers(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn list_items_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let items = state.items.list().await;
    Json(json!({
        "success": true,
        "count": items.len(),
        "data": items,
    }))
}

async fn get_item_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.items.get(&id).await?;
    Ok(Json(json!({ "success": true, "data": item })))
}

async fn create_item_handler(
    State(state): State<Arc<AppState>>,
    ItemBody(input): ItemBody<NewItem>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.items.create(input).await?;
    debug!("Created item {}", item.id);
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": item }))))
}

async fn update_item_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
    ItemBody(patch): ItemBody<ItemPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.items.update(&id, patch).await?;
    Ok(Json(json!({ "success": true, "data": item })))
}

async fn delete_item_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
) -> Result<StatusCode, ApiError> {
    state.items.delete(&id).await?;
    debug!("Deleted item {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn not_found_handler() -> ApiError {
    ApiError::UnknownEndpoint
}
