//! HTTP handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use overlay_common::TileError;
use protocol::{ProtocolRegistry, RequestParameters};
use serde::Serialize;
use tracing::{error, warn};

/// GET /tiles/:scheme/*path - Render one overlay tile
pub async fn tile_handler(
    Extension(registry): Extension<Arc<ProtocolRegistry>>,
    Path((scheme, path)): Path<(String, String)>,
) -> Response {
    let url = format!("{}://{}", scheme, path.trim_start_matches('/'));

    let result = match registry
        .request(RequestParameters::new(url.clone()), None)
        .into_future()
    {
        Some(pending) => pending.await,
        None => Err(TileError::Runtime("handler returned no future".to_string())),
    };

    match result {
        Ok(tile) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            tile.data,
        )
            .into_response(),
        Err(e) => error_response(&url, e),
    }
}

#[derive(Debug, Serialize)]
pub struct ProtocolInfo {
    pub scheme: String,
    pub profile: String,
    pub description: Option<String>,
    pub alpha: u8,
}

/// GET /api/protocols - Registered schemes and their profiles
pub async fn protocols_handler(
    Extension(registry): Extension<Arc<ProtocolRegistry>>,
) -> Json<Vec<ProtocolInfo>> {
    let protocols = registry
        .schemes()
        .into_iter()
        .filter_map(|scheme| registry.get(&scheme))
        .map(|handler| ProtocolInfo {
            scheme: handler.scheme().to_string(),
            profile: handler.profile().name.clone(),
            description: handler.profile().description.clone(),
            alpha: handler.alpha(),
        })
        .collect();
    Json(protocols)
}

#[derive(Debug, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
    pub alpha: u8,
}

/// GET /api/legend/:scheme - Band legend of one scheme, top band first
pub async fn legend_handler(
    Extension(registry): Extension<Arc<ProtocolRegistry>>,
    Path(scheme): Path<String>,
) -> Response {
    let Some(handler) = registry.get(&scheme) else {
        return error_response(&scheme, TileError::UnknownScheme(scheme.clone()));
    };

    let legend: Vec<LegendEntry> = handler
        .profile()
        .table
        .legend(handler.alpha())
        .into_iter()
        .map(|(label, color)| LegendEntry {
            label,
            color: color.to_hex(),
            alpha: color.a,
        })
        .collect();
    Json(legend).into_response()
}

/// GET /health - Liveness check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn error_response(target: &str, e: TileError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(request = %target, error = %e, "Tile request failed");
    } else {
        warn!(request = %target, error = %e, "Tile request rejected");
    }
    (status, e.to_string()).into_response()
}
