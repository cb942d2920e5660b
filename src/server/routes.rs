use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::error;

use super::metrics::record_error;
use super::state::ServerState;
use crate::ingest::DEFAULT_MAX_RESULTS;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
    pub upstream_url: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct SearchBody {
    pub query: Option<String>,
    pub max_results: Option<u32>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn unknown_source(source: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Unknown source: {}", source),
    )
}

/// POST /api/{source}/search
///
/// Forwards a search to the upstream vendor and returns the assigned job
/// UUID as `{"jobUUID": ...}`.
pub async fn search(
    State(state): State<ServerState>,
    Path(source): Path<String>,
    Json(body): Json<SearchBody>,
) -> Response {
    if source != state.upstream.source() {
        return unknown_source(&source);
    }

    let query = match body.query.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => query.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "Query is required"),
    };
    let max_results = body.max_results.unwrap_or(DEFAULT_MAX_RESULTS);

    match state.upstream.submit_search(&query, max_results).await {
        Ok(uuid) => Json(json!({ "jobUUID": uuid })).into_response(),
        Err(err) => {
            error!("Search error: {}", err);
            record_error("search", "/api/search");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// GET /api/{source}/result/{job_uuid}
///
/// Passes the vendor's result document through untouched; the poller owns
/// the interpretation of its states.
pub async fn result(
    State(state): State<ServerState>,
    Path((source, job_uuid)): Path<(String, String)>,
) -> Response {
    if source != state.upstream.source() {
        return unknown_source(&source);
    }

    match state.upstream.fetch_result(&job_uuid).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => {
            error!("Result error: {}", err);
            record_error("result", "/api/result");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("GIT_HASH")),
        upstream_url: state.upstream.base_url().to_string(),
    };
    Json(stats)
}

pub async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(3661)), "0d 01:01:01");
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 600)),
            "2d 00:10:00"
        );
    }
}
