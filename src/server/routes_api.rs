//! The query-parameter driven control API under `/api`.

use super::error::ApiError;
use super::AppContext;
use crate::library::JobKind;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use nfoforge_common::{StatusFilter, VideoCategory};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/scan", get(scan))
        .route("/scanResult", get(scan_result))
        .route("/list", get(list))
        .route("/detail", get(detail))
        .route("/scrape", get(scrape))
        .route("/refresh", get(refresh))
        .route("/refreshResult", get(refresh_result))
        .route("/version", get(version))
        .route("/quit", get(quit))
}

/// Every parameter arrives as a raw string so that a bad value turns into a
/// JSON error instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiQuery {
    video_type: Option<String>,
    force_detect_hdr: Option<String>,
    status: Option<String>,
    id: Option<String>,
    tmdbid: Option<String>,
    season_id: Option<String>,
    force_use_online_tv_meta: Option<String>,
    recheck: Option<String>,
}

impl ApiQuery {
    fn category(&self) -> Result<VideoCategory, ApiError> {
        let value = required("videoType", &self.video_type)?;
        value
            .parse()
            .map_err(|_| ApiError::invalid("videoType", value))
    }

    fn id(&self) -> Result<usize, ApiError> {
        parse_number("id", required("id", &self.id)?)
    }

    fn filter(&self) -> Result<StatusFilter, ApiError> {
        match self.status.as_deref() {
            None | Some("") => Ok(StatusFilter::All),
            Some(value) => value.parse().map_err(|_| ApiError::invalid("status", value)),
        }
    }
}

fn required<'a>(name: &'static str, value: &'a Option<String>) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::MissingParam(name)),
    }
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T, ApiError> {
    value.parse().map_err(|_| ApiError::invalid(name, value))
}

/// Optional boolean flag; accepts `true`/`false` and `1`/`0`.
fn parse_flag(name: &'static str, value: &Option<String>) -> Result<Option<bool>, ApiError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(ApiError::invalid(name, other)),
    }
}

async fn scan(
    State(ctx): State<AppContext>,
    Query(params): Query<ApiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = params.category()?;
    let force = parse_flag("forceDetectHdr", &params.force_detect_hdr)?.unwrap_or(false);

    ctx.library.start_scan(category, force)?;
    Ok(Json(json!({ "success": true, "msg": "Begin scanning!" })))
}

async fn scan_result(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(ctx.library.all_job_status(JobKind::Scan))
}

async fn list(
    State(ctx): State<AppContext>,
    Query(params): Query<ApiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = params.category()?;
    let filter = params.filter()?;

    let list = ctx.library.list(category, filter)?;
    Ok(Json(json!({ "success": true, "list": list })))
}

async fn detail(
    State(ctx): State<AppContext>,
    Query(params): Query<ApiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = params.category()?;
    let id = params.id()?;
    let recheck = parse_flag("recheck", &params.recheck)?.unwrap_or(false);

    let detail = ctx.library.detail(category, id, recheck).await?;
    Ok(Json(json!({ "success": true, "detail": detail })))
}

async fn scrape(
    State(ctx): State<AppContext>,
    Query(params): Query<ApiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = params.category()?;
    let id = params.id()?;
    let tmdb_id: u64 = parse_number("tmdbid", required("tmdbid", &params.tmdbid)?)?;
    let season = match params.season_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(parse_number::<u32>("seasonId", value)?),
    };
    let force = parse_flag("forceUseOnlineTvMeta", &params.force_use_online_tv_meta)?;

    let detail = ctx
        .library
        .scrape(category, id, tmdb_id, season, force)
        .await?;
    Ok(Json(json!({
        "success": true,
        "msg": "Scrape finished!",
        "detail": detail,
    })))
}

async fn refresh(
    State(ctx): State<AppContext>,
    Query(params): Query<ApiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = params.category()?;

    ctx.library.start_refresh(category)?;
    Ok(Json(json!({ "success": true, "msg": "Begin refreshing!" })))
}

async fn refresh_result(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(ctx.library.all_job_status(JobKind::Refresh))
}

async fn version() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn quit(State(ctx): State<AppContext>) -> impl IntoResponse {
    tracing::info!("Quit requested through the API");
    ctx.library.shutdown();
    Json(json!({ "success": true, "msg": "Shutting down!" }))
}
