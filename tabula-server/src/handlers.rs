//! HTTP handlers for the data endpoints.

use axum::Json;
use axum::extract::State;
use tabula_engine::url::REMOTE_SCHEMES;
use tabula_engine::{DataSource, is_url, validate_url};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::models::{
    ClearCacheResponse, DataLoadRequest, DataSliceRequest, HealthResponse, LoadResponse,
    MetadataResponse, RecordsResponse, RefreshResponse, StatisticsResponse,
};
use crate::state::AppState;

const SUCCESS: &str = "success";

async fn open_source(state: &AppState, request: &DataLoadRequest) -> ApiResult<DataSource> {
    let source = request.source_url.as_str();
    if state.config.reject_loopback && is_url(source) && !validate_url(source, REMOTE_SCHEMES) {
        return Err(ApiError::BlockedSource(source.to_owned()));
    }

    debug!(source, separator = %request.separator, header = request.header, "Opening source");
    Ok(DataSource::open(source, request.read_options(), &state.cache).await?)
}

/// POST /data/load
pub async fn load_data(
    State(state): State<AppState>,
    Json(request): Json<DataLoadRequest>,
) -> ApiResult<Json<LoadResponse>> {
    let source = open_source(&state, &request).await?;
    let frame = source.frame();
    let preview = match state.config.preview_limit {
        Some(limit) => frame.head(i64::try_from(limit).unwrap_or(i64::MAX)).to_records(),
        None => frame.to_records(),
    };

    info!(source = %request.source_url, shape = ?frame.shape(), "Loaded data");
    Ok(Json(LoadResponse {
        status: SUCCESS,
        shape: frame.shape(),
        columns: frame.column_names(),
        preview,
    }))
}

/// POST /data/head
pub async fn head(
    State(state): State<AppState>,
    Json(request): Json<DataSliceRequest>,
) -> ApiResult<Json<RecordsResponse>> {
    let source = open_source(&state, &request.source).await?;
    Ok(Json(RecordsResponse {
        status: SUCCESS,
        data: source.head(request.n).to_records(),
    }))
}

/// POST /data/tail
pub async fn tail(
    State(state): State<AppState>,
    Json(request): Json<DataSliceRequest>,
) -> ApiResult<Json<RecordsResponse>> {
    let source = open_source(&state, &request.source).await?;
    Ok(Json(RecordsResponse {
        status: SUCCESS,
        data: source.tail(request.n).to_records(),
    }))
}

/// POST /data/describe
pub async fn describe(
    State(state): State<AppState>,
    Json(request): Json<DataLoadRequest>,
) -> ApiResult<Json<StatisticsResponse>> {
    let source = open_source(&state, &request).await?;
    Ok(Json(StatisticsResponse {
        status: SUCCESS,
        statistics: source.describe()?.to_json(),
    }))
}

/// POST /data/metadata
pub async fn metadata(
    State(state): State<AppState>,
    Json(request): Json<DataLoadRequest>,
) -> ApiResult<Json<MetadataResponse>> {
    let source = open_source(&state, &request).await?;
    Ok(Json(MetadataResponse {
        status: SUCCESS,
        metadata: source.metadata(),
    }))
}

/// POST /data/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<DataLoadRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let mut source = open_source(&state, &request).await?;
    source.refresh().await?;

    let frame = source.frame();
    Ok(Json(RefreshResponse {
        status: SUCCESS,
        shape: frame.shape(),
        columns: frame.column_names(),
    }))
}

/// DELETE /data/cache
pub async fn clear_cache(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let removed = state.cache.clear_all().await;
    info!(removed, "Cleared cache");
    Json(ClearCacheResponse {
        status: SUCCESS,
        removed,
    })
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
