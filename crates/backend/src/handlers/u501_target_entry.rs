use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a004_kpi_value::aggregate::{BulkUpsertReport, UpsertOutcome};
use contracts::usecases::u501_target_entry::{
    BulkTargetRequest, TargetMatrixResponse, TargetUpsertRequest,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::shared::error::ApiResult;
use crate::usecases::u501_target_entry::executor;

/// POST /api/targets
pub async fn create_or_replace(
    Json(request): Json<TargetUpsertRequest>,
) -> ApiResult<(StatusCode, Json<UpsertOutcome>)> {
    let outcome = executor::create_or_replace_target(request).await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// POST /api/targets/bulk
pub async fn bulk_upsert(
    Json(request): Json<BulkTargetRequest>,
) -> ApiResult<Json<BulkUpsertReport>> {
    let report = executor::bulk_upsert_targets(request).await?;
    Ok(Json(report))
}

/// DELETE /api/targets/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    executor::delete_target(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct MatrixQuery {
    pub department: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/targets/matrix?department=slug
pub async fn matrix(Query(query): Query<MatrixQuery>) -> ApiResult<Json<TargetMatrixResponse>> {
    let response =
        executor::target_matrix(&query.department, query.year, query.month).await?;
    Ok(Json(response))
}
