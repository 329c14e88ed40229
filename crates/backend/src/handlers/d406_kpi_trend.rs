use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::dashboards::d406_kpi_trend;
use crate::shared::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub kpi_id: Uuid,
    /// Fiscal year; defaults to the one containing the current month.
    pub year: Option<i32>,
}

/// GET /api/kpi/trend?kpi_id=...
pub async fn kpi_trend(Query(query): Query<TrendQuery>) -> ApiResult<Json<Value>> {
    let key = format!("dashboard:d406:trend:{}:{:?}", query.kpi_id, query.year);
    let value = super::cached(key, async {
        d406_kpi_trend::service::kpi_trend(query.kpi_id, query.year).await
    })
    .await?;
    Ok(Json(value))
}

/// GET /api/kpi/stores/:id/trend?kpi_id=...
pub async fn store_trend(
    Path(segment_id): Path<Uuid>,
    Query(query): Query<TrendQuery>,
) -> ApiResult<Json<Value>> {
    let key = format!(
        "dashboard:d406:store:{}:{}:{:?}",
        segment_id, query.kpi_id, query.year
    );
    let value = super::cached(key, async {
        d406_kpi_trend::service::store_trend(segment_id, query.kpi_id, query.year).await
    })
    .await?;
    Ok(Json(value))
}
