use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::dashboards::d401_department_summary;
use crate::shared::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/departments/:slug/summary
pub async fn department_summary(
    Path(slug): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<Value>> {
    let key = format!(
        "dashboard:d401:{}:{:?}:{:?}",
        slug, query.year, query.month
    );
    let value = super::cached(key, async {
        d401_department_summary::service::department_summary(&slug, query.year, query.month).await
    })
    .await?;
    Ok(Json(value))
}
