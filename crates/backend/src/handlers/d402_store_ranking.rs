use axum::extract::Query;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::dashboards::d402_store_ranking;
use crate::shared::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub kpi_id: Uuid,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/kpi/ranking?kpi_id=...
pub async fn ranking(Query(query): Query<RankingQuery>) -> ApiResult<Json<Value>> {
    let key = format!(
        "dashboard:d402:ranking:{}:{:?}:{:?}",
        query.kpi_id, query.year, query.month
    );
    let value = super::cached(key, async {
        d402_store_ranking::service::ranking(query.kpi_id, query.year, query.month).await
    })
    .await?;
    Ok(Json(value))
}

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub department: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/kpi/alerts
pub async fn alerts(Query(query): Query<AlertsQuery>) -> ApiResult<Json<Value>> {
    let key = format!(
        "dashboard:d402:alerts:{:?}:{:?}:{:?}",
        query.department, query.year, query.month
    );
    let value = super::cached(key, async {
        d402_store_ranking::service::alerts(query.department.as_deref(), query.year, query.month)
            .await
    })
    .await?;
    Ok(Json(value))
}
