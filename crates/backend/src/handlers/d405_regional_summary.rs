use axum::extract::Query;
use axum::Json;
use contracts::shared::period::PeriodType;
use serde::Deserialize;
use serde_json::Value;

use crate::dashboards::d405_regional_summary;
use crate::shared::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct RegionalSummaryQuery {
    pub department: String,
    #[serde(default)]
    pub period_type: PeriodType,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub sales_kpi: Option<String>,
    pub customers_kpi: Option<String>,
}

/// GET /api/regions/summary?department=slug
pub async fn regional_summary(
    Query(query): Query<RegionalSummaryQuery>,
) -> ApiResult<Json<Value>> {
    let key = format!(
        "dashboard:d405:{}:{:?}:{:?}:{:?}:{:?}:{:?}",
        query.department,
        query.period_type,
        query.year,
        query.month,
        query.sales_kpi,
        query.customers_kpi
    );
    let value = super::cached(key, async {
        d405_regional_summary::service::regional_summary(
            &query.department,
            query.period_type,
            query.year,
            query.month,
            query.sales_kpi.as_deref(),
            query.customers_kpi.as_deref(),
        )
        .await
    })
    .await?;
    Ok(Json(value))
}
