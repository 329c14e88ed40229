use axum::extract::Query;
use axum::Json;
use contracts::shared::period::PeriodQuery;
use serde_json::Value;

use crate::dashboards::d407_company_dashboard;
use crate::shared::error::ApiResult;

/// GET /api/dashboard?period_type=monthly|quarterly|yearly
pub async fn company_dashboard(Query(query): Query<PeriodQuery>) -> ApiResult<Json<Value>> {
    let key = format!(
        "dashboard:d407:{:?}:{:?}:{:?}:{:?}",
        query.period_type, query.year, query.month, query.quarter
    );
    let value = super::cached(key, async {
        d407_company_dashboard::service::company_dashboard(
            query.period_type,
            query.year,
            query.month,
            query.quarter,
        )
        .await
    })
    .await?;
    Ok(Json(value))
}
