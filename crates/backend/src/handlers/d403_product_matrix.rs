use axum::extract::Query;
use axum::Json;
use contracts::shared::period::PeriodType;
use serde::Deserialize;
use serde_json::Value;

use crate::dashboards::d403_product_matrix;
use crate::shared::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct MatrixQuery {
    pub department: String,
    #[serde(default)]
    pub period_type: PeriodType,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/kpi/matrix?department=slug
pub async fn product_matrix(Query(query): Query<MatrixQuery>) -> ApiResult<Json<Value>> {
    let key = format!(
        "dashboard:d403:{}:{:?}:{:?}:{:?}",
        query.department, query.period_type, query.year, query.month
    );
    let value = super::cached(key, async {
        d403_product_matrix::service::product_matrix(
            &query.department,
            query.period_type,
            query.year,
            query.month,
        )
        .await
    })
    .await?;
    Ok(Json(value))
}
