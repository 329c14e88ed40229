use axum::Json;
use chrono::NaiveDate;

use crate::domain::a004_kpi_value;
use crate::shared::error::ApiResult;

/// GET /api/kpi/months
pub async fn available_months() -> ApiResult<Json<Vec<NaiveDate>>> {
    let months = a004_kpi_value::service::available_months().await?;
    Ok(Json(months))
}
