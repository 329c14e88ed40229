use axum::Json;
use contracts::domain::a004_kpi_value::aggregate::BulkUpsertReport;
use contracts::usecases::u502_import_actuals::ImportActualsRequest;

use crate::shared::error::ApiResult;
use crate::usecases::u502_import_actuals::executor;

/// POST /api/import/actuals
pub async fn import_actuals(
    Json(request): Json<ImportActualsRequest>,
) -> ApiResult<Json<BulkUpsertReport>> {
    let report = executor::import_actuals(request).await?;
    Ok(Json(report))
}
