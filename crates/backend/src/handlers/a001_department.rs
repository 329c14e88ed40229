use axum::Json;
use contracts::domain::a001_department::aggregate::Department;

use crate::domain::a001_department;
use crate::shared::error::ApiResult;

/// GET /api/departments
pub async fn list_all() -> ApiResult<Json<Vec<Department>>> {
    let departments = a001_department::service::list_all().await?;
    Ok(Json(departments))
}
