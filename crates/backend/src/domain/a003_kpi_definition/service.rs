use contracts::domain::a003_kpi_definition::aggregate::{KpiCategory, KpiDefinition};
use uuid::Uuid;

use super::repository;
use crate::shared::error::{ApiError, ApiResult};

pub async fn list_visible(
    department_id: Uuid,
    category: Option<&KpiCategory>,
) -> anyhow::Result<Vec<KpiDefinition>> {
    repository::list_visible_by_department(department_id, category).await
}

pub async fn resolve_by_id(id: Uuid) -> ApiResult<KpiDefinition> {
    repository::get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("KPI '{}' not found", id)))
}

/// Resolve a KPI by its catalog name inside one department. The store
/// and regional summaries use this for their sales/customers pair.
pub async fn resolve_by_name(department_id: Uuid, name: &str) -> ApiResult<KpiDefinition> {
    repository::get_by_name(department_id, name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("KPI '{}' not found", name)))
}
