use contracts::domain::a002_segment::aggregate::Segment;
use uuid::Uuid;

use super::repository;
use crate::shared::error::{ApiError, ApiResult};

pub async fn list_by_department(department_id: Uuid) -> anyhow::Result<Vec<Segment>> {
    repository::list_by_department(department_id).await
}

pub async fn resolve_by_id(id: Uuid) -> ApiResult<Segment> {
    repository::get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("segment '{}' not found", id)))
}
