use contracts::domain::a002_segment::aggregate::Segment;
use contracts::domain::a005_region::aggregate::{
    Region, StoreRegionMapping, StoreRegionMappingRow,
};

use super::repository;
use crate::domain::a002_segment;
use crate::shared::error::{ApiError, ApiResult};

pub async fn list_regions() -> anyhow::Result<Vec<Region>> {
    repository::list_regions().await
}

pub async fn list_mappings() -> anyhow::Result<Vec<StoreRegionMapping>> {
    repository::list_mappings().await
}

/// Mapping list for one department's stores; unassigned segments appear
/// with an empty region.
pub async fn mapping_rows(department_slug: &str) -> ApiResult<Vec<StoreRegionMappingRow>> {
    let department = crate::domain::a001_department::service::resolve_by_slug(department_slug).await?;
    let segments = a002_segment::service::list_by_department(department.id.value()).await?;
    let mappings = repository::list_mappings().await?;
    let regions = repository::list_regions().await?;

    let rows = segments
        .iter()
        .map(|segment| build_mapping_row(segment, &mappings, &regions))
        .collect();
    Ok(rows)
}

fn build_mapping_row(
    segment: &Segment,
    mappings: &[StoreRegionMapping],
    regions: &[Region],
) -> StoreRegionMappingRow {
    let region_id = mappings
        .iter()
        .find(|m| m.segment_id == segment.id)
        .map(|m| m.region_id);
    let region_name = region_id
        .and_then(|id| regions.iter().find(|r| r.id == id))
        .map(|r| r.name.clone());
    StoreRegionMappingRow {
        segment_id: segment.id,
        segment_name: segment.name.clone(),
        region_id,
        region_name,
    }
}

/// Bulk re-assignment from the administration screen. Every referenced
/// segment and region must exist; the batch is applied row by row.
pub async fn update_mappings(mappings: Vec<StoreRegionMapping>) -> ApiResult<usize> {
    let mut applied = 0;
    for mapping in &mappings {
        a002_segment::service::resolve_by_id(mapping.segment_id.value()).await?;
        repository::get_region_by_id(mapping.region_id.value())
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("region '{}' not found", mapping.region_id.value()))
            })?;
        repository::upsert_mapping(mapping).await?;
        applied += 1;
    }
    Ok(applied)
}
