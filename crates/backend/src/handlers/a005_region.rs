use axum::extract::Query;
use axum::Json;
use contracts::domain::a005_region::aggregate::{Region, StoreRegionMapping, StoreRegionMappingRow};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a005_region;
use crate::shared::cache::dashboard_cache;
use crate::shared::error::ApiResult;

/// GET /api/regions
pub async fn list_regions() -> ApiResult<Json<Vec<Region>>> {
    let regions = a005_region::service::list_regions().await?;
    Ok(Json(regions))
}

#[derive(Debug, Deserialize)]
pub struct MappingQuery {
    pub department: String,
}

/// GET /api/regions/mappings?department=slug
pub async fn list_mappings(
    Query(query): Query<MappingQuery>,
) -> ApiResult<Json<Vec<StoreRegionMappingRow>>> {
    let rows = a005_region::service::mapping_rows(&query.department).await?;
    Ok(Json(rows))
}

/// PUT /api/regions/mappings
pub async fn update_mappings(
    Json(mappings): Json<Vec<StoreRegionMapping>>,
) -> ApiResult<Json<serde_json::Value>> {
    let applied = a005_region::service::update_mappings(mappings).await?;
    // Re-keying regions changes every regional rollup
    dashboard_cache().invalidate_prefix("dashboard");
    Ok(Json(json!({ "updated": applied })))
}
