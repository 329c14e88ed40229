pub mod a001_department;
pub mod a004_kpi_value;
pub mod a005_region;
pub mod d401_department_summary;
pub mod d402_store_ranking;
pub mod d403_product_matrix;
pub mod d404_store_summary;
pub mod d405_regional_summary;
pub mod d406_kpi_trend;
pub mod d407_company_dashboard;
pub mod u501_target_entry;
pub mod u502_import_actuals;

use serde::Serialize;
use serde_json::Value;

use crate::shared::cache::dashboard_cache;
use crate::shared::error::ApiResult;

/// Read-through helper for the dashboard handlers: serve the cached
/// rendering when present, otherwise compute, store and return it.
pub(crate) async fn cached<T, F>(key: String, compute: F) -> ApiResult<Value>
where
    T: Serialize,
    F: std::future::Future<Output = ApiResult<T>>,
{
    if let Some(hit) = dashboard_cache().get(&key) {
        return Ok(hit);
    }
    let response = compute.await?;
    let value = serde_json::to_value(&response).map_err(anyhow::Error::from)?;
    dashboard_cache().put(&key, value.clone());
    Ok(value)
}
