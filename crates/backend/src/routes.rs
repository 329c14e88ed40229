use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;

/// Route table of the reporting API.
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // REFERENCE DATA
        // ========================================
        .route("/api/departments", get(handlers::a001_department::list_all))
        .route("/api/kpi/months", get(handlers::a004_kpi_value::available_months))
        .route("/api/regions", get(handlers::a005_region::list_regions))
        .route(
            "/api/regions/mappings",
            get(handlers::a005_region::list_mappings)
                .put(handlers::a005_region::update_mappings),
        )
        // ========================================
        // DASHBOARDS
        // ========================================
        .route(
            "/api/dashboard",
            get(handlers::d407_company_dashboard::company_dashboard),
        )
        .route(
            "/api/departments/:slug/summary",
            get(handlers::d401_department_summary::department_summary),
        )
        .route("/api/kpi/ranking", get(handlers::d402_store_ranking::ranking))
        .route("/api/kpi/alerts", get(handlers::d402_store_ranking::alerts))
        .route("/api/kpi/matrix", get(handlers::d403_product_matrix::product_matrix))
        .route("/api/kpi/stores", get(handlers::d404_store_summary::store_summary))
        .route(
            "/api/regions/summary",
            get(handlers::d405_regional_summary::regional_summary),
        )
        .route("/api/kpi/trend", get(handlers::d406_kpi_trend::kpi_trend))
        .route(
            "/api/kpi/stores/:id/trend",
            get(handlers::d406_kpi_trend::store_trend),
        )
        // ========================================
        // TARGET ENTRY (u501)
        // ========================================
        .route("/api/targets", post(handlers::u501_target_entry::create_or_replace))
        .route("/api/targets/bulk", post(handlers::u501_target_entry::bulk_upsert))
        .route("/api/targets/matrix", get(handlers::u501_target_entry::matrix))
        .route("/api/targets/:id", delete(handlers::u501_target_entry::delete))
        // ========================================
        // ACTUALS IMPORT (u502)
        // ========================================
        .route(
            "/api/import/actuals",
            post(handlers::u502_import_actuals::import_actuals),
        )
}
