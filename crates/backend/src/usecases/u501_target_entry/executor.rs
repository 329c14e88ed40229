use std::collections::HashMap;

use chrono::NaiveDate;
use contracts::domain::a002_segment::aggregate::SegmentId;
use contracts::domain::a003_kpi_definition::aggregate::KpiId;
use contracts::domain::a004_kpi_value::aggregate::{
    BulkUpsertReport, KpiValueRow, UpsertOutcome,
};
use contracts::usecases::u501_target_entry::{
    BulkTargetRequest, TargetMatrixCell, TargetMatrixKpi, TargetMatrixResponse, TargetMatrixRow,
    TargetUpsertRequest,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::a004_kpi_value::repository::{StoredValue, ValueFilter};
use crate::domain::{a001_department, a002_segment, a003_kpi_definition, a004_kpi_value};
use crate::shared::cache::dashboard_cache;
use crate::shared::error::{ApiError, ApiResult};
use crate::shared::fiscal;

fn target_row(request: &TargetUpsertRequest) -> KpiValueRow {
    KpiValueRow {
        segment_id: request.segment_id,
        kpi_id: request.kpi_id,
        date: request.month,
        value: request.value,
        is_target: true,
    }
}

/// Store or replace one target figure. The month is normalized to its
/// first day before the identity lookup.
pub async fn create_or_replace_target(request: TargetUpsertRequest) -> ApiResult<UpsertOutcome> {
    a002_segment::service::resolve_by_id(request.segment_id.value()).await?;
    a003_kpi_definition::service::resolve_by_id(request.kpi_id.value()).await?;

    let outcome = a004_kpi_value::service::upsert_value(target_row(&request)).await?;
    dashboard_cache().invalidate_prefix("dashboard");
    Ok(outcome)
}

/// Bulk target entry with partial success. A row whose segment or KPI
/// does not resolve is reported and skipped; valid rows still commit.
pub async fn bulk_upsert_targets(request: BulkTargetRequest) -> ApiResult<BulkUpsertReport> {
    let mut report = BulkUpsertReport::default();
    for (index, target) in request.targets.iter().enumerate() {
        if a002_segment::repository::get_by_id(target.segment_id.value())
            .await?
            .is_none()
        {
            report.record_error(format!(
                "row {}: segment {} not found",
                index,
                target.segment_id.value()
            ));
            continue;
        }
        if a003_kpi_definition::repository::get_by_id(target.kpi_id.value())
            .await?
            .is_none()
        {
            report.record_error(format!(
                "row {}: kpi {} not found",
                index,
                target.kpi_id.value()
            ));
            continue;
        }
        match a004_kpi_value::service::upsert_value(target_row(target)).await {
            Ok(outcome) => report.record_outcome(&outcome),
            Err(err) => report.record_error(format!("row {}: {}", index, err)),
        }
    }
    let report = report.finish();
    if report.created_count + report.updated_count > 0 {
        dashboard_cache().invalidate_prefix("dashboard");
    }
    Ok(report)
}

/// Remove one stored target row by id. Returns NotFound when the id does
/// not exist or points at an actual.
pub async fn delete_target(id: Uuid) -> ApiResult<()> {
    if !a004_kpi_value::repository::delete_target(id).await? {
        return Err(ApiError::NotFound(format!("target {} not found", id)));
    }
    dashboard_cache().invalidate_prefix("dashboard");
    Ok(())
}

/// Entry grid for one department and month: the stored targets plus last
/// year's actual for each (store, KPI) cell.
pub async fn target_matrix(
    slug: &str,
    year: Option<i32>,
    month: Option<u32>,
) -> ApiResult<TargetMatrixResponse> {
    let department = a001_department::service::resolve_by_slug(slug).await?;
    let (default_year, default_month) = fiscal::current_period_defaults();
    let year = year.unwrap_or(default_year);
    let month = month.unwrap_or(default_month);
    let as_of = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid period {}-{}", year, month)))?;

    let kpis = a003_kpi_definition::service::list_visible(department.id.value(), None).await?;
    let segments = a002_segment::service::list_by_department(department.id.value()).await?;
    let segment_ids: Vec<Uuid> = segments.iter().map(|s| s.id.value()).collect();
    let kpi_ids: Vec<Uuid> = kpis.iter().map(|k| k.id.value()).collect();

    let targets = a004_kpi_value::repository::read_values_with_ids(&ValueFilter {
        segment_ids: Some(segment_ids.clone()),
        kpi_ids: Some(kpi_ids.clone()),
        dates: Some(vec![as_of]),
        is_target: Some(true),
        ..Default::default()
    })
    .await?;
    let prior_actuals = a004_kpi_value::repository::read_values(&ValueFilter {
        segment_ids: Some(segment_ids),
        kpi_ids: Some(kpi_ids),
        dates: Some(vec![fiscal::previous_year_month(as_of)]),
        is_target: Some(false),
        ..Default::default()
    })
    .await?;

    let stored: HashMap<(SegmentId, KpiId), &StoredValue> = targets
        .iter()
        .map(|v| ((v.row.segment_id, v.row.kpi_id), v))
        .collect();
    let last_year: HashMap<(SegmentId, KpiId), Decimal> = prior_actuals
        .iter()
        .map(|r| ((r.segment_id, r.kpi_id), r.value))
        .collect();

    let rows = segments
        .iter()
        .map(|segment| TargetMatrixRow {
            segment_id: segment.id,
            segment_code: segment.code.clone(),
            segment_name: segment.name.clone(),
            cells: kpis
                .iter()
                .map(|kpi| {
                    let key = (segment.id, kpi.id);
                    let existing = stored.get(&key);
                    TargetMatrixCell {
                        kpi_id: kpi.id,
                        value_id: existing.map(|v| v.id),
                        value: existing.map(|v| v.row.value),
                        last_year_actual: last_year.get(&key).copied(),
                    }
                })
                .collect(),
        })
        .collect();

    Ok(TargetMatrixResponse {
        fiscal_year: fiscal::fiscal_year(as_of),
        month: as_of,
        kpis: kpis
            .into_iter()
            .map(|kpi| TargetMatrixKpi {
                id: kpi.id,
                name: kpi.name,
                unit: kpi.unit,
            })
            .collect(),
        rows,
    })
}
