use std::collections::HashMap;

use contracts::domain::a002_segment::aggregate::{Segment, SegmentId};
use contracts::domain::a003_kpi_definition::aggregate::{KpiDefinition, KpiId};
use contracts::domain::a004_kpi_value::aggregate::{BulkUpsertReport, KpiValueRow};
use contracts::usecases::u502_import_actuals::{ActualRecord, ImportActualsRequest};

use crate::domain::{a001_department, a002_segment, a003_kpi_definition, a004_kpi_value};
use crate::shared::cache::dashboard_cache;
use crate::shared::error::ApiResult;

/// Import a feed of actuals for one department. Each record may name its
/// store and KPI by id or by business code/name; rows that resolve to
/// nothing are reported individually while the rest commit.
pub async fn import_actuals(request: ImportActualsRequest) -> ApiResult<BulkUpsertReport> {
    let department = a001_department::service::resolve_by_slug(&request.department_slug).await?;
    let segments = a002_segment::service::list_by_department(department.id.value()).await?;
    let kpis = a003_kpi_definition::service::list_visible(department.id.value(), None).await?;

    let segments_by_id: HashMap<SegmentId, &Segment> =
        segments.iter().map(|s| (s.id, s)).collect();
    let segments_by_code: HashMap<&str, &Segment> =
        segments.iter().map(|s| (s.code.as_str(), s)).collect();
    let kpis_by_id: HashMap<KpiId, &KpiDefinition> = kpis.iter().map(|k| (k.id, k)).collect();
    let kpis_by_name: HashMap<&str, &KpiDefinition> =
        kpis.iter().map(|k| (k.name.as_str(), k)).collect();

    let mut report = BulkUpsertReport::default();
    for (index, record) in request.records.iter().enumerate() {
        let segment = match resolve_segment(record, &segments_by_id, &segments_by_code) {
            Ok(segment) => segment,
            Err(message) => {
                report.record_error(format!("row {}: {}", index, message));
                continue;
            }
        };
        let kpi = match resolve_kpi(record, &kpis_by_id, &kpis_by_name) {
            Ok(kpi) => kpi,
            Err(message) => {
                report.record_error(format!("row {}: {}", index, message));
                continue;
            }
        };
        let row = KpiValueRow {
            segment_id: segment.id,
            kpi_id: kpi.id,
            date: record.month,
            value: record.value,
            is_target: false,
        };
        match a004_kpi_value::service::upsert_value(row).await {
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

fn resolve_segment<'a>(
    record: &ActualRecord,
    by_id: &HashMap<SegmentId, &'a Segment>,
    by_code: &HashMap<&str, &'a Segment>,
) -> Result<&'a Segment, String> {
    if let Some(id) = record.segment_id {
        return by_id
            .get(&id)
            .copied()
            .ok_or_else(|| format!("segment {} not found in department", id.value()));
    }
    if let Some(code) = &record.segment_code {
        return by_code
            .get(code.as_str())
            .copied()
            .ok_or_else(|| format!("segment code '{}' not found in department", code));
    }
    Err("record names neither segment_id nor segment_code".into())
}

fn resolve_kpi<'a>(
    record: &ActualRecord,
    by_id: &HashMap<KpiId, &'a KpiDefinition>,
    by_name: &HashMap<&str, &'a KpiDefinition>,
) -> Result<&'a KpiDefinition, String> {
    if let Some(id) = record.kpi_id {
        return by_id
            .get(&id)
            .copied()
            .ok_or_else(|| format!("kpi {} not found in department", id.value()));
    }
    if let Some(name) = &record.kpi_name {
        return by_name
            .get(name.as_str())
            .copied()
            .ok_or_else(|| format!("kpi '{}' not found in department", name));
    }
    Err("record names neither kpi_id nor kpi_name".into())
}
