use chrono::NaiveDate;
use contracts::domain::a004_kpi_value::aggregate::{BulkUpsertReport, KpiValueRow, UpsertOutcome};

use super::repository;
use crate::shared::fiscal;

/// Upsert one fact, normalizing the month to its first day so every
/// identity lookup compares equal dates.
pub async fn upsert_value(mut row: KpiValueRow) -> anyhow::Result<UpsertOutcome> {
    row.date = fiscal::normalize_to_month_start(row.date);
    repository::upsert_value(&row).await
}

/// Per-row upserts folded into a partial-success report. A failing row
/// is recorded and skipped; rows already written stay written.
pub async fn bulk_upsert(rows: Vec<KpiValueRow>) -> anyhow::Result<BulkUpsertReport> {
    let mut report = BulkUpsertReport::default();
    for (index, row) in rows.into_iter().enumerate() {
        match upsert_value(row).await {
            Ok(outcome) => report.record_outcome(&outcome),
            Err(err) => report.record_error(format!("row {}: {}", index, err)),
        }
    }
    Ok(report.finish())
}

pub async fn available_months() -> anyhow::Result<Vec<NaiveDate>> {
    repository::available_months().await
}
