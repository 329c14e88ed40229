use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::a002_segment::aggregate::SegmentId;
use crate::domain::a003_kpi_definition::aggregate::KpiId;

/// One fact row of the KPI value table.
///
/// Composite identity: (segment_id, kpi_id, date, is_target); at most one
/// row may exist per identity and `date` is always a month start. `is_target`
/// separates the planned series from the realized one over the same
/// (segment, kpi, month) keyspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiValueRow {
    pub segment_id: SegmentId,
    pub kpi_id: KpiId,
    pub date: NaiveDate,
    pub value: Decimal,
    pub is_target: bool,
}

/// Result of a single-row upsert against the fact table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub id: Uuid,
    /// True when a new row was inserted, false when an existing row's
    /// value was replaced in place.
    pub created: bool,
}

/// Partial-success report of a bulk upsert.
///
/// Each row succeeds or fails independently; non-erroring rows are
/// committed even when `success` is false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkUpsertReport {
    pub created_count: u32,
    pub updated_count: u32,
    pub errors: Vec<String>,
    pub success: bool,
}

impl BulkUpsertReport {
    pub fn record_outcome(&mut self, outcome: &UpsertOutcome) {
        if outcome.created {
            self.created_count += 1;
        } else {
            self.updated_count += 1;
        }
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Seal the report; `success` means "no per-row errors", not
    /// "everything was inserted".
    pub fn finish(mut self) -> Self {
        self.success = self.errors.is_empty();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(created: bool) -> UpsertOutcome {
        UpsertOutcome {
            id: Uuid::new_v4(),
            created,
        }
    }

    #[test]
    fn report_counts_created_and_updated_separately() {
        let mut report = BulkUpsertReport::default();
        report.record_outcome(&outcome(true));
        report.record_outcome(&outcome(true));
        report.record_outcome(&outcome(false));
        let report = report.finish();
        assert_eq!(report.created_count, 2);
        assert_eq!(report.updated_count, 1);
        assert!(report.success);
    }

    #[test]
    fn errors_do_not_abort_the_report_but_clear_success() {
        let mut report = BulkUpsertReport::default();
        report.record_outcome(&outcome(true));
        report.record_error("segment X: not found");
        report.record_outcome(&outcome(false));
        let report = report.finish();
        assert_eq!(report.created_count, 1);
        assert_eq!(report.updated_count, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(!report.success);
    }

    #[test]
    fn second_identical_run_reports_only_updates() {
        // Idempotence from the caller's perspective: replaying the same
        // batch yields created=0 and no errors.
        let mut first = BulkUpsertReport::default();
        for _ in 0..3 {
            first.record_outcome(&outcome(true));
        }
        let mut second = BulkUpsertReport::default();
        for _ in 0..3 {
            second.record_outcome(&outcome(false));
        }
        let second = second.finish();
        assert_eq!(second.created_count, 0);
        assert_eq!(second.updated_count, 3);
        assert!(second.success);
    }
}
