use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::a002_segment::aggregate::SegmentId;
use crate::domain::a003_kpi_definition::aggregate::KpiId;

/// One target figure keyed by the composite identity (segment, kpi, month).
/// `month` is normalized to the first day of its month on the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetUpsertRequest {
    pub segment_id: SegmentId,
    pub kpi_id: KpiId,
    pub month: NaiveDate,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkTargetRequest {
    pub targets: Vec<TargetUpsertRequest>,
}

/// Entry-screen cell: the stored target (if any) plus the actual recorded
/// for the same month one fiscal year back, shown as a reference figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetMatrixCell {
    pub kpi_id: KpiId,
    pub value_id: Option<Uuid>,
    pub value: Option<Decimal>,
    pub last_year_actual: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetMatrixRow {
    pub segment_id: SegmentId,
    pub segment_code: String,
    pub segment_name: String,
    /// Cells in the same order as `kpis` on the response.
    pub cells: Vec<TargetMatrixCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetMatrixKpi {
    pub id: KpiId,
    pub name: String,
    pub unit: String,
}

/// Pre-filled grid for the target entry screen of one department/month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetMatrixResponse {
    pub fiscal_year: i32,
    pub month: NaiveDate,
    pub kpis: Vec<TargetMatrixKpi>,
    pub rows: Vec<TargetMatrixRow>,
}
