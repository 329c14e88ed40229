use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a002_segment::aggregate::SegmentId;
use crate::domain::a003_kpi_definition::aggregate::KpiId;

/// One actual figure from an external feed. The segment and KPI may be
/// referenced either by id or by their business code/name; rows that
/// resolve to nothing are reported per row, not rejected as a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActualRecord {
    pub segment_id: Option<SegmentId>,
    pub segment_code: Option<String>,
    pub kpi_id: Option<KpiId>,
    pub kpi_name: Option<String>,
    pub month: NaiveDate,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportActualsRequest {
    pub department_slug: String,
    pub records: Vec<ActualRecord>,
}
