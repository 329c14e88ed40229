use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a002_segment::aggregate::SegmentId;
use crate::shared::metrics::AlertLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub segment_id: SegmentId,
    pub segment_code: String,
    pub segment_name: String,
    /// Fiscal year-to-date actual for the ranked KPI.
    pub value: Decimal,
    pub achievement_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingResponse {
    pub kpi_name: String,
    pub period: NaiveDate,
    pub fiscal_year: i32,
    pub entries: Vec<RankingEntry>,
}

/// One underachievement alert: a (segment, KPI) pair whose cumulative
/// achievement rate fell below 100%.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEntry {
    pub department_name: String,
    pub segment_name: String,
    pub kpi_name: String,
    pub achievement_rate: Decimal,
    pub alert_level: AlertLevel,
    pub ytd_actual: Decimal,
    pub ytd_target: Decimal,
}
