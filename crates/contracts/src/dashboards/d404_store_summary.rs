use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::a002_segment::aggregate::SegmentId;
use crate::shared::metrics::YearComparison;
use crate::shared::period::PeriodType;

/// Per-store sales, customer count and derived unit price, each with the
/// positionally aligned prior-year figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSummaryRow {
    pub segment_id: SegmentId,
    pub segment_code: String,
    pub segment_name: String,
    pub sales: YearComparison,
    pub customers: YearComparison,
    pub unit_price: YearComparison,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSummaryResponse {
    pub period: NaiveDate,
    pub period_type: PeriodType,
    /// Set in cumulative mode; None for a plain single month.
    pub fiscal_year: Option<i32>,
    pub department_slug: String,
    pub stores: Vec<StoreSummaryRow>,
    /// Department-wide totals; unit price here is total sales over total
    /// customers, not an average of the per-store unit prices.
    pub totals: StoreSummaryTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSummaryTotals {
    pub sales: YearComparison,
    pub customers: YearComparison,
    pub unit_price: YearComparison,
}
