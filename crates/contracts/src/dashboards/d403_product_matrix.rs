use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a002_segment::aggregate::SegmentId;
use crate::domain::a003_kpi_definition::aggregate::KpiId;
use crate::shared::period::PeriodType;

/// One cell of the store x product-group grid (or one entry of the
/// per-indicator totals row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixCell {
    pub kpi_id: KpiId,
    pub name: String,
    pub actual: Option<Decimal>,
    pub previous_year: Option<Decimal>,
    pub yoy_rate: Option<Decimal>,
    /// Populated in cumulative mode only.
    pub two_years_ago: Option<Decimal>,
    pub yoy_rate_two_years: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMatrixRow {
    pub segment_id: SegmentId,
    pub segment_code: String,
    pub segment_name: String,
    /// Cells in catalog display_order, same order as `product_groups`
    /// and `totals` on the response.
    pub cells: Vec<MatrixCell>,
    pub total: Decimal,
    pub total_previous_year: Option<Decimal>,
    pub total_two_years_ago: Option<Decimal>,
}

/// Store x product-group matrix for a single month or a cumulative
/// fiscal window. Totals are sums of the displayed cells, so the grid is
/// always internally consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMatrixResponse {
    pub period: NaiveDate,
    pub fiscal_year: i32,
    pub period_type: PeriodType,
    pub product_groups: Vec<String>,
    pub stores: Vec<StoreMatrixRow>,
    pub totals: Vec<MatrixCell>,
}
