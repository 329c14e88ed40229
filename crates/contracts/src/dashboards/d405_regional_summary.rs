use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a002_segment::aggregate::SegmentId;
use crate::domain::a005_region::aggregate::RegionId;
use crate::shared::metrics::YearComparison;
use crate::shared::period::PeriodType;

/// Per-store line inside a region rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionStoreRow {
    pub segment_id: SegmentId,
    pub segment_code: String,
    pub segment_name: String,
    pub sales: YearComparison,
    pub customers: YearComparison,
    pub unit_price: YearComparison,
}

/// Aggregate over all stores assigned to one region. Stores without an
/// assignment are collected into a pseudo-region with `region_id: None`
/// so every store is accounted for exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRollup {
    pub region_id: Option<RegionId>,
    pub region_name: String,
    pub sales: YearComparison,
    pub customers: YearComparison,
    pub unit_price: YearComparison,
    pub target_sales: Option<Decimal>,
    pub target_achievement_rate: Option<Decimal>,
    pub target_customers: Option<Decimal>,
    pub stores: Vec<RegionStoreRow>,
}

/// Grand total across every rollup, unassigned bucket included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionTotals {
    pub sales: YearComparison,
    pub customers: YearComparison,
    pub unit_price: YearComparison,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionalSummaryResponse {
    pub period: NaiveDate,
    pub period_type: PeriodType,
    pub fiscal_year: Option<i32>,
    pub regions: Vec<RegionRollup>,
    pub totals: RegionTotals,
}
