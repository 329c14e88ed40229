use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Month-by-month series of one KPI across a full fiscal year.
/// All three series are positionally aligned with `labels`; a month with
/// no recorded fact is carried as None, never as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiTrendResponse {
    pub kpi_name: String,
    pub fiscal_year: i32,
    /// Twelve "YYYY-MM" labels, September first.
    pub labels: Vec<String>,
    pub actual: Vec<Option<Decimal>>,
    pub target: Vec<Option<Decimal>>,
    pub previous_year: Vec<Option<Decimal>>,
}

/// Cumulative month-end view of one store's KPI across three fiscal
/// years, each series re-keyed to the fiscal month position so the years
/// overlay on a single axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreTrendResponse {
    pub segment_name: String,
    pub kpi_name: String,
    pub fiscal_year: i32,
    pub months: Vec<String>,
    pub actual: Vec<Option<Decimal>>,
    pub previous_year: Vec<Option<Decimal>>,
    pub two_years_ago: Vec<Option<Decimal>>,
    pub summary: StoreTrendSummary,
}

/// Running totals up to the as-of month for the overlay header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreTrendSummary {
    pub ytd_actual: Option<Decimal>,
    pub ytd_previous_year: Option<Decimal>,
    pub ytd_two_years_ago: Option<Decimal>,
    pub yoy_rate: Option<Decimal>,
}
