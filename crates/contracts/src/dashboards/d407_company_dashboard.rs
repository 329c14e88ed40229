use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::period::PeriodType;

/// One headline figure with its prior-year and budget comparisons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub value: Option<Decimal>,
    pub previous_year: Option<Decimal>,
    pub yoy_rate: Option<Decimal>,
    pub yoy_diff: Option<Decimal>,
    pub target: Option<Decimal>,
    pub achievement_rate: Option<Decimal>,
}

/// Rate-type indicators compare by point difference against the prior
/// year; a year-over-year rate of a rate is never reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateComparison {
    pub value: Option<Decimal>,
    pub previous_year: Option<Decimal>,
    pub diff: Option<Decimal>,
}

/// Company-wide headline block of the management dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySummary {
    pub period_label: String,
    pub period_type: PeriodType,
    pub fiscal_year: i32,
    pub sales: MetricComparison,
    pub gross_profit: MetricComparison,
    pub gross_profit_rate: RateComparison,
    pub operating_profit: MetricComparison,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentPerformance {
    pub department_slug: String,
    pub department_name: String,
    pub sales: Option<Decimal>,
    pub yoy_rate: Option<Decimal>,
    pub achievement_rate: Option<Decimal>,
}

/// Three-year series for one cash-flow line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSeries {
    pub current: Option<Decimal>,
    pub previous_year: Option<Decimal>,
    pub two_years_ago: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlow {
    pub operating: CashFlowSeries,
    pub investing: CashFlowSeries,
    pub financing: CashFlowSeries,
    pub free: CashFlowSeries,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementIndicators {
    pub labor_cost_rate: RateComparison,
    pub customer_count: MetricComparison,
    pub customer_unit_price: MetricComparison,
    pub items_per_customer: RateComparison,
}

/// One month of the twelve-month trend chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPoint {
    /// "YYYY-MM"
    pub month: String,
    pub sales: Option<Decimal>,
    pub sales_target: Option<Decimal>,
    pub operating_profit: Option<Decimal>,
    pub operating_profit_target: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDashboardResponse {
    pub summary: CompanySummary,
    pub departments: Vec<DepartmentPerformance>,
    pub cash_flow: CashFlow,
    pub indicators: ManagementIndicators,
    pub chart: Vec<ChartPoint>,
}
