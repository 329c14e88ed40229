use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a001_department::aggregate::Department;
use crate::domain::a003_kpi_definition::aggregate::{KpiCategory, KpiId};
use crate::shared::metrics::AlertLevel;

/// One KPI line of the department summary: single-month figures, fiscal
/// year-to-date figures and the derived comparison metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiSummaryRow {
    pub kpi_id: KpiId,
    pub name: String,
    pub unit: String,
    pub category: KpiCategory,
    pub actual: Option<Decimal>,
    pub target: Option<Decimal>,
    pub ytd_actual: Option<Decimal>,
    pub ytd_target: Option<Decimal>,
    /// Achievement rate of the cumulative window (YTD actual / YTD target).
    pub achievement_rate: Option<Decimal>,
    /// Change of the single month vs the same month one fiscal year back.
    pub yoy_rate: Option<Decimal>,
    pub alert_level: AlertLevel,
}

/// Department KPI summary, rows ordered by the catalog's display_order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentSummaryResponse {
    pub department: Department,
    /// Month start the summary was computed for.
    pub period: NaiveDate,
    pub fiscal_year: i32,
    pub kpis: Vec<KpiSummaryRow>,
}
