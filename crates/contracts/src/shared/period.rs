use serde::{Deserialize, Serialize};

/// Period descriptor supplied by the reporting API layer.
///
/// All non-monthly periods are anchored to the fiscal calendar
/// (September 1 .. August 31), never to the calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Monthly,
    Quarterly,
    Yearly,
    /// Fiscal-year start through a given month, inclusive.
    Cumulative,
}

impl Default for PeriodType {
    fn default() -> Self {
        PeriodType::Monthly
    }
}

/// Raw period query parameters as they arrive on a report request.
/// Validation (month 1..=12, quarter 1..=4) happens at the handler layer.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodQuery {
    #[serde(default)]
    pub period_type: PeriodType,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub quarter: Option<u8>,
}
