use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Severity classification derived from an achievement rate.
///
/// `None` also covers "rate not computable"; a missing target is not an
/// alert condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    None,
    Warning,
    Critical,
}

/// Current / prior / two-years-prior trio for one metric, with the
/// percentage changes against both comparison years.
///
/// `None` always means "not computable" (no data, or zero divisor);
/// a genuine zero is carried as `Some(0)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearComparison {
    pub current: Option<Decimal>,
    pub previous_year: Option<Decimal>,
    pub yoy_rate: Option<Decimal>,
    pub two_years_ago: Option<Decimal>,
    pub yoy_rate_two_years: Option<Decimal>,
}
