use contracts::shared::metrics::AlertLevel;
use rust_decimal::{Decimal, RoundingStrategy};

/// Missing operands and zero divisors propagate as None. A metric that
/// cannot be computed is absent, never zero and never an error.

fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Sales over customer count, rounded to the nearest whole unit.
pub fn unit_price(sales: Option<Decimal>, customers: Option<Decimal>) -> Option<Decimal> {
    let sales = sales?;
    let customers = customers?;
    if customers.is_zero() {
        return None;
    }
    Some(round_dp(sales / customers, 0))
}

/// Year-over-year change in percent, two decimals, sign preserved.
pub fn yoy_rate(current: Option<Decimal>, previous: Option<Decimal>) -> Option<Decimal> {
    let current = current?;
    let previous = previous?;
    if previous.is_zero() {
        return None;
    }
    Some(round_dp(
        (current / previous - Decimal::ONE) * Decimal::ONE_HUNDRED,
        2,
    ))
}

/// Actual over target in percent, two decimals.
pub fn achievement_rate(actual: Option<Decimal>, target: Option<Decimal>) -> Option<Decimal> {
    let actual = actual?;
    let target = target?;
    if target.is_zero() {
        return None;
    }
    Some(round_dp(actual / target * Decimal::ONE_HUNDRED, 2))
}

/// Rate-type metrics over a window are recomputed from the summed
/// operands, never averaged from per-month rates.
pub fn ratio_of_sums(
    numerator_sum: Option<Decimal>,
    denominator_sum: Option<Decimal>,
) -> Option<Decimal> {
    let numerator = numerator_sum?;
    let denominator = denominator_sum?;
    if denominator.is_zero() {
        return None;
    }
    Some(round_dp(numerator / denominator * Decimal::ONE_HUNDRED, 2))
}

/// Items sold per customer, one decimal.
pub fn items_per_customer(items: Option<Decimal>, customers: Option<Decimal>) -> Option<Decimal> {
    let items = items?;
    let customers = customers?;
    if customers.is_zero() {
        return None;
    }
    Some(round_dp(items / customers, 1))
}

/// Alert classification of an achievement rate: 100% and above is fine,
/// 80% up to 100% warns, below 80% is critical. A missing rate raises no
/// alert.
pub fn alert_level(rate: Option<Decimal>) -> AlertLevel {
    let Some(rate) = rate else {
        return AlertLevel::None;
    };
    if rate >= Decimal::ONE_HUNDRED {
        AlertLevel::None
    } else if rate >= Decimal::from(80) {
        AlertLevel::Warning
    } else {
        AlertLevel::Critical
    }
}
