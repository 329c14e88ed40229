use std::collections::HashMap;

use chrono::NaiveDate;
use contracts::domain::a002_segment::aggregate::SegmentId;
use contracts::domain::a003_kpi_definition::aggregate::KpiId;
use contracts::domain::a004_kpi_value::aggregate::KpiValueRow;
use rust_decimal::Decimal;

use super::fiscal;

/// Folds a batch of fact rows pulled once per window. All functions
/// distinguish "no row in the window" (None) from a recorded zero
/// (Some(0)); months without a row count as zero inside a sum.

/// Sum of rows from the fiscal-year start through `as_of`, matching the
/// target/actual flag. None when the window holds no row at all.
pub fn year_to_date(rows: &[KpiValueRow], as_of: NaiveDate, is_target: bool) -> Option<Decimal> {
    let (fy_start, _) = fiscal::fiscal_year_range(fiscal::fiscal_year(as_of));
    sum_filtered(rows, |r| {
        r.is_target == is_target && r.date >= fy_start && r.date <= as_of
    })
}

/// Month lists for the current, prior and two-years-prior fiscal years,
/// aligned positionally by offset from the fiscal start, never by
/// calendar month. Each list runs from the fiscal start through the
/// position of `as_of`.
pub fn cumulative_windows(fy: i32, as_of: NaiveDate) -> [Vec<NaiveDate>; 3] {
    use chrono::Datelike;
    let len = fiscal::fiscal_month_position(as_of.month()) + 1;
    [fy, fy - 1, fy - 2].map(|year| {
        fiscal::months_in_fiscal_year(year)
            .into_iter()
            .take(len)
            .collect()
    })
}

/// Index map keyed by (segment, kpi), the building block for matrix and
/// rollup assembly.
pub fn sum_by_key(rows: &[KpiValueRow]) -> HashMap<(SegmentId, KpiId), Decimal> {
    let mut map: HashMap<(SegmentId, KpiId), Decimal> = HashMap::new();
    for row in rows {
        *map.entry((row.segment_id, row.kpi_id)).or_insert(Decimal::ZERO) += row.value;
    }
    map
}

/// Sum across all segments for one KPI over the whole batch.
pub fn sum_for_kpi(rows: &[KpiValueRow], kpi_id: KpiId) -> Option<Decimal> {
    sum_filtered(rows, |r| r.kpi_id == kpi_id)
}

/// Sum across all segments for one KPI at one month.
pub fn sum_for_month(rows: &[KpiValueRow], kpi_id: KpiId, month: NaiveDate) -> Option<Decimal> {
    sum_filtered(rows, |r| r.kpi_id == kpi_id && r.date == month)
}

pub fn sum_filtered<F>(rows: &[KpiValueRow], pred: F) -> Option<Decimal>
where
    F: Fn(&KpiValueRow) -> bool,
{
    let mut total = None;
    for row in rows.iter().filter(|r| pred(r)) {
        *total.get_or_insert(Decimal::ZERO) += row.value;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn row(segment: SegmentId, kpi: KpiId, d: NaiveDate, value: Decimal, is_target: bool) -> KpiValueRow {
        KpiValueRow {
            segment_id: segment,
            kpi_id: kpi,
            date: d,
            value,
            is_target,
        }
    }

    #[test]
    fn year_to_date_sums_the_fiscal_window() {
        let seg = SegmentId::new(Uuid::new_v4());
        let kpi = KpiId::new(Uuid::new_v4());
        let rows = vec![
            row(seg, kpi, date(2025, 9), dec!(100), false),
            row(seg, kpi, date(2025, 10), dec!(100), false),
            // November missing: counts as zero, not as absence
            row(seg, kpi, date(2025, 12), dec!(100), false),
            row(seg, kpi, date(2025, 9), dec!(120), true),
            // Outside the fiscal year of the as-of date
            row(seg, kpi, date(2025, 8), dec!(999), false),
        ];
        assert_eq!(year_to_date(&rows, date(2025, 12), false), Some(dec!(300)));
        assert_eq!(year_to_date(&rows, date(2025, 12), true), Some(dec!(120)));
        assert_eq!(year_to_date(&rows, date(2025, 10), false), Some(dec!(200)));
    }

    #[test]
    fn year_to_date_is_none_for_an_empty_window() {
        let seg = SegmentId::new(Uuid::new_v4());
        let kpi = KpiId::new(Uuid::new_v4());
        let rows = vec![row(seg, kpi, date(2024, 9), dec!(100), false)];
        assert_eq!(year_to_date(&rows, date(2025, 12), false), None);
        assert_eq!(year_to_date(&[], date(2025, 12), false), None);
    }

    #[test]
    fn cumulative_windows_align_by_fiscal_position() {
        let [current, prior, two_back] = cumulative_windows(2025, date(2025, 11));
        assert_eq!(current, vec![date(2025, 9), date(2025, 10), date(2025, 11)]);
        assert_eq!(prior, vec![date(2024, 9), date(2024, 10), date(2024, 11)]);
        assert_eq!(two_back, vec![date(2023, 9), date(2023, 10), date(2023, 11)]);
    }

    #[test]
    fn cumulative_windows_cross_the_calendar_year() {
        let [current, prior, _] = cumulative_windows(2025, date(2026, 1));
        assert_eq!(current.len(), 5);
        assert_eq!(current[4], date(2026, 1));
        assert_eq!(prior[4], date(2025, 1));
    }

    #[test]
    fn sum_by_key_groups_by_segment_and_kpi() {
        let seg_a = SegmentId::new(Uuid::new_v4());
        let seg_b = SegmentId::new(Uuid::new_v4());
        let kpi = KpiId::new(Uuid::new_v4());
        let rows = vec![
            row(seg_a, kpi, date(2025, 9), dec!(10), false),
            row(seg_a, kpi, date(2025, 10), dec!(15), false),
            row(seg_b, kpi, date(2025, 9), dec!(7), false),
        ];
        let map = sum_by_key(&rows);
        assert_eq!(map.get(&(seg_a, kpi)), Some(&dec!(25)));
        assert_eq!(map.get(&(seg_b, kpi)), Some(&dec!(7)));
    }

    #[test]
    fn single_period_sums_distinguish_none_from_zero() {
        let seg = SegmentId::new(Uuid::new_v4());
        let kpi = KpiId::new(Uuid::new_v4());
        let other = KpiId::new(Uuid::new_v4());
        let rows = vec![
            row(seg, kpi, date(2025, 9), dec!(0), false),
            row(seg, other, date(2025, 9), dec!(5), false),
        ];
        assert_eq!(sum_for_month(&rows, kpi, date(2025, 9)), Some(dec!(0)));
        assert_eq!(sum_for_month(&rows, kpi, date(2025, 10)), None);
        assert_eq!(sum_for_kpi(&rows, other), Some(dec!(5)));
    }
}
