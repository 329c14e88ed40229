use anyhow::bail;
use chrono::{Datelike, NaiveDate, Utc};
use contracts::shared::period::PeriodType;

/// The fiscal year runs September through August.
pub const FISCAL_START_MONTH: u32 = 9;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

/// Fiscal year a date belongs to: Sep..Dec map to the current calendar
/// year, Jan..Aug to the previous one.
pub fn fiscal_year(date: NaiveDate) -> i32 {
    if date.month() >= FISCAL_START_MONTH {
        date.year()
    } else {
        date.year() - 1
    }
}

/// First and last day of a fiscal year: Sep 1 fy .. Aug 31 fy+1.
pub fn fiscal_year_range(fy: i32) -> (NaiveDate, NaiveDate) {
    (ymd(fy, 9, 1), ymd(fy + 1, 8, 31))
}

/// Fiscal quarter of a calendar month. Fixed table, not arithmetic:
/// Q1 Sep-Nov, Q2 Dec-Feb, Q3 Mar-May, Q4 Jun-Aug.
pub fn quarter_of(month: u32) -> u8 {
    match month {
        9 | 10 | 11 => 1,
        12 | 1 | 2 => 2,
        3 | 4 | 5 => 3,
        _ => 4,
    }
}

/// Calendar months of a fiscal quarter, in fiscal order.
pub fn quarter_months(quarter: u8) -> [u32; 3] {
    match quarter {
        1 => [9, 10, 11],
        2 => [12, 1, 2],
        3 => [3, 4, 5],
        _ => [6, 7, 8],
    }
}

/// Month starts of a fiscal year, September first, 12 entries.
pub fn months_in_fiscal_year(fy: i32) -> Vec<NaiveDate> {
    (0..12)
        .map(|offset| {
            let month = (FISCAL_START_MONTH - 1 + offset) % 12 + 1;
            let year = if month >= FISCAL_START_MONTH { fy } else { fy + 1 };
            ymd(year, month, 1)
        })
        .collect()
}

/// Zero-based position of a calendar month within the fiscal year
/// (September is 0, August is 11).
pub fn fiscal_month_position(month: u32) -> usize {
    ((month + 12 - FISCAL_START_MONTH) % 12) as usize
}

/// Last day of a calendar month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 31,
    };
    ymd(year, month, days)
}

pub fn normalize_to_month_start(date: NaiveDate) -> NaiveDate {
    ymd(date.year(), date.month(), 1)
}

/// Same day one calendar year back; Feb 29 falls back to the month end.
pub fn shift_years_back(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() - years;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .unwrap_or_else(|| last_day_of_month(year, date.month()))
}

pub fn previous_year_month(date: NaiveDate) -> NaiveDate {
    shift_years_back(date, 1)
}

pub fn previous_year_range(range: (NaiveDate, NaiveDate)) -> (NaiveDate, NaiveDate) {
    (shift_years_back(range.0, 1), shift_years_back(range.1, 1))
}

pub fn two_years_ago_range(range: (NaiveDate, NaiveDate)) -> (NaiveDate, NaiveDate) {
    (shift_years_back(range.0, 2), shift_years_back(range.1, 2))
}

/// Resolve a period descriptor into an inclusive date range plus a
/// human label. Monthly uses the calendar year; quarterly and yearly use
/// the fiscal year. Cumulative windows are resolved by the callers as
/// fiscal-start..as-of and never land here.
pub fn period_range(
    period_type: PeriodType,
    year: i32,
    month: Option<u32>,
    quarter: Option<u8>,
) -> anyhow::Result<(NaiveDate, NaiveDate, String)> {
    match period_type {
        PeriodType::Monthly | PeriodType::Cumulative => {
            let month = match month {
                Some(m @ 1..=12) => m,
                _ => bail!("month must be between 1 and 12"),
            };
            let start = ymd(year, month, 1);
            let end = last_day_of_month(year, month);
            Ok((start, end, format!("{:04}-{:02}", year, month)))
        }
        PeriodType::Quarterly => {
            let quarter = match quarter {
                Some(q @ 1..=4) => q,
                _ => bail!("quarter must be between 1 and 4"),
            };
            let months = quarter_months(quarter);
            let first = months[0];
            let last = months[2];
            let start_year = if first >= FISCAL_START_MONTH { year } else { year + 1 };
            let end_year = if last >= FISCAL_START_MONTH { year } else { year + 1 };
            Ok((
                ymd(start_year, first, 1),
                last_day_of_month(end_year, last),
                format!("FY{} Q{}", year, quarter),
            ))
        }
        PeriodType::Yearly => {
            let (start, end) = fiscal_year_range(year);
            Ok((start, end, format!("FY{}", year)))
        }
    }
}

/// Today's calendar year and month, used when a request omits the period.
pub fn current_period_defaults() -> (i32, u32) {
    let today = Utc::now().date_naive();
    (today.year(), today.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fiscal_year_boundaries() {
        assert_eq!(fiscal_year(date(2025, 9, 1)), 2025);
        assert_eq!(fiscal_year(date(2025, 12, 31)), 2025);
        assert_eq!(fiscal_year(date(2026, 1, 1)), 2025);
        assert_eq!(fiscal_year(date(2026, 8, 31)), 2025);
        assert_eq!(fiscal_year(date(2026, 9, 1)), 2026);
    }

    #[test]
    fn fiscal_year_range_endpoints() {
        let (start, end) = fiscal_year_range(2025);
        assert_eq!(start, date(2025, 9, 1));
        assert_eq!(end, date(2026, 8, 31));
    }

    #[test]
    fn quarters_follow_the_fixed_table() {
        assert_eq!(quarter_of(9), 1);
        assert_eq!(quarter_of(11), 1);
        assert_eq!(quarter_of(12), 2);
        assert_eq!(quarter_of(2), 2);
        assert_eq!(quarter_of(3), 3);
        assert_eq!(quarter_of(5), 3);
        assert_eq!(quarter_of(6), 4);
        assert_eq!(quarter_of(8), 4);
        assert_eq!(quarter_months(2), [12, 1, 2]);
    }

    #[test]
    fn fiscal_months_are_twelve_september_first() {
        let months = months_in_fiscal_year(2025);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], date(2025, 9, 1));
        assert_eq!(months[3], date(2025, 12, 1));
        assert_eq!(months[4], date(2026, 1, 1));
        assert_eq!(months[11], date(2026, 8, 1));
    }

    #[test]
    fn fiscal_month_positions() {
        assert_eq!(fiscal_month_position(9), 0);
        assert_eq!(fiscal_month_position(12), 3);
        assert_eq!(fiscal_month_position(1), 4);
        assert_eq!(fiscal_month_position(8), 11);
    }

    #[test]
    fn leap_day_falls_back_to_month_end() {
        assert_eq!(
            shift_years_back(date(2024, 2, 29), 1),
            date(2023, 2, 28)
        );
        assert_eq!(
            previous_year_range((date(2024, 2, 29), date(2024, 3, 31))),
            (date(2023, 2, 28), date(2023, 3, 31))
        );
    }

    #[test]
    fn period_range_labels() {
        let (start, end, label) =
            period_range(PeriodType::Monthly, 2025, Some(11), None).unwrap();
        assert_eq!(start, date(2025, 11, 1));
        assert_eq!(end, date(2025, 11, 30));
        assert_eq!(label, "2025-11");

        let (start, end, label) =
            period_range(PeriodType::Quarterly, 2025, None, Some(2)).unwrap();
        assert_eq!(start, date(2025, 12, 1));
        assert_eq!(end, date(2026, 2, 28));
        assert_eq!(label, "FY2025 Q2");

        let (start, end, label) =
            period_range(PeriodType::Yearly, 2025, None, None).unwrap();
        assert_eq!(start, date(2025, 9, 1));
        assert_eq!(end, date(2026, 8, 31));
        assert_eq!(label, "FY2025");
    }

    #[test]
    fn period_range_rejects_invalid_input() {
        assert!(period_range(PeriodType::Monthly, 2025, Some(13), None).is_err());
        assert!(period_range(PeriodType::Monthly, 2025, None, None).is_err());
        assert!(period_range(PeriodType::Quarterly, 2025, None, Some(5)).is_err());
    }

    #[test]
    fn normalization_and_month_end() {
        assert_eq!(normalize_to_month_start(date(2025, 11, 17)), date(2025, 11, 1));
        assert_eq!(last_day_of_month(2024, 2), date(2024, 2, 29));
        assert_eq!(last_day_of_month(2025, 2), date(2025, 2, 28));
    }
}
