use chrono::NaiveDate;
use contracts::dashboards::d406_kpi_trend::{
    KpiTrendResponse, StoreTrendResponse, StoreTrendSummary,
};
use contracts::domain::a004_kpi_value::aggregate::KpiValueRow;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::a004_kpi_value::repository::ValueFilter;
use crate::domain::{a002_segment, a003_kpi_definition, a004_kpi_value};
use crate::shared::error::ApiResult;
use crate::shared::{aggregation, fiscal, metrics};

fn resolve_fiscal_year(year: Option<i32>) -> i32 {
    year.unwrap_or_else(|| {
        let (y, m) = fiscal::current_period_defaults();
        // current_period_defaults returns a calendar year/month pair
        fiscal::fiscal_year(
            NaiveDate::from_ymd_opt(y, m, 1).unwrap_or_default(),
        )
    })
}

fn month_labels(months: &[NaiveDate]) -> Vec<String> {
    months.iter().map(|d| d.format("%Y-%m").to_string()).collect()
}

/// Department-wide monthly series of one KPI over a full fiscal year:
/// actuals, targets and the prior year's actuals on the same axis.
pub async fn kpi_trend(kpi_id: Uuid, year: Option<i32>) -> ApiResult<KpiTrendResponse> {
    let kpi = a003_kpi_definition::service::resolve_by_id(kpi_id).await?;
    let fiscal_year = resolve_fiscal_year(year);
    let months = fiscal::months_in_fiscal_year(fiscal_year);
    let prior_months = fiscal::months_in_fiscal_year(fiscal_year - 1);
    let segments =
        a002_segment::service::list_by_department(kpi.department_id.value()).await?;
    let segment_ids: Vec<Uuid> = segments.iter().map(|s| s.id.value()).collect();

    let current_rows = a004_kpi_value::repository::read_values(&ValueFilter {
        segment_ids: Some(segment_ids.clone()),
        kpi_ids: Some(vec![kpi_id]),
        dates: Some(months.clone()),
        ..Default::default()
    })
    .await?;
    let prior_rows = a004_kpi_value::repository::read_values(&ValueFilter {
        segment_ids: Some(segment_ids),
        kpi_ids: Some(vec![kpi_id]),
        dates: Some(prior_months.clone()),
        is_target: Some(false),
        ..Default::default()
    })
    .await?;

    let monthly = |rows: &[KpiValueRow], months: &[NaiveDate], is_target: Option<bool>| {
        months
            .iter()
            .map(|month| {
                aggregation::sum_filtered(rows, |r| {
                    r.date == *month && is_target.map_or(true, |t| r.is_target == t)
                })
            })
            .collect::<Vec<Option<Decimal>>>()
    };

    Ok(KpiTrendResponse {
        kpi_name: kpi.name,
        fiscal_year,
        labels: month_labels(&months),
        actual: monthly(&current_rows, &months, Some(false)),
        target: monthly(&current_rows, &months, Some(true)),
        previous_year: monthly(&prior_rows, &prior_months, Some(false)),
    })
}

/// One store's KPI over three fiscal years as cumulative month-end
/// series, overlaid by fiscal month position.
pub async fn store_trend(
    segment_id: Uuid,
    kpi_id: Uuid,
    year: Option<i32>,
) -> ApiResult<StoreTrendResponse> {
    let segment = a002_segment::service::resolve_by_id(segment_id).await?;
    let kpi = a003_kpi_definition::service::resolve_by_id(kpi_id).await?;
    let fiscal_year = resolve_fiscal_year(year);

    let mut series: Vec<Vec<Option<Decimal>>> = Vec::with_capacity(3);
    let months = fiscal::months_in_fiscal_year(fiscal_year);
    let mut current_monthly: Vec<Option<Decimal>> = Vec::new();
    for offset in 0..3 {
        let window = fiscal::months_in_fiscal_year(fiscal_year - offset);
        let rows = a004_kpi_value::repository::read_values(&ValueFilter {
            segment_ids: Some(vec![segment_id]),
            kpi_ids: Some(vec![kpi_id]),
            dates: Some(window.clone()),
            is_target: Some(false),
            ..Default::default()
        })
        .await?;
        let monthly: Vec<Option<Decimal>> = window
            .iter()
            .map(|month| aggregation::sum_filtered(&rows, |r| r.date == *month))
            .collect();
        if offset == 0 {
            current_monthly = monthly.clone();
        }
        series.push(running_totals(&monthly));
    }

    let summary = build_summary(&current_monthly, &series[0], &series[1], &series[2]);
    Ok(StoreTrendResponse {
        segment_name: segment.name,
        kpi_name: kpi.name,
        fiscal_year,
        months: month_labels(&months),
        actual: series.remove(0),
        previous_year: series.remove(0),
        two_years_ago: series.remove(0),
        summary,
    })
}

/// Running totals over a monthly series. The series stays None until the
/// first recorded month; from then on a missing month carries the total
/// forward unchanged.
fn running_totals(monthly: &[Option<Decimal>]) -> Vec<Option<Decimal>> {
    let mut running: Option<Decimal> = None;
    monthly
        .iter()
        .map(|value| {
            if let Some(v) = value {
                *running.get_or_insert(Decimal::ZERO) += *v;
            }
            running
        })
        .collect()
}

fn build_summary(
    current_monthly: &[Option<Decimal>],
    actual: &[Option<Decimal>],
    previous: &[Option<Decimal>],
    two_back: &[Option<Decimal>],
) -> StoreTrendSummary {
    // Compare the years at the latest month the current year recorded a
    // fact; with no current-year data fall back to the full prior years.
    let position = current_monthly
        .iter()
        .rposition(|v| v.is_some())
        .unwrap_or(actual.len().saturating_sub(1));
    let at = |series: &[Option<Decimal>]| series.get(position).copied().flatten();
    let ytd_actual = at(actual);
    let ytd_previous_year = at(previous);
    StoreTrendSummary {
        ytd_actual,
        ytd_previous_year,
        ytd_two_years_ago: at(two_back),
        yoy_rate: metrics::yoy_rate(ytd_actual, ytd_previous_year),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn running_totals_stay_none_before_the_first_fact() {
        let monthly = vec![None, Some(dec!(100)), None, Some(dec!(50))];
        let cumulative = running_totals(&monthly);
        assert_eq!(cumulative[0], None);
        assert_eq!(cumulative[1], Some(dec!(100)));
        // gap month carries the total forward
        assert_eq!(cumulative[2], Some(dec!(100)));
        assert_eq!(cumulative[3], Some(dec!(150)));
    }

    #[test]
    fn summary_compares_years_at_the_current_data_edge() {
        let monthly = vec![Some(dec!(100)), Some(dec!(120)), None, None];
        let actual = running_totals(&monthly);
        let previous = running_totals(&[
            Some(dec!(100)),
            Some(dec!(100)),
            Some(dec!(100)),
            Some(dec!(100)),
        ]);
        let two_back: Vec<Option<Decimal>> = vec![None; 4];

        let summary = build_summary(&monthly, &actual, &previous, &two_back);
        // the current year last recorded at index 1, so the prior year is
        // read at the same position, not at its full-year total
        assert_eq!(summary.ytd_actual, Some(dec!(220)));
        assert_eq!(summary.ytd_previous_year, Some(dec!(200)));
        assert_eq!(summary.ytd_two_years_ago, None);
        assert_eq!(summary.yoy_rate, Some(dec!(10.00)));
    }
}
