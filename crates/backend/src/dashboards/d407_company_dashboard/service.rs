use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use contracts::dashboards::d407_company_dashboard::{
    CashFlow, CashFlowSeries, ChartPoint, CompanyDashboardResponse, CompanySummary,
    DepartmentPerformance, ManagementIndicators, MetricComparison, RateComparison,
};
use contracts::domain::a001_department::aggregate::Department;
use contracts::domain::a004_kpi_value::aggregate::KpiValueRow;
use contracts::shared::period::PeriodType;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::a004_kpi_value::repository::ValueFilter;
use crate::domain::{a001_department, a003_kpi_definition, a004_kpi_value};
use crate::shared::error::{ApiError, ApiResult};
use crate::shared::{fiscal, metrics};

/// Catalog names of the company-wide series. A department contributes to
/// a series only if its catalog defines a KPI under that name.
const SALES_KPI: &str = "sales";
const CUSTOMERS_KPI: &str = "customers";
const GROSS_PROFIT_KPI: &str = "gross_profit";
const OPERATING_PROFIT_KPI: &str = "operating_profit";
const LABOR_COST_KPI: &str = "labor_cost";
const ITEMS_KPI: &str = "items_sold";
const CF_OPERATING_KPI: &str = "operating_cash_flow";
const CF_INVESTING_KPI: &str = "investing_cash_flow";
const CF_FINANCING_KPI: &str = "financing_cash_flow";
const CF_FREE_KPI: &str = "free_cash_flow";

const SERIES: &[&str] = &[
    SALES_KPI,
    CUSTOMERS_KPI,
    GROSS_PROFIT_KPI,
    OPERATING_PROFIT_KPI,
    LABOR_COST_KPI,
    ITEMS_KPI,
    CF_OPERATING_KPI,
    CF_INVESTING_KPI,
    CF_FINANCING_KPI,
    CF_FREE_KPI,
];

const CHART_MONTHS: usize = 12;

/// Company-wide sums per series name; a missing key means no fact row
/// landed in the window for that series.
type SeriesSums = HashMap<&'static str, Decimal>;

pub(crate) struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
    pub fiscal_year: i32,
}

/// Resolve the dashboard period descriptor. Monthly takes a calendar
/// year and month; quarterly and yearly are anchored to the fiscal year.
pub(crate) fn resolve_period(
    period_type: PeriodType,
    year: Option<i32>,
    month: Option<u32>,
    quarter: Option<u8>,
) -> ApiResult<PeriodWindow> {
    if period_type == PeriodType::Cumulative {
        return Err(ApiError::BadRequest(
            "period_type must be monthly, quarterly or yearly".into(),
        ));
    }
    let (default_year, default_month) = fiscal::current_period_defaults();
    let today = NaiveDate::from_ymd_opt(default_year, default_month, 1).unwrap_or_default();
    let year = year.unwrap_or(match period_type {
        PeriodType::Monthly => default_year,
        _ => fiscal::fiscal_year(today),
    });
    let month = month.unwrap_or(default_month);
    let quarter = quarter.unwrap_or_else(|| fiscal::quarter_of(default_month));
    let (start, end, label) = fiscal::period_range(period_type, year, Some(month), Some(quarter))
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(PeriodWindow {
        start,
        end,
        label,
        fiscal_year: fiscal::fiscal_year(start),
    })
}

/// Month starts of the `n` months ending at the month of `anchor`,
/// oldest first.
pub(crate) fn last_n_months(anchor: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut months = Vec::with_capacity(n);
    let mut current = fiscal::normalize_to_month_start(anchor);
    for _ in 0..n {
        months.push(current);
        let (y, m) = if current.month() == 1 {
            (current.year() - 1, 12)
        } else {
            (current.year(), current.month() - 1)
        };
        current = NaiveDate::from_ymd_opt(y, m, 1).unwrap_or_default();
    }
    months.reverse();
    months
}

/// Management dashboard: company summary, per-department performance,
/// cash flow, management indicators and the twelve-month trend chart.
pub async fn company_dashboard(
    period_type: PeriodType,
    year: Option<i32>,
    month: Option<u32>,
    quarter: Option<u8>,
) -> ApiResult<CompanyDashboardResponse> {
    let window = resolve_period(period_type, year, month, quarter)?;
    let departments = a001_department::service::list_all().await?;

    // Resolve each series name against every department's catalog.
    let mut kpi_series: HashMap<Uuid, &'static str> = HashMap::new();
    let mut sales_kpi_by_department: HashMap<Uuid, Uuid> = HashMap::new();
    for department in &departments {
        for name in SERIES {
            if let Some(kpi) =
                a003_kpi_definition::repository::get_by_name(department.id.value(), name).await?
            {
                kpi_series.insert(kpi.id.value(), *name);
                if *name == SALES_KPI {
                    sales_kpi_by_department.insert(department.id.value(), kpi.id.value());
                }
            }
        }
    }
    let kpi_ids: Vec<Uuid> = kpi_series.keys().copied().collect();

    // Current window carries both series; prior years need actuals only.
    let current_rows = a004_kpi_value::repository::read_values(&ValueFilter {
        kpi_ids: Some(kpi_ids.clone()),
        date_from: Some(window.start),
        date_to: Some(window.end),
        ..Default::default()
    })
    .await?;
    let (actual_rows, target_rows): (Vec<_>, Vec<_>) =
        current_rows.into_iter().partition(|r| !r.is_target);

    let (prev_start, prev_end) = fiscal::previous_year_range((window.start, window.end));
    let previous_rows = a004_kpi_value::repository::read_values(&ValueFilter {
        kpi_ids: Some(kpi_ids.clone()),
        date_from: Some(prev_start),
        date_to: Some(prev_end),
        is_target: Some(false),
        ..Default::default()
    })
    .await?;

    let (prev2_start, prev2_end) = fiscal::two_years_ago_range((window.start, window.end));
    let two_back_rows = a004_kpi_value::repository::read_values(&ValueFilter {
        kpi_ids: Some(kpi_ids.clone()),
        date_from: Some(prev2_start),
        date_to: Some(prev2_end),
        is_target: Some(false),
        ..Default::default()
    })
    .await?;

    let chart_months = last_n_months(window.end, CHART_MONTHS);
    let chart_rows = a004_kpi_value::repository::read_values(&ValueFilter {
        kpi_ids: Some(kpi_ids.clone()),
        dates: Some(chart_months.clone()),
        ..Default::default()
    })
    .await?;

    let current = series_sums(&actual_rows, &kpi_series);
    let targets = series_sums(&target_rows, &kpi_series);
    let previous = series_sums(&previous_rows, &kpi_series);
    let two_back = series_sums(&two_back_rows, &kpi_series);

    let summary = build_summary(&window, period_type, &current, &previous, &targets);
    let dept_rows = build_departments(
        &departments,
        &sales_kpi_by_department,
        &sums_by_kpi(&actual_rows),
        &sums_by_kpi(&previous_rows),
        &sums_by_kpi(&target_rows),
    );
    let cash_flow = build_cash_flow(&current, &previous, &two_back);
    let indicators = build_indicators(&current, &previous);
    let chart = build_chart(&chart_months, &chart_rows, &kpi_series);

    Ok(CompanyDashboardResponse {
        summary,
        departments: dept_rows,
        cash_flow,
        indicators,
        chart,
    })
}

fn series_sums(rows: &[KpiValueRow], kpi_series: &HashMap<Uuid, &'static str>) -> SeriesSums {
    let mut sums = SeriesSums::new();
    for row in rows {
        if let Some(name) = kpi_series.get(&row.kpi_id.value()) {
            *sums.entry(*name).or_insert(Decimal::ZERO) += row.value;
        }
    }
    sums
}

fn sums_by_kpi(rows: &[KpiValueRow]) -> HashMap<Uuid, Decimal> {
    let mut sums = HashMap::new();
    for row in rows {
        *sums.entry(row.kpi_id.value()).or_insert(Decimal::ZERO) += row.value;
    }
    sums
}

fn val(sums: &SeriesSums, name: &str) -> Option<Decimal> {
    sums.get(name).copied()
}

fn metric(
    current: Option<Decimal>,
    previous: Option<Decimal>,
    target: Option<Decimal>,
) -> MetricComparison {
    MetricComparison {
        value: current,
        previous_year: previous,
        yoy_rate: metrics::yoy_rate(current, previous),
        yoy_diff: current.zip(previous).map(|(c, p)| c - p),
        target,
        achievement_rate: metrics::achievement_rate(current, target),
    }
}

fn rate(current: Option<Decimal>, previous: Option<Decimal>) -> RateComparison {
    RateComparison {
        value: current,
        previous_year: previous,
        diff: current.zip(previous).map(|(c, p)| c - p),
    }
}

pub(crate) fn build_summary(
    window: &PeriodWindow,
    period_type: PeriodType,
    current: &SeriesSums,
    previous: &SeriesSums,
    targets: &SeriesSums,
) -> CompanySummary {
    // The margin rate over the window comes from the summed operands,
    // never from an average of monthly rates.
    let gross_profit_rate = rate(
        metrics::ratio_of_sums(val(current, GROSS_PROFIT_KPI), val(current, SALES_KPI)),
        metrics::ratio_of_sums(val(previous, GROSS_PROFIT_KPI), val(previous, SALES_KPI)),
    );
    CompanySummary {
        period_label: window.label.clone(),
        period_type,
        fiscal_year: window.fiscal_year,
        sales: metric(
            val(current, SALES_KPI),
            val(previous, SALES_KPI),
            val(targets, SALES_KPI),
        ),
        gross_profit: metric(
            val(current, GROSS_PROFIT_KPI),
            val(previous, GROSS_PROFIT_KPI),
            val(targets, GROSS_PROFIT_KPI),
        ),
        gross_profit_rate,
        operating_profit: metric(
            val(current, OPERATING_PROFIT_KPI),
            val(previous, OPERATING_PROFIT_KPI),
            val(targets, OPERATING_PROFIT_KPI),
        ),
    }
}

pub(crate) fn build_departments(
    departments: &[Department],
    sales_kpi_by_department: &HashMap<Uuid, Uuid>,
    current: &HashMap<Uuid, Decimal>,
    previous: &HashMap<Uuid, Decimal>,
    targets: &HashMap<Uuid, Decimal>,
) -> Vec<DepartmentPerformance> {
    departments
        .iter()
        .map(|department| {
            let sales_kpi = sales_kpi_by_department.get(&department.id.value());
            let lookup = |sums: &HashMap<Uuid, Decimal>| {
                sales_kpi.and_then(|kpi| sums.get(kpi).copied())
            };
            let sales = lookup(current);
            DepartmentPerformance {
                department_slug: department.slug.clone(),
                department_name: department.name.clone(),
                sales,
                yoy_rate: metrics::yoy_rate(sales, lookup(previous)),
                achievement_rate: metrics::achievement_rate(sales, lookup(targets)),
            }
        })
        .collect()
}

fn build_cash_flow(current: &SeriesSums, previous: &SeriesSums, two_back: &SeriesSums) -> CashFlow {
    let series = |name: &str| CashFlowSeries {
        current: val(current, name),
        previous_year: val(previous, name),
        two_years_ago: val(two_back, name),
    };
    CashFlow {
        operating: series(CF_OPERATING_KPI),
        investing: series(CF_INVESTING_KPI),
        financing: series(CF_FINANCING_KPI),
        free: series(CF_FREE_KPI),
    }
}

pub(crate) fn build_indicators(current: &SeriesSums, previous: &SeriesSums) -> ManagementIndicators {
    ManagementIndicators {
        labor_cost_rate: rate(
            metrics::ratio_of_sums(val(current, LABOR_COST_KPI), val(current, SALES_KPI)),
            metrics::ratio_of_sums(val(previous, LABOR_COST_KPI), val(previous, SALES_KPI)),
        ),
        customer_count: metric(
            val(current, CUSTOMERS_KPI),
            val(previous, CUSTOMERS_KPI),
            None,
        ),
        customer_unit_price: metric(
            metrics::unit_price(val(current, SALES_KPI), val(current, CUSTOMERS_KPI)),
            metrics::unit_price(val(previous, SALES_KPI), val(previous, CUSTOMERS_KPI)),
            None,
        ),
        items_per_customer: rate(
            metrics::items_per_customer(val(current, ITEMS_KPI), val(current, CUSTOMERS_KPI)),
            metrics::items_per_customer(val(previous, ITEMS_KPI), val(previous, CUSTOMERS_KPI)),
        ),
    }
}

pub(crate) fn build_chart(
    months: &[NaiveDate],
    rows: &[KpiValueRow],
    kpi_series: &HashMap<Uuid, &'static str>,
) -> Vec<ChartPoint> {
    // Per (series, month, flag) sums; absence stays None on the chart.
    let mut sums: HashMap<(&'static str, NaiveDate, bool), Decimal> = HashMap::new();
    for row in rows {
        if let Some(name) = kpi_series.get(&row.kpi_id.value()) {
            *sums
                .entry((*name, row.date, row.is_target))
                .or_insert(Decimal::ZERO) += row.value;
        }
    }
    months
        .iter()
        .map(|month| {
            let get = |name: &'static str, is_target: bool| {
                sums.get(&(name, *month, is_target)).copied()
            };
            ChartPoint {
                month: month.format("%Y-%m").to_string(),
                sales: get(SALES_KPI, false),
                sales_target: get(SALES_KPI, true),
                operating_profit: get(OPERATING_PROFIT_KPI, false),
                operating_profit_target: get(OPERATING_PROFIT_KPI, true),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_department::aggregate::DepartmentId;
    use contracts::domain::a002_segment::aggregate::SegmentId;
    use contracts::domain::a003_kpi_definition::aggregate::KpiId;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn quarterly_and_yearly_periods_resolve_through_the_fiscal_table() {
        let window = resolve_period(PeriodType::Quarterly, Some(2025), None, Some(2)).unwrap();
        assert_eq!(window.start, date(2025, 12));
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert_eq!(window.label, "FY2025 Q2");
        assert_eq!(window.fiscal_year, 2025);

        let window = resolve_period(PeriodType::Yearly, Some(2025), None, None).unwrap();
        assert_eq!(window.start, date(2025, 9));
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2026, 8, 31).unwrap());
        assert_eq!(window.label, "FY2025");

        assert!(resolve_period(PeriodType::Cumulative, Some(2025), Some(11), None).is_err());
        assert!(resolve_period(PeriodType::Quarterly, Some(2025), None, Some(5)).is_err());
    }

    #[test]
    fn rate_indicators_recompute_from_summed_operands() {
        let mut current = SeriesSums::new();
        current.insert(SALES_KPI, dec!(200));
        current.insert(GROSS_PROFIT_KPI, dec!(50));
        let mut previous = SeriesSums::new();
        previous.insert(SALES_KPI, dec!(100));
        previous.insert(GROSS_PROFIT_KPI, dec!(40));
        let window = PeriodWindow {
            start: date(2025, 9),
            end: NaiveDate::from_ymd_opt(2025, 11, 30).unwrap(),
            label: "FY2025 Q1".into(),
            fiscal_year: 2025,
        };

        let summary = build_summary(
            &window,
            PeriodType::Quarterly,
            &current,
            &previous,
            &SeriesSums::new(),
        );
        // 50/200 and 40/100, not an average of per-month margins
        assert_eq!(summary.gross_profit_rate.value, Some(dec!(25.00)));
        assert_eq!(summary.gross_profit_rate.previous_year, Some(dec!(40.00)));
        assert_eq!(summary.gross_profit_rate.diff, Some(dec!(-15.00)));
        assert_eq!(summary.sales.yoy_rate, Some(dec!(100.00)));
        assert_eq!(summary.sales.yoy_diff, Some(dec!(100)));
        // No targets in the window: achievement stays absent
        assert_eq!(summary.sales.achievement_rate, None);
    }

    #[test]
    fn indicators_propagate_missing_operands() {
        let mut current = SeriesSums::new();
        current.insert(SALES_KPI, dec!(3000));
        current.insert(CUSTOMERS_KPI, dec!(10));
        current.insert(ITEMS_KPI, dec!(25));

        let indicators = build_indicators(&current, &SeriesSums::new());
        assert_eq!(indicators.customer_unit_price.value, Some(dec!(300)));
        assert_eq!(indicators.customer_unit_price.previous_year, None);
        assert_eq!(indicators.items_per_customer.value, Some(dec!(2.5)));
        assert_eq!(indicators.items_per_customer.diff, None);
        // No labor cost facts at all
        assert_eq!(indicators.labor_cost_rate.value, None);
    }

    #[test]
    fn chart_covers_the_last_twelve_months() {
        let months = last_n_months(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(), 12);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], date(2025, 2));
        assert_eq!(months[11], date(2026, 1));

        let sales = KpiId::new(Uuid::new_v4());
        let mut kpi_series = HashMap::new();
        kpi_series.insert(sales.value(), SALES_KPI);
        let segment = SegmentId::new(Uuid::new_v4());
        let rows = vec![
            KpiValueRow {
                segment_id: segment,
                kpi_id: sales,
                date: date(2026, 1),
                value: dec!(100),
                is_target: false,
            },
            KpiValueRow {
                segment_id: segment,
                kpi_id: sales,
                date: date(2026, 1),
                value: dec!(120),
                is_target: true,
            },
        ];
        let chart = build_chart(&months, &rows, &kpi_series);
        assert_eq!(chart.len(), 12);
        assert_eq!(chart[11].month, "2026-01");
        assert_eq!(chart[11].sales, Some(dec!(100)));
        assert_eq!(chart[11].sales_target, Some(dec!(120)));
        assert_eq!(chart[0].sales, None);
    }

    #[test]
    fn departments_without_a_sales_kpi_report_blank() {
        let with_kpi = Department {
            id: DepartmentId::new(Uuid::new_v4()),
            name: "Stores".into(),
            slug: "store".into(),
        };
        let without_kpi = Department {
            id: DepartmentId::new(Uuid::new_v4()),
            name: "Finance".into(),
            slug: "finance".into(),
        };
        let sales_kpi = Uuid::new_v4();
        let mut mapping = HashMap::new();
        mapping.insert(with_kpi.id.value(), sales_kpi);
        let mut current = HashMap::new();
        current.insert(sales_kpi, dec!(500));
        let mut targets = HashMap::new();
        targets.insert(sales_kpi, dec!(400));

        let rows = build_departments(
            &[with_kpi, without_kpi],
            &mapping,
            &current,
            &HashMap::new(),
            &targets,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sales, Some(dec!(500)));
        assert_eq!(rows[0].achievement_rate, Some(dec!(125.00)));
        assert_eq!(rows[1].sales, None);
        assert_eq!(rows[1].achievement_rate, None);
    }
}
