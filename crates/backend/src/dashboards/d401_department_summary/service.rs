use chrono::NaiveDate;
use contracts::dashboards::d401_department_summary::{DepartmentSummaryResponse, KpiSummaryRow};
use contracts::domain::a003_kpi_definition::aggregate::KpiDefinition;
use contracts::domain::a004_kpi_value::aggregate::KpiValueRow;
use uuid::Uuid;

use crate::domain::a004_kpi_value::repository::ValueFilter;
use crate::domain::{a001_department, a002_segment, a003_kpi_definition, a004_kpi_value};
use crate::shared::error::{ApiError, ApiResult};
use crate::shared::{aggregation, fiscal, metrics};

/// Department KPI summary for one month: monthly and year-to-date
/// figures per KPI, achievement on the cumulative window, YoY against
/// the same month one fiscal year back.
pub async fn department_summary(
    slug: &str,
    year: Option<i32>,
    month: Option<u32>,
) -> ApiResult<DepartmentSummaryResponse> {
    let department = a001_department::service::resolve_by_slug(slug).await?;
    let (default_year, default_month) = fiscal::current_period_defaults();
    let year = year.unwrap_or(default_year);
    let month = month.unwrap_or(default_month);
    let as_of = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid period {}-{}", year, month)))?;
    let fiscal_year = fiscal::fiscal_year(as_of);

    let kpis = a003_kpi_definition::service::list_visible(department.id.value(), None).await?;
    let segments = a002_segment::service::list_by_department(department.id.value()).await?;
    let segment_ids: Vec<Uuid> = segments.iter().map(|s| s.id.value()).collect();
    let kpi_ids: Vec<Uuid> = kpis.iter().map(|k| k.id.value()).collect();

    let window: Vec<NaiveDate> = fiscal::months_in_fiscal_year(fiscal_year)
        .into_iter()
        .take(fiscal::fiscal_month_position(month) + 1)
        .collect();

    // One read covers both series of the whole fiscal window
    let window_rows = a004_kpi_value::repository::read_values(&ValueFilter {
        segment_ids: Some(segment_ids.clone()),
        kpi_ids: Some(kpi_ids.clone()),
        dates: Some(window),
        ..Default::default()
    })
    .await?;
    let prior_rows = a004_kpi_value::repository::read_values(&ValueFilter {
        segment_ids: Some(segment_ids),
        kpi_ids: Some(kpi_ids),
        dates: Some(vec![fiscal::previous_year_month(as_of)]),
        is_target: Some(false),
        ..Default::default()
    })
    .await?;

    Ok(DepartmentSummaryResponse {
        department,
        period: as_of,
        fiscal_year,
        kpis: build_summary_rows(&kpis, &window_rows, &prior_rows, as_of),
    })
}

fn build_summary_rows(
    kpis: &[KpiDefinition],
    window_rows: &[KpiValueRow],
    prior_rows: &[KpiValueRow],
    as_of: NaiveDate,
) -> Vec<KpiSummaryRow> {
    kpis.iter()
        .map(|kpi| {
            let kpi_rows: Vec<KpiValueRow> = window_rows
                .iter()
                .filter(|r| r.kpi_id == kpi.id)
                .cloned()
                .collect();
            let actual =
                aggregation::sum_filtered(&kpi_rows, |r| !r.is_target && r.date == as_of);
            let target =
                aggregation::sum_filtered(&kpi_rows, |r| r.is_target && r.date == as_of);
            let ytd_actual = aggregation::year_to_date(&kpi_rows, as_of, false);
            let ytd_target = aggregation::year_to_date(&kpi_rows, as_of, true);
            let achievement_rate = metrics::achievement_rate(ytd_actual, ytd_target);
            let prior = aggregation::sum_filtered(prior_rows, |r| r.kpi_id == kpi.id);
            KpiSummaryRow {
                kpi_id: kpi.id,
                name: kpi.name.clone(),
                unit: kpi.unit.clone(),
                category: kpi.category.clone(),
                actual,
                target,
                ytd_actual,
                ytd_target,
                achievement_rate,
                yoy_rate: metrics::yoy_rate(actual, prior),
                alert_level: metrics::alert_level(achievement_rate),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_department::aggregate::DepartmentId;
    use contracts::domain::a002_segment::aggregate::SegmentId;
    use contracts::domain::a003_kpi_definition::aggregate::{KpiCategory, KpiId};
    use contracts::shared::metrics::AlertLevel;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn kpi(name: &str) -> KpiDefinition {
        KpiDefinition {
            id: KpiId::new(Uuid::new_v4()),
            department_id: DepartmentId::new(Uuid::new_v4()),
            category: KpiCategory::Overall,
            name: name.into(),
            unit: "yen".into(),
            is_calculated: false,
            formula: None,
            display_order: 1,
            is_visible: true,
        }
    }

    fn row(kpi: &KpiDefinition, d: NaiveDate, value: Decimal, is_target: bool) -> KpiValueRow {
        KpiValueRow {
            segment_id: SegmentId::new(Uuid::nil()),
            kpi_id: kpi.id,
            date: d,
            value,
            is_target,
        }
    }

    #[test]
    fn cumulative_underachievement_raises_a_warning() {
        // Three months at 100 actual vs 120 target: YTD 300 / 360,
        // achievement 83.33, warning level.
        let sales = kpi("sales");
        let window_rows = vec![
            row(&sales, date(2025, 9), dec!(100), false),
            row(&sales, date(2025, 10), dec!(100), false),
            row(&sales, date(2025, 11), dec!(100), false),
            row(&sales, date(2025, 9), dec!(120), true),
            row(&sales, date(2025, 10), dec!(120), true),
            row(&sales, date(2025, 11), dec!(120), true),
        ];
        let prior_rows = vec![row(&sales, date(2024, 11), dec!(80), false)];

        let rows = build_summary_rows(&[sales], &window_rows, &prior_rows, date(2025, 11));
        assert_eq!(rows.len(), 1);
        let summary = &rows[0];
        assert_eq!(summary.actual, Some(dec!(100)));
        assert_eq!(summary.target, Some(dec!(120)));
        assert_eq!(summary.ytd_actual, Some(dec!(300)));
        assert_eq!(summary.ytd_target, Some(dec!(360)));
        assert_eq!(summary.achievement_rate, Some(dec!(83.33)));
        assert_eq!(summary.yoy_rate, Some(dec!(25.00)));
        assert_eq!(summary.alert_level, AlertLevel::Warning);
    }

    #[test]
    fn kpi_without_any_facts_stays_blank() {
        let sales = kpi("sales");
        let rows = build_summary_rows(&[sales], &[], &[], date(2025, 11));
        let summary = &rows[0];
        assert_eq!(summary.actual, None);
        assert_eq!(summary.ytd_actual, None);
        assert_eq!(summary.achievement_rate, None);
        assert_eq!(summary.alert_level, AlertLevel::None);
    }
}
