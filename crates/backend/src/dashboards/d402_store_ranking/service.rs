use chrono::NaiveDate;
use contracts::dashboards::d402_store_ranking::{AlertEntry, RankingEntry, RankingResponse};
use contracts::domain::a001_department::aggregate::Department;
use contracts::domain::a002_segment::aggregate::Segment;
use contracts::domain::a003_kpi_definition::aggregate::KpiDefinition;
use contracts::domain::a004_kpi_value::aggregate::KpiValueRow;
use contracts::shared::metrics::AlertLevel;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::a004_kpi_value::repository::ValueFilter;
use crate::domain::{a001_department, a002_segment, a003_kpi_definition, a004_kpi_value};
use crate::shared::error::{ApiError, ApiResult};
use crate::shared::{aggregation, fiscal, metrics};

fn resolve_period(year: Option<i32>, month: Option<u32>) -> ApiResult<NaiveDate> {
    let (default_year, default_month) = fiscal::current_period_defaults();
    let year = year.unwrap_or(default_year);
    let month = month.unwrap_or(default_month);
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid period {}-{}", year, month)))
}

fn fiscal_window(as_of: NaiveDate) -> Vec<NaiveDate> {
    use chrono::Datelike;
    fiscal::months_in_fiscal_year(fiscal::fiscal_year(as_of))
        .into_iter()
        .take(fiscal::fiscal_month_position(as_of.month()) + 1)
        .collect()
}

/// Stores of one KPI's department ranked by fiscal year-to-date actual.
pub async fn ranking(
    kpi_id: Uuid,
    year: Option<i32>,
    month: Option<u32>,
) -> ApiResult<RankingResponse> {
    let kpi = a003_kpi_definition::service::resolve_by_id(kpi_id).await?;
    let as_of = resolve_period(year, month)?;
    let segments =
        a002_segment::service::list_by_department(kpi.department_id.value()).await?;

    let rows = a004_kpi_value::repository::read_values(&ValueFilter {
        segment_ids: Some(segments.iter().map(|s| s.id.value()).collect()),
        kpi_ids: Some(vec![kpi_id]),
        dates: Some(fiscal_window(as_of)),
        ..Default::default()
    })
    .await?;

    Ok(RankingResponse {
        kpi_name: kpi.name,
        period: as_of,
        fiscal_year: fiscal::fiscal_year(as_of),
        entries: build_ranking(&segments, &rows, as_of),
    })
}

/// Stores without a single actual in the window are left out of the
/// ranking rather than listed as zero.
fn build_ranking(segments: &[Segment], rows: &[KpiValueRow], as_of: NaiveDate) -> Vec<RankingEntry> {
    let mut ranked: Vec<(Decimal, Option<Decimal>, &Segment)> = segments
        .iter()
        .filter_map(|segment| {
            let segment_rows: Vec<KpiValueRow> = rows
                .iter()
                .filter(|r| r.segment_id == segment.id)
                .cloned()
                .collect();
            let ytd_actual = aggregation::year_to_date(&segment_rows, as_of, false)?;
            let ytd_target = aggregation::year_to_date(&segment_rows, as_of, true);
            let rate = metrics::achievement_rate(Some(ytd_actual), ytd_target);
            Some((ytd_actual, rate, segment))
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, (value, achievement_rate, segment))| RankingEntry {
            rank: index as u32 + 1,
            segment_id: segment.id,
            segment_code: segment.code.clone(),
            segment_name: segment.name.clone(),
            value,
            achievement_rate,
        })
        .collect()
}

/// Every (store, KPI) pair running under 100% of its cumulative target,
/// worst first. Scans one department or all of them.
pub async fn alerts(
    department_slug: Option<&str>,
    year: Option<i32>,
    month: Option<u32>,
) -> ApiResult<Vec<AlertEntry>> {
    let as_of = resolve_period(year, month)?;
    let departments = match department_slug {
        Some(slug) => vec![a001_department::service::resolve_by_slug(slug).await?],
        None => a001_department::service::list_all().await?,
    };

    let mut entries = Vec::new();
    for department in &departments {
        let kpis =
            a003_kpi_definition::service::list_visible(department.id.value(), None).await?;
        let segments =
            a002_segment::service::list_by_department(department.id.value()).await?;
        if kpis.is_empty() || segments.is_empty() {
            continue;
        }
        let rows = a004_kpi_value::repository::read_values(&ValueFilter {
            segment_ids: Some(segments.iter().map(|s| s.id.value()).collect()),
            kpi_ids: Some(kpis.iter().map(|k| k.id.value()).collect()),
            dates: Some(fiscal_window(as_of)),
            ..Default::default()
        })
        .await?;
        entries.extend(build_alerts(department, &kpis, &segments, &rows, as_of));
    }

    sort_alerts(&mut entries);
    Ok(entries)
}

fn build_alerts(
    department: &Department,
    kpis: &[KpiDefinition],
    segments: &[Segment],
    rows: &[KpiValueRow],
    as_of: NaiveDate,
) -> Vec<AlertEntry> {
    let mut entries = Vec::new();
    for segment in segments {
        for kpi in kpis {
            let pair_rows: Vec<KpiValueRow> = rows
                .iter()
                .filter(|r| r.segment_id == segment.id && r.kpi_id == kpi.id)
                .cloned()
                .collect();
            let ytd_actual = aggregation::year_to_date(&pair_rows, as_of, false);
            let ytd_target = aggregation::year_to_date(&pair_rows, as_of, true);
            let Some(rate) = metrics::achievement_rate(ytd_actual, ytd_target) else {
                continue;
            };
            if rate >= Decimal::ONE_HUNDRED {
                continue;
            }
            entries.push(AlertEntry {
                department_name: department.name.clone(),
                segment_name: segment.name.clone(),
                kpi_name: kpi.name.clone(),
                achievement_rate: rate,
                alert_level: metrics::alert_level(Some(rate)),
                ytd_actual: ytd_actual.unwrap_or_default(),
                ytd_target: ytd_target.unwrap_or_default(),
            });
        }
    }
    entries
}

fn sort_alerts(entries: &mut [AlertEntry]) {
    entries.sort_by(|a, b| {
        let severity = |e: &AlertEntry| match e.alert_level {
            AlertLevel::Critical => 0,
            AlertLevel::Warning => 1,
            AlertLevel::None => 2,
        };
        severity(a)
            .cmp(&severity(b))
            .then(a.achievement_rate.cmp(&b.achievement_rate))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_department::aggregate::DepartmentId;
    use contracts::domain::a002_segment::aggregate::SegmentId;
    use contracts::domain::a003_kpi_definition::aggregate::{KpiCategory, KpiId};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn segment(code: &str, name: &str) -> Segment {
        Segment {
            id: SegmentId::new(Uuid::new_v4()),
            code: code.into(),
            name: name.into(),
            department_id: DepartmentId::new(Uuid::new_v4()),
        }
    }

    fn value_row(segment: &Segment, kpi: KpiId, d: NaiveDate, value: Decimal, is_target: bool) -> KpiValueRow {
        KpiValueRow {
            segment_id: segment.id,
            kpi_id: kpi,
            date: d,
            value,
            is_target,
        }
    }

    #[test]
    fn ranking_sorts_descending_and_skips_empty_stores() {
        let kpi = KpiId::new(Uuid::new_v4());
        let first = segment("S1", "Station front");
        let second = segment("S2", "Mall");
        let empty = segment("S3", "New opening");
        let as_of = date(2025, 10);
        let rows = vec![
            value_row(&first, kpi, date(2025, 9), dec!(50), false),
            value_row(&first, kpi, date(2025, 10), dec!(50), false),
            value_row(&second, kpi, date(2025, 9), dec!(180), false),
            value_row(&second, kpi, date(2025, 9), dec!(200), true),
        ];

        let entries = build_ranking(&[first, second, empty], &rows, as_of);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].segment_code, "S2");
        assert_eq!(entries[0].value, dec!(180));
        assert_eq!(entries[0].achievement_rate, Some(dec!(90.00)));
        assert_eq!(entries[1].rank, 2);
        assert_eq!(entries[1].value, dec!(100));
        assert_eq!(entries[1].achievement_rate, None);
    }

    #[test]
    fn alerts_list_only_underachievers_worst_first() {
        let department = Department {
            id: DepartmentId::new(Uuid::new_v4()),
            name: "Retail".into(),
            slug: "retail".into(),
        };
        let kpi = KpiDefinition {
            id: KpiId::new(Uuid::new_v4()),
            department_id: department.id,
            category: KpiCategory::Overall,
            name: "sales".into(),
            unit: "yen".into(),
            is_calculated: false,
            formula: None,
            display_order: 1,
            is_visible: true,
        };
        let healthy = segment("S1", "Healthy");
        let warning = segment("S2", "Lagging");
        let critical = segment("S3", "Sinking");
        let as_of = date(2025, 9);
        let rows = vec![
            value_row(&healthy, kpi.id, as_of, dec!(120), false),
            value_row(&healthy, kpi.id, as_of, dec!(100), true),
            value_row(&warning, kpi.id, as_of, dec!(90), false),
            value_row(&warning, kpi.id, as_of, dec!(100), true),
            value_row(&critical, kpi.id, as_of, dec!(50), false),
            value_row(&critical, kpi.id, as_of, dec!(100), true),
        ];

        let mut entries = build_alerts(
            &department,
            &[kpi],
            &[healthy, warning, critical],
            &rows,
            as_of,
        );
        sort_alerts(&mut entries);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].segment_name, "Sinking");
        assert_eq!(entries[0].alert_level, AlertLevel::Critical);
        assert_eq!(entries[1].segment_name, "Lagging");
        assert_eq!(entries[1].alert_level, AlertLevel::Warning);
    }
}
