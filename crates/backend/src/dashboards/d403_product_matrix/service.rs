use std::collections::HashMap;

use chrono::NaiveDate;
use contracts::dashboards::d403_product_matrix::{MatrixCell, ProductMatrixResponse, StoreMatrixRow};
use contracts::domain::a002_segment::aggregate::{Segment, SegmentId};
use contracts::domain::a003_kpi_definition::aggregate::{KpiCategory, KpiDefinition, KpiId};
use contracts::shared::period::PeriodType;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::a004_kpi_value::repository::ValueFilter;
use crate::domain::{a001_department, a002_segment, a003_kpi_definition, a004_kpi_value};
use crate::shared::error::{ApiError, ApiResult};
use crate::shared::{aggregation, fiscal, metrics};

type SumMap = HashMap<(SegmentId, KpiId), Decimal>;

/// Stores x product-group KPIs, single month or cumulative window.
/// Exactly one batched read per year: two in monthly mode, three in
/// cumulative mode.
pub async fn product_matrix(
    slug: &str,
    period_type: PeriodType,
    year: Option<i32>,
    month: Option<u32>,
) -> ApiResult<ProductMatrixResponse> {
    if !matches!(period_type, PeriodType::Monthly | PeriodType::Cumulative) {
        return Err(ApiError::BadRequest(
            "period_type must be monthly or cumulative".into(),
        ));
    }
    let department = a001_department::service::resolve_by_slug(slug).await?;
    let (default_year, default_month) = fiscal::current_period_defaults();
    let year = year.unwrap_or(default_year);
    let month = month.unwrap_or(default_month);
    let as_of = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid period {}-{}", year, month)))?;
    let fiscal_year = fiscal::fiscal_year(as_of);

    let kpis = a003_kpi_definition::service::list_visible(
        department.id.value(),
        Some(&KpiCategory::ProductGroup),
    )
    .await?;
    let segments = a002_segment::service::list_by_department(department.id.value()).await?;
    let segment_ids: Vec<Uuid> = segments.iter().map(|s| s.id.value()).collect();
    let kpi_ids: Vec<Uuid> = kpis.iter().map(|k| k.id.value()).collect();

    let cumulative = period_type == PeriodType::Cumulative;
    let windows: [Vec<NaiveDate>; 3] = if cumulative {
        aggregation::cumulative_windows(fiscal_year, as_of)
    } else {
        [
            vec![as_of],
            vec![fiscal::previous_year_month(as_of)],
            Vec::new(),
        ]
    };

    let mut maps: Vec<SumMap> = Vec::with_capacity(3);
    for window in &windows {
        if window.is_empty() {
            maps.push(SumMap::new());
            continue;
        }
        let rows = a004_kpi_value::repository::read_values(&ValueFilter {
            segment_ids: Some(segment_ids.clone()),
            kpi_ids: Some(kpi_ids.clone()),
            dates: Some(window.clone()),
            is_target: Some(false),
            ..Default::default()
        })
        .await?;
        maps.push(aggregation::sum_by_key(&rows));
    }

    let (stores, totals) = build_matrix(&kpis, &segments, &maps[0], &maps[1], &maps[2], cumulative);
    Ok(ProductMatrixResponse {
        period: as_of,
        fiscal_year,
        period_type,
        product_groups: kpis.iter().map(|k| k.name.clone()).collect(),
        stores,
        totals,
    })
}

fn cell(
    kpi: &KpiDefinition,
    actual: Option<Decimal>,
    previous: Option<Decimal>,
    two_back: Option<Decimal>,
    cumulative: bool,
) -> MatrixCell {
    MatrixCell {
        kpi_id: kpi.id,
        name: kpi.name.clone(),
        actual,
        previous_year: previous,
        yoy_rate: metrics::yoy_rate(actual, previous),
        two_years_ago: if cumulative { two_back } else { None },
        yoy_rate_two_years: if cumulative {
            metrics::yoy_rate(actual, two_back)
        } else {
            None
        },
    }
}

/// Sum of present cells; None when every cell is absent.
fn optional_sum(values: impl Iterator<Item = Option<Decimal>>) -> Option<Decimal> {
    values.flatten().fold(None, |acc, v| {
        Some(acc.unwrap_or(Decimal::ZERO) + v)
    })
}

fn build_matrix(
    kpis: &[KpiDefinition],
    segments: &[Segment],
    current: &SumMap,
    previous: &SumMap,
    two_back: &SumMap,
    cumulative: bool,
) -> (Vec<StoreMatrixRow>, Vec<MatrixCell>) {
    let stores: Vec<StoreMatrixRow> = segments
        .iter()
        .map(|segment| {
            let cells: Vec<MatrixCell> = kpis
                .iter()
                .map(|kpi| {
                    let key = (segment.id, kpi.id);
                    cell(
                        kpi,
                        current.get(&key).copied(),
                        previous.get(&key).copied(),
                        two_back.get(&key).copied(),
                        cumulative,
                    )
                })
                .collect();
            StoreMatrixRow {
                segment_id: segment.id,
                segment_code: segment.code.clone(),
                segment_name: segment.name.clone(),
                total: cells
                    .iter()
                    .filter_map(|c| c.actual)
                    .fold(Decimal::ZERO, |acc, v| acc + v),
                total_previous_year: optional_sum(cells.iter().map(|c| c.previous_year)),
                total_two_years_ago: optional_sum(cells.iter().map(|c| c.two_years_ago)),
                cells,
            }
        })
        .collect();

    // Column totals are summed from the fetched cells, never re-queried,
    // so the grid is internally consistent.
    let totals: Vec<MatrixCell> = kpis
        .iter()
        .enumerate()
        .map(|(column, kpi)| {
            let column_values = |f: fn(&MatrixCell) -> Option<Decimal>| {
                optional_sum(stores.iter().map(|row| f(&row.cells[column])))
            };
            let actual = column_values(|c| c.actual);
            let previous = column_values(|c| c.previous_year);
            let two = column_values(|c| c.two_years_ago);
            cell(kpi, actual, previous, two, cumulative)
        })
        .collect();

    (stores, totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_department::aggregate::DepartmentId;
    use rust_decimal_macros::dec;

    fn kpi(name: &str) -> KpiDefinition {
        KpiDefinition {
            id: KpiId::new(Uuid::new_v4()),
            department_id: DepartmentId::new(Uuid::new_v4()),
            category: KpiCategory::ProductGroup,
            name: name.into(),
            unit: "yen".into(),
            is_calculated: false,
            formula: None,
            display_order: 1,
            is_visible: true,
        }
    }

    fn segment(code: &str) -> Segment {
        Segment {
            id: SegmentId::new(Uuid::new_v4()),
            code: code.into(),
            name: format!("Store {}", code),
            department_id: DepartmentId::new(Uuid::new_v4()),
        }
    }

    #[test]
    fn totals_equal_the_sum_of_fetched_cells() {
        let produce = kpi("produce");
        let bakery = kpi("bakery");
        let s1 = segment("S1");
        let s2 = segment("S2");

        let mut current = SumMap::new();
        current.insert((s1.id, produce.id), dec!(100));
        current.insert((s1.id, bakery.id), dec!(40));
        current.insert((s2.id, produce.id), dec!(60));
        let mut previous = SumMap::new();
        previous.insert((s1.id, produce.id), dec!(80));
        let two_back = SumMap::new();

        let (stores, totals) = build_matrix(
            &[produce, bakery],
            &[s1, s2],
            &current,
            &previous,
            &two_back,
            true,
        );

        assert_eq!(stores[0].total, dec!(140));
        assert_eq!(stores[1].total, dec!(60));
        // bakery never traded at S2: cell absent, not zero
        assert_eq!(stores[1].cells[1].actual, None);

        assert_eq!(totals[0].actual, Some(dec!(160)));
        assert_eq!(totals[0].previous_year, Some(dec!(80)));
        assert_eq!(totals[0].yoy_rate, Some(dec!(100.00)));
        assert_eq!(totals[1].actual, Some(dec!(40)));
        assert_eq!(totals[1].previous_year, None);
        assert_eq!(totals[1].yoy_rate, None);
    }

    #[test]
    fn monthly_mode_carries_no_two_year_series() {
        let produce = kpi("produce");
        let s1 = segment("S1");
        let mut current = SumMap::new();
        current.insert((s1.id, produce.id), dec!(100));
        let mut two_back = SumMap::new();
        two_back.insert((s1.id, produce.id), dec!(50));

        let (stores, _) = build_matrix(
            &[produce],
            &[s1],
            &current,
            &SumMap::new(),
            &two_back,
            false,
        );
        assert_eq!(stores[0].cells[0].two_years_ago, None);
        assert_eq!(stores[0].cells[0].yoy_rate_two_years, None);
    }
}
