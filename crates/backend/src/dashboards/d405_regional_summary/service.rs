use std::collections::HashMap;

use contracts::dashboards::d405_regional_summary::{
    RegionRollup, RegionStoreRow, RegionTotals, RegionalSummaryResponse,
};
use contracts::domain::a002_segment::aggregate::{Segment, SegmentId};
use contracts::domain::a003_kpi_definition::aggregate::KpiId;
use contracts::domain::a005_region::aggregate::{Region, RegionId, StoreRegionMapping};
use contracts::shared::metrics::YearComparison;
use contracts::shared::period::PeriodType;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dashboards::d404_store_summary::service::{
    comparison, resolve_windows, unit_price_comparison, SumMap, DEFAULT_CUSTOMERS_KPI,
    DEFAULT_SALES_KPI,
};
use crate::domain::a004_kpi_value::repository::ValueFilter;
use crate::domain::{
    a001_department, a002_segment, a003_kpi_definition, a004_kpi_value, a005_region,
};
use crate::shared::error::ApiResult;
use crate::shared::{aggregation, metrics};

/// Label of the bucket collecting stores with no region assignment.
pub const UNASSIGNED_REGION: &str = "unassigned";

/// Store summary re-keyed through the region mapping. Stores without a
/// mapping land in the unassigned bucket; the grand total covers every
/// store exactly once.
pub async fn regional_summary(
    slug: &str,
    period_type: PeriodType,
    year: Option<i32>,
    month: Option<u32>,
    sales_kpi: Option<&str>,
    customers_kpi: Option<&str>,
) -> ApiResult<RegionalSummaryResponse> {
    let department = a001_department::service::resolve_by_slug(slug).await?;
    let sales = a003_kpi_definition::service::resolve_by_name(
        department.id.value(),
        sales_kpi.unwrap_or(DEFAULT_SALES_KPI),
    )
    .await?;
    let customers = a003_kpi_definition::service::resolve_by_name(
        department.id.value(),
        customers_kpi.unwrap_or(DEFAULT_CUSTOMERS_KPI),
    )
    .await?;
    let segments = a002_segment::service::list_by_department(department.id.value()).await?;
    let regions = a005_region::service::list_regions().await?;
    let mappings = a005_region::service::list_mappings().await?;
    let plan = resolve_windows(period_type, year, month)?;

    let segment_ids: Vec<Uuid> = segments.iter().map(|s| s.id.value()).collect();
    let kpi_ids = vec![sales.id.value(), customers.id.value()];

    // Current-year read carries both series; targets feed the regional
    // achievement figures.
    let current_rows = a004_kpi_value::repository::read_values(&ValueFilter {
        segment_ids: Some(segment_ids.clone()),
        kpi_ids: Some(kpi_ids.clone()),
        dates: Some(plan.windows[0].clone()),
        ..Default::default()
    })
    .await?;
    let (current_actuals, current_targets): (Vec<_>, Vec<_>) =
        current_rows.into_iter().partition(|r| !r.is_target);
    let current = aggregation::sum_by_key(&current_actuals);
    let targets = aggregation::sum_by_key(&current_targets);

    let mut prior_maps: Vec<SumMap> = Vec::with_capacity(2);
    for window in &plan.windows[1..] {
        let rows = a004_kpi_value::repository::read_values(&ValueFilter {
            segment_ids: Some(segment_ids.clone()),
            kpi_ids: Some(kpi_ids.clone()),
            dates: Some(window.clone()),
            is_target: Some(false),
            ..Default::default()
        })
        .await?;
        prior_maps.push(aggregation::sum_by_key(&rows));
    }

    let (rollups, totals) = build_rollups(
        &regions,
        &mappings,
        &segments,
        sales.id,
        customers.id,
        &current,
        &prior_maps[0],
        &prior_maps[1],
        &targets,
    );

    Ok(RegionalSummaryResponse {
        period: plan.as_of,
        period_type,
        fiscal_year: plan.cumulative.then_some(plan.fiscal_year),
        regions: rollups,
        totals,
    })
}

fn sum_over<'a>(
    map: &SumMap,
    segments: impl Iterator<Item = &'a Segment>,
    kpi: KpiId,
) -> Option<Decimal> {
    let mut total = None;
    for segment in segments {
        if let Some(value) = map.get(&(segment.id, kpi)) {
            *total.get_or_insert(Decimal::ZERO) += *value;
        }
    }
    total
}

#[allow(clippy::too_many_arguments)]
fn build_rollups(
    regions: &[Region],
    mappings: &[StoreRegionMapping],
    segments: &[Segment],
    sales_kpi: KpiId,
    customers_kpi: KpiId,
    current: &SumMap,
    previous: &SumMap,
    two_back: &SumMap,
    targets: &SumMap,
) -> (Vec<RegionRollup>, RegionTotals) {
    let assignment: HashMap<SegmentId, RegionId> = mappings
        .iter()
        .map(|m| (m.segment_id, m.region_id))
        .collect();

    let mut buckets: Vec<(Option<&Region>, Vec<&Segment>)> = regions
        .iter()
        .map(|region| (Some(region), Vec::new()))
        .collect();
    let mut unassigned: Vec<&Segment> = Vec::new();
    for segment in segments {
        match assignment
            .get(&segment.id)
            .and_then(|rid| buckets.iter_mut().find(|(r, _)| r.map(|r| r.id) == Some(*rid)))
        {
            Some((_, members)) => members.push(segment),
            None => unassigned.push(segment),
        }
    }
    if !unassigned.is_empty() {
        buckets.push((None, unassigned));
    }

    let rollups: Vec<RegionRollup> = buckets
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .map(|(region, members)| {
            let sales = comparison(
                sum_over(current, members.iter().copied(), sales_kpi),
                sum_over(previous, members.iter().copied(), sales_kpi),
                sum_over(two_back, members.iter().copied(), sales_kpi),
            );
            let customers = comparison(
                sum_over(current, members.iter().copied(), customers_kpi),
                sum_over(previous, members.iter().copied(), customers_kpi),
                sum_over(two_back, members.iter().copied(), customers_kpi),
            );
            let unit_price = unit_price_comparison(&sales, &customers);
            let target_sales = sum_over(targets, members.iter().copied(), sales_kpi);
            let target_customers = sum_over(targets, members.iter().copied(), customers_kpi);
            let stores = members
                .iter()
                .map(|segment| store_row(segment, sales_kpi, customers_kpi, current, previous, two_back))
                .collect();
            RegionRollup {
                region_id: region.map(|r| r.id),
                region_name: region
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| UNASSIGNED_REGION.to_string()),
                target_achievement_rate: metrics::achievement_rate(sales.current, target_sales),
                sales,
                customers,
                unit_price,
                target_sales,
                target_customers,
                stores,
            }
        })
        .collect();

    let totals = grand_totals(segments, sales_kpi, customers_kpi, current, previous, two_back);
    (rollups, totals)
}

fn store_row(
    segment: &Segment,
    sales_kpi: KpiId,
    customers_kpi: KpiId,
    current: &SumMap,
    previous: &SumMap,
    two_back: &SumMap,
) -> RegionStoreRow {
    let lookup = |map: &SumMap, kpi: KpiId| map.get(&(segment.id, kpi)).copied();
    let sales = comparison(
        lookup(current, sales_kpi),
        lookup(previous, sales_kpi),
        lookup(two_back, sales_kpi),
    );
    let customers = comparison(
        lookup(current, customers_kpi),
        lookup(previous, customers_kpi),
        lookup(two_back, customers_kpi),
    );
    let unit_price = unit_price_comparison(&sales, &customers);
    RegionStoreRow {
        segment_id: segment.id,
        segment_code: segment.code.clone(),
        segment_name: segment.name.clone(),
        sales,
        customers,
        unit_price,
    }
}

/// Grand total over every store of the department, mapped or not.
fn grand_totals(
    segments: &[Segment],
    sales_kpi: KpiId,
    customers_kpi: KpiId,
    current: &SumMap,
    previous: &SumMap,
    two_back: &SumMap,
) -> RegionTotals {
    let sales: YearComparison = comparison(
        sum_over(current, segments.iter(), sales_kpi),
        sum_over(previous, segments.iter(), sales_kpi),
        sum_over(two_back, segments.iter(), sales_kpi),
    );
    let customers = comparison(
        sum_over(current, segments.iter(), customers_kpi),
        sum_over(previous, segments.iter(), customers_kpi),
        sum_over(two_back, segments.iter(), customers_kpi),
    );
    let unit_price = unit_price_comparison(&sales, &customers);
    RegionTotals {
        sales,
        customers,
        unit_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_department::aggregate::DepartmentId;
    use rust_decimal_macros::dec;

    fn segment(code: &str) -> Segment {
        Segment {
            id: SegmentId::new(Uuid::new_v4()),
            code: code.into(),
            name: format!("Store {}", code),
            department_id: DepartmentId::new(Uuid::new_v4()),
        }
    }

    fn region(name: &str, order: i32) -> Region {
        Region {
            id: RegionId::new(Uuid::new_v4()),
            name: name.into(),
            display_order: order,
        }
    }

    #[test]
    fn unmapped_stores_form_an_unassigned_bucket_counted_in_totals() {
        let sales_kpi = KpiId::new(Uuid::new_v4());
        let customers_kpi = KpiId::new(Uuid::new_v4());
        let east = region("East", 1);
        let mapped = segment("S1");
        let stray = segment("S2");
        let mapping = StoreRegionMapping {
            segment_id: mapped.id,
            region_id: east.id,
        };

        let mut current = SumMap::new();
        current.insert((mapped.id, sales_kpi), dec!(100));
        current.insert((stray.id, sales_kpi), dec!(40));

        let (rollups, totals) = build_rollups(
            &[east],
            &[mapping],
            &[mapped, stray],
            sales_kpi,
            customers_kpi,
            &current,
            &SumMap::new(),
            &SumMap::new(),
            &SumMap::new(),
        );

        assert_eq!(rollups.len(), 2);
        assert_eq!(rollups[0].region_name, "East");
        assert_eq!(rollups[0].sales.current, Some(dec!(100)));
        assert_eq!(rollups[1].region_name, UNASSIGNED_REGION);
        assert_eq!(rollups[1].region_id, None);
        assert_eq!(rollups[1].sales.current, Some(dec!(40)));
        // Grand total covers mapped and unmapped stores alike
        assert_eq!(totals.sales.current, Some(dec!(140)));
    }

    #[test]
    fn regional_targets_aggregate_from_store_targets() {
        let sales_kpi = KpiId::new(Uuid::new_v4());
        let customers_kpi = KpiId::new(Uuid::new_v4());
        let east = region("East", 1);
        let a = segment("S1");
        let b = segment("S2");
        let mappings = vec![
            StoreRegionMapping { segment_id: a.id, region_id: east.id },
            StoreRegionMapping { segment_id: b.id, region_id: east.id },
        ];

        let mut current = SumMap::new();
        current.insert((a.id, sales_kpi), dec!(90));
        current.insert((b.id, sales_kpi), dec!(90));
        let mut targets = SumMap::new();
        targets.insert((a.id, sales_kpi), dec!(100));
        targets.insert((b.id, sales_kpi), dec!(100));

        let (rollups, _) = build_rollups(
            &[east],
            &mappings,
            &[a, b],
            sales_kpi,
            customers_kpi,
            &current,
            &SumMap::new(),
            &SumMap::new(),
            &targets,
        );

        assert_eq!(rollups[0].target_sales, Some(dec!(200)));
        assert_eq!(rollups[0].target_achievement_rate, Some(dec!(90.00)));
    }

    #[test]
    fn empty_regions_are_omitted() {
        let sales_kpi = KpiId::new(Uuid::new_v4());
        let customers_kpi = KpiId::new(Uuid::new_v4());
        let east = region("East", 1);
        let west = region("West", 2);
        let s = segment("S1");
        let mapping = StoreRegionMapping {
            segment_id: s.id,
            region_id: east.id,
        };
        let (rollups, _) = build_rollups(
            &[east, west],
            &[mapping],
            &[s],
            sales_kpi,
            customers_kpi,
            &SumMap::new(),
            &SumMap::new(),
            &SumMap::new(),
            &SumMap::new(),
        );
        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].region_name, "East");
    }
}
