use chrono::{NaiveDate, Utc};
use contracts::domain::a002_segment::aggregate::SegmentId;
use contracts::domain::a003_kpi_definition::aggregate::KpiId;
use contracts::domain::a004_kpi_value::aggregate::{KpiValueRow, UpsertOutcome};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, DatabaseBackend, EntityTrait, FromQueryResult, QueryFilter, Set, Statement,
};

use crate::shared::data::db::get_connection;

/// One row of the monthly KPI fact table. Values are stored as REAL and
/// converted to Decimal at this boundary; `date` is always the first day
/// of a month, stored as ISO text.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_kpi_value")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub segment_id: String,
    pub kpi_id: String,
    pub date: String,
    pub value: f64,
    pub is_target: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for KpiValueRow {
    fn from(m: Model) -> Self {
        KpiValueRow {
            segment_id: SegmentId(Uuid::parse_str(&m.segment_id).unwrap_or_else(|_| Uuid::new_v4())),
            kpi_id: KpiId(Uuid::parse_str(&m.kpi_id).unwrap_or_else(|_| Uuid::new_v4())),
            date: NaiveDate::parse_from_str(&m.date, "%Y-%m-%d").unwrap_or_default(),
            value: Decimal::from_f64(m.value).unwrap_or_default(),
            is_target: m.is_target,
        }
    }
}

/// Fact row together with its storage id, for screens that edit rows.
#[derive(Debug, Clone)]
pub struct StoredValue {
    pub id: Uuid,
    pub row: KpiValueRow,
}

impl From<Model> for StoredValue {
    fn from(m: Model) -> Self {
        let id = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        StoredValue {
            id,
            row: m.into(),
        }
    }
}

/// Filter for a single batched read. Every field narrows the result;
/// `None` means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct ValueFilter {
    pub segment_ids: Option<Vec<Uuid>>,
    pub kpi_ids: Option<Vec<Uuid>>,
    pub dates: Option<Vec<NaiveDate>>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub is_target: Option<bool>,
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn apply_filter(filter: &ValueFilter) -> Select<Entity> {
    let mut query = Entity::find();
    if let Some(ids) = &filter.segment_ids {
        query = query.filter(Column::SegmentId.is_in(ids.iter().map(|id| id.to_string())));
    }
    if let Some(ids) = &filter.kpi_ids {
        query = query.filter(Column::KpiId.is_in(ids.iter().map(|id| id.to_string())));
    }
    if let Some(dates) = &filter.dates {
        query = query.filter(Column::Date.is_in(dates.iter().map(|d| d.to_string())));
    }
    // ISO dates compare correctly as text
    if let Some(from) = filter.date_from {
        query = query.filter(Column::Date.gte(from.to_string()));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(Column::Date.lte(to.to_string()));
    }
    if let Some(is_target) = filter.is_target {
        query = query.filter(Column::IsTarget.eq(is_target));
    }
    query
}

/// One batched SELECT per window; callers aggregate in memory.
pub async fn read_values(filter: &ValueFilter) -> anyhow::Result<Vec<KpiValueRow>> {
    let rows = apply_filter(filter)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(rows)
}

pub async fn read_values_with_ids(filter: &ValueFilter) -> anyhow::Result<Vec<StoredValue>> {
    let rows = apply_filter(filter)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(rows)
}

async fn find_by_identity(row: &KpiValueRow) -> anyhow::Result<Option<Model>> {
    let found = Entity::find()
        .filter(Column::SegmentId.eq(row.segment_id.value().to_string()))
        .filter(Column::KpiId.eq(row.kpi_id.value().to_string()))
        .filter(Column::Date.eq(row.date.to_string()))
        .filter(Column::IsTarget.eq(row.is_target))
        .one(conn())
        .await?;
    Ok(found)
}

/// Replace-in-place on identity match, insert otherwise. The composite
/// identity (segment, kpi, month, flag) is enforced by a unique index.
pub async fn upsert_value(row: &KpiValueRow) -> anyhow::Result<UpsertOutcome> {
    let value = row.value.to_f64().unwrap_or(0.0);
    match find_by_identity(row).await? {
        Some(existing) => {
            let id = Uuid::parse_str(&existing.id).unwrap_or_else(|_| Uuid::new_v4());
            let mut active: ActiveModel = existing.into();
            active.value = Set(value);
            active.updated_at = Set(Some(Utc::now()));
            active.update(conn()).await?;
            Ok(UpsertOutcome { id, created: false })
        }
        None => {
            let id = Uuid::new_v4();
            let now = Utc::now();
            let active = ActiveModel {
                id: Set(id.to_string()),
                segment_id: Set(row.segment_id.value().to_string()),
                kpi_id: Set(row.kpi_id.value().to_string()),
                date: Set(row.date.to_string()),
                value: Set(value),
                is_target: Set(row.is_target),
                created_at: Set(Some(now)),
                updated_at: Set(Some(now)),
            };
            active.insert(conn()).await?;
            Ok(UpsertOutcome { id, created: true })
        }
    }
}

/// Delete a stored target row. Actual rows are never deleted this way.
pub async fn delete_target(id: Uuid) -> anyhow::Result<bool> {
    let result = Entity::delete_many()
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsTarget.eq(true))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}

#[derive(Debug, FromQueryResult)]
struct MonthRow {
    date: String,
}

/// Distinct fact months, newest first.
pub async fn available_months() -> anyhow::Result<Vec<NaiveDate>> {
    let rows = MonthRow::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "SELECT DISTINCT date FROM a004_kpi_value ORDER BY date DESC",
        [],
    ))
    .all(conn())
    .await?;
    let months = rows
        .into_iter()
        .filter_map(|r| NaiveDate::parse_from_str(&r.date, "%Y-%m-%d").ok())
        .collect();
    Ok(months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn repeated_upsert_of_one_identity_keeps_a_single_row() {
        db::initialize_database(Some("target/db/test-facts.db"))
            .await
            .expect("schema bootstrap");

        // Fresh ids per run; the file persists across test invocations.
        let row = KpiValueRow {
            segment_id: SegmentId::new(Uuid::new_v4()),
            kpi_id: KpiId::new(Uuid::new_v4()),
            date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            value: dec!(100),
            is_target: true,
        };
        let first = upsert_value(&row).await.unwrap();
        assert!(first.created);

        let mut replay = row.clone();
        replay.value = dec!(140);
        let second = upsert_value(&replay).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.id, first.id);

        let stored = read_values_with_ids(&ValueFilter {
            segment_ids: Some(vec![row.segment_id.value()]),
            kpi_ids: Some(vec![row.kpi_id.value()]),
            ..Default::default()
        })
        .await
        .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].row.value, dec!(140));
    }
}
