use contracts::domain::a001_department::aggregate::DepartmentId;
use contracts::domain::a003_kpi_definition::aggregate::{KpiCategory, KpiDefinition, KpiId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_kpi_definition")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub department_id: String,
    pub category: String,
    pub name: String,
    pub unit: String,
    pub is_calculated: bool,
    pub formula: Option<String>,
    pub display_order: i32,
    pub is_visible: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for KpiDefinition {
    fn from(m: Model) -> Self {
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let dept = Uuid::parse_str(&m.department_id).unwrap_or_else(|_| Uuid::new_v4());
        KpiDefinition {
            id: KpiId(uuid),
            department_id: DepartmentId(dept),
            category: KpiCategory::parse(&m.category),
            name: m.name,
            unit: m.unit,
            is_calculated: m.is_calculated,
            formula: m.formula,
            display_order: m.display_order,
            is_visible: m.is_visible,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Visible definitions of one department in catalog order, optionally
/// narrowed to a category.
pub async fn list_visible_by_department(
    department_id: Uuid,
    category: Option<&KpiCategory>,
) -> anyhow::Result<Vec<KpiDefinition>> {
    let mut query = Entity::find()
        .filter(Column::DepartmentId.eq(department_id.to_string()))
        .filter(Column::IsVisible.eq(true));
    if let Some(category) = category {
        query = query.filter(Column::Category.eq(category.as_str()));
    }
    let items = query
        .order_by_asc(Column::DisplayOrder)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<KpiDefinition>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

pub async fn get_by_name(department_id: Uuid, name: &str) -> anyhow::Result<Option<KpiDefinition>> {
    let result = Entity::find()
        .filter(Column::DepartmentId.eq(department_id.to_string()))
        .filter(Column::Name.eq(name))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}
