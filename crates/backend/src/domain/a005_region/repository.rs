use contracts::domain::a002_segment::aggregate::SegmentId;
use contracts::domain::a005_region::aggregate::{Region, RegionId, StoreRegionMapping};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryOrder, Set};

use crate::shared::data::db::get_connection;

pub mod region_entity {
    use serde::{Deserialize, Serialize};

    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a005_region")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        pub display_order: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod mapping_entity {
    use serde::{Deserialize, Serialize};

    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a005_store_region")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub segment_id: String,
        pub region_id: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<region_entity::Model> for Region {
    fn from(m: region_entity::Model) -> Self {
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        Region {
            id: RegionId(uuid),
            name: m.name,
            display_order: m.display_order,
        }
    }
}

impl From<mapping_entity::Model> for StoreRegionMapping {
    fn from(m: mapping_entity::Model) -> Self {
        StoreRegionMapping {
            segment_id: SegmentId(Uuid::parse_str(&m.segment_id).unwrap_or_else(|_| Uuid::new_v4())),
            region_id: RegionId(Uuid::parse_str(&m.region_id).unwrap_or_else(|_| Uuid::new_v4())),
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn list_regions() -> anyhow::Result<Vec<Region>> {
    let items = region_entity::Entity::find()
        .order_by_asc(region_entity::Column::DisplayOrder)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn list_mappings() -> anyhow::Result<Vec<StoreRegionMapping>> {
    let items = mapping_entity::Entity::find()
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Assign a segment to a region; a previous assignment is replaced.
pub async fn upsert_mapping(mapping: &StoreRegionMapping) -> anyhow::Result<()> {
    let segment_id = mapping.segment_id.value().to_string();
    let existing = mapping_entity::Entity::find_by_id(segment_id.clone())
        .one(conn())
        .await?;
    match existing {
        Some(model) => {
            let mut active: mapping_entity::ActiveModel = model.into();
            active.region_id = Set(mapping.region_id.value().to_string());
            active.update(conn()).await?;
        }
        None => {
            let active = mapping_entity::ActiveModel {
                segment_id: Set(segment_id),
                region_id: Set(mapping.region_id.value().to_string()),
            };
            active.insert(conn()).await?;
        }
    }
    Ok(())
}

pub async fn get_region_by_id(id: Uuid) -> anyhow::Result<Option<Region>> {
    let result = region_entity::Entity::find_by_id(id.to_string())
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}
