use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::a002_segment::aggregate::SegmentId;

/// ID of a region reference entity (a005)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId(pub Uuid);

impl RegionId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// Region is a secondary grouping of segments used only to re-key
/// aggregations; it stores no values of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub display_order: i32,
}

/// A segment's current region assignment. Each segment maps to at most
/// one region; re-assigning replaces the previous mapping (no history).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRegionMapping {
    pub segment_id: SegmentId,
    pub region_id: RegionId,
}

/// Mapping list entry for the administration screen; `region_id` is None
/// for segments that have not been assigned yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRegionMappingRow {
    pub segment_id: SegmentId,
    pub segment_name: String,
    pub region_id: Option<RegionId>,
    pub region_name: Option<String>,
}
