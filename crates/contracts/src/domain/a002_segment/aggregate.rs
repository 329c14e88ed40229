use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::a001_department::aggregate::DepartmentId;

/// ID of a segment reference entity (a002)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub Uuid);

impl SegmentId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// Segment is a store or reporting unit inside exactly one department.
/// Created and removed by administrative tooling; the engine only reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub code: String,
    pub name: String,
    pub department_id: DepartmentId,
}
