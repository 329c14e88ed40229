use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID of a department reference entity (a001)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepartmentId(pub Uuid);

impl DepartmentId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// Department is the top-level reporting scope (retail stores, e-commerce,
/// finance, manufacturing). Reference data; never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    /// Stable machine key used in URLs, e.g. "store", "finance".
    pub slug: String,
}
