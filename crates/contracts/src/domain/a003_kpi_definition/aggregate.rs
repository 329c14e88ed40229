use serde::de::Deserializer;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::domain::a001_department::aggregate::DepartmentId;

/// ID of a KPI definition reference entity (a003)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KpiId(pub Uuid);

impl KpiId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// Indicator grouping used by the UI and by rollups.
///
/// Source data can introduce new category strings without a code change,
/// so unknown values survive as `Other` and round-trip losslessly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KpiCategory {
    /// Department-wide headline indicators (sales, customer count, ...).
    Overall,
    /// Product-group breakdown indicators; drive the store x product matrix.
    ProductGroup,
    Other(String),
}

impl KpiCategory {
    pub fn as_str(&self) -> &str {
        match self {
            KpiCategory::Overall => "overall",
            KpiCategory::ProductGroup => "product_group",
            KpiCategory::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "overall" => KpiCategory::Overall,
            "product_group" => KpiCategory::ProductGroup,
            other => KpiCategory::Other(other.to_string()),
        }
    }
}

impl Serialize for KpiCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for KpiCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(KpiCategory::parse(&s))
    }
}

/// KPI definition, one named indicator of a department.
/// The catalog is the source of truth for which metrics a report exposes
/// and in which order (`display_order` ascending).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiDefinition {
    pub id: KpiId,
    pub department_id: DepartmentId,
    pub category: KpiCategory,
    pub name: String,
    pub unit: String,
    /// True for indicators derived from others via `formula`.
    pub is_calculated: bool,
    pub formula: Option<String>,
    pub display_order: i32,
    pub is_visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_known_and_unknown_strings() {
        assert_eq!(KpiCategory::parse("overall"), KpiCategory::Overall);
        assert_eq!(KpiCategory::parse("product_group"), KpiCategory::ProductGroup);
        let other = KpiCategory::parse("complaint_class");
        assert_eq!(other, KpiCategory::Other("complaint_class".to_string()));
        assert_eq!(other.as_str(), "complaint_class");
        assert_eq!(KpiCategory::parse(KpiCategory::Overall.as_str()), KpiCategory::Overall);
    }
}
