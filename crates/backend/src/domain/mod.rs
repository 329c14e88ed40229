pub mod a001_department;
pub mod a002_segment;
pub mod a003_kpi_definition;
pub mod a004_kpi_value;
pub mod a005_region;
