pub mod d401_department_summary;
pub mod d402_store_ranking;
pub mod d403_product_matrix;
pub mod d404_store_summary;
pub mod d405_regional_summary;
pub mod d406_kpi_trend;
pub mod d407_company_dashboard;
