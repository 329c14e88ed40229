pub mod u501_target_entry;
pub mod u502_import_actuals;
