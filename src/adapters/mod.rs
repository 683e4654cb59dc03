pub mod csv_post_adapter;
pub mod csv_price_adapter;
pub mod csv_report_adapter;
pub mod file_config_adapter;
pub mod html_report;
pub mod pine_script;
pub mod sample_post_adapter;
pub mod sample_price_adapter;
