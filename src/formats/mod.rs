pub mod html;
pub mod parquet;
pub mod plot;
