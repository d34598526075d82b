pub mod charts;
pub mod data_loader;
pub mod metrics;
pub mod models;

pub use charts::ChartReport;
pub use data_loader::MidPriceLoader;
pub use metrics::DerivedSeries;
pub use models::MidPriceRecord;
