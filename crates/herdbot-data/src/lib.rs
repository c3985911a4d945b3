//! Data-source boundary for herdbot: fetches the upstream vaccination
//! dataset and turns it into a validated observation series.

pub mod source;

pub use source::{DataSourceConfig, VaccinationDataSource};
