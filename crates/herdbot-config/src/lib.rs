//! Configuration for herdbot: settings structs, loader, and validation.

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::ConfigLoader;
pub use settings::{
    ChartSettings, LoggingSettings, ProjectionSettings, ServerSettings, Settings, SourceSettings,
    TwitterSettings,
};
