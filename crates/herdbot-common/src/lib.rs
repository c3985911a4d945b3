//! Shared infrastructure for herdbot: error taxonomy and logging bootstrap.

pub mod error;
pub mod logging;

pub use error::{HerdBotError, Result};
pub use logging::{init_logging, LoggingConfig};
