//! Publishing boundary for herdbot: posts caption + chart image to a
//! social-media account.

pub mod publisher;

pub use publisher::{NullPublisher, PublisherConfig, StatusPublisher, TwitterPublisher};
