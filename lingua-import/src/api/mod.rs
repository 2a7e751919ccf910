//! HTTP API handlers for lingua-import

pub mod health;
pub mod import;
pub mod partitions;

pub use health::health_routes;
pub use import::import_routes;
pub use partitions::partition_routes;
