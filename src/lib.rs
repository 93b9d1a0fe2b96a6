//! Vertical Catalog Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog_store;
pub mod manager;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog_store::{Catalog, CatalogStore, SqliteCatalogStore, Vertical};
pub use manager::{CatalogError, CatalogManager};
pub use server::{run_server, RequestsLoggingLevel};
