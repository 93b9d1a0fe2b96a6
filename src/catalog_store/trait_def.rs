//! CatalogStore trait definition.
//!
//! This trait abstracts the document-store capabilities the manager needs,
//! so the server logic stays independent of the SQLite backing.

use super::models::{Catalog, CatalogFieldSet, CatalogFilter, NewCatalog};
use anyhow::Result;

/// Trait for catalog storage backends.
///
/// Filters are equality conjunctions over catalog fields; updates are
/// partial `$set`-style writes. All counting results report the number of
/// records actually affected.
pub trait CatalogStore: Send + Sync {
    /// Enumerate every stored catalog in the store's natural order.
    fn find_all(&self) -> Result<Vec<Catalog>>;

    /// Find at most one catalog matching the filter.
    fn find_one(&self, filter: &CatalogFilter) -> Result<Option<Catalog>>;

    /// Look up a catalog by its id.
    fn find_by_id(&self, id: &str) -> Result<Option<Catalog>>;

    /// Insert a new catalog. The store assigns the id and returns the
    /// complete stored record.
    fn insert(&self, record: NewCatalog) -> Result<Catalog>;

    /// Apply the field set to at most one record matching the filter.
    /// Returns whether a record was updated.
    fn update_one(&self, filter: &CatalogFilter, set: &CatalogFieldSet) -> Result<bool>;

    /// Apply the field set to the record with the given id.
    /// Returns whether a record was updated.
    fn update_by_id(&self, id: &str, set: &CatalogFieldSet) -> Result<bool>;

    /// Delete the record with the given id, returning the deleted count.
    fn delete_by_id(&self, id: &str) -> Result<usize>;

    /// Delete every record whose id is in the given set in one call,
    /// returning the deleted count.
    fn delete_by_ids(&self, ids: &[String]) -> Result<usize>;
}
