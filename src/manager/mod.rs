//! Catalog store manager.
//!
//! Owns all reads and writes against the catalog collection and enforces the
//! two invariants that are not plain plumbing: at most one primary catalog
//! per vertical, and the derived multilocale flag. Structural validation of
//! incoming payloads happens in the HTTP layer before anything reaches this
//! module.

use crate::catalog_store::{
    Catalog, CatalogFieldSet, CatalogFilter, CatalogStore, NewCatalog, Vertical,
};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors surfaced by catalog operations.
///
/// The display strings of the not-found variants are part of the API
/// contract and must not change.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog with ID '{0}' not found.")]
    NotFound(String),

    #[error("No catalogs found to delete.")]
    NoneDeleted,

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl CatalogError {
    /// Whether this is a not-found condition (as opposed to a store failure).
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_) | CatalogError::NoneDeleted)
    }
}

/// Input for catalog creation. `isMultilocale` is intentionally absent:
/// the derived flag is computed here, never accepted from callers.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateCatalog {
    pub name: String,
    pub vertical: Vertical,
    #[serde(default)]
    pub primary: bool,
    pub locales: Vec<String>,
}

/// Partial update for a catalog. Absent fields leave the stored record
/// untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogPatch {
    pub name: Option<String>,
    pub vertical: Option<Vertical>,
    pub primary: Option<bool>,
    pub locales: Option<Vec<String>>,
}

/// The catalog store manager.
///
/// Invariant maintenance for primary exclusivity is best-effort: the
/// find-existing-primary, demote, write sequence is three separate store
/// calls, so concurrent writers racing on the same vertical can leave zero
/// or two primaries. Matching the legacy service, no store-level constraint
/// papers over that window.
pub struct CatalogManager {
    store: Arc<dyn CatalogStore>,
}

impl CatalogManager {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        CatalogManager { store }
    }

    /// Demote the current primary of `vertical` (skipping `exclude_id` if
    /// given), so the record about to be written can take the flag.
    fn demote_existing_primary(
        &self,
        vertical: Vertical,
        exclude_id: Option<&str>,
    ) -> Result<(), CatalogError> {
        let mut filter = CatalogFilter::primary_of(vertical);
        if let Some(id) = exclude_id {
            filter = filter.excluding(id);
        }

        if let Some(existing) = self.store.find_one(&filter)? {
            debug!(
                "Demoting current primary catalog {} of vertical {}",
                existing.id, vertical
            );
            self.store.update_one(
                &CatalogFilter::by_id(&existing.id),
                &CatalogFieldSet::clear_primary(),
            )?;
        }
        Ok(())
    }

    /// Create a new catalog, demoting an existing primary of the same
    /// vertical first when the new record claims the flag.
    pub fn create(&self, input: CreateCatalog) -> Result<Catalog, CatalogError> {
        let result = (|| -> Result<Catalog, CatalogError> {
            if input.primary {
                self.demote_existing_primary(input.vertical, None)?;
            }

            let is_multilocale = input.locales.len() > 1;
            let created = self.store.insert(NewCatalog {
                name: input.name,
                vertical: input.vertical,
                primary: input.primary,
                locales: input.locales,
                is_multilocale,
            })?;

            info!(
                "Created catalog {} in vertical {}",
                created.id, created.vertical
            );
            Ok(created)
        })();

        result.inspect_err(|e| error!("Error creating catalog: {}", e))
    }

    /// All stored catalogs, in the store's natural enumeration order.
    pub fn find_all(&self) -> Result<Vec<Catalog>, CatalogError> {
        Ok(self.store.find_all()?)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Catalog, CatalogError> {
        self.store
            .find_by_id(id)?
            .ok_or_else(|| CatalogError::NotFound(id.to_owned()))
    }

    /// Apply a partial update to the catalog identified by `id`.
    ///
    /// Demotion uses the patch's vertical when present, otherwise the
    /// stored record's current vertical, and never treats the target
    /// itself as the primary to demote. The updated record is re-read
    /// rather than reconstructed from the patch.
    pub fn update_catalog(&self, id: &str, patch: CatalogPatch) -> Result<Catalog, CatalogError> {
        let result = (|| -> Result<Catalog, CatalogError> {
            let existing = self
                .store
                .find_by_id(id)?
                .ok_or_else(|| CatalogError::NotFound(id.to_owned()))?;

            if patch.primary == Some(true) {
                let effective_vertical = patch.vertical.unwrap_or(existing.vertical);
                self.demote_existing_primary(effective_vertical, Some(id))?;
            }

            let is_multilocale = patch.locales.as_ref().map(|locales| locales.len() > 1);
            let set = CatalogFieldSet {
                name: patch.name,
                vertical: patch.vertical,
                primary: patch.primary,
                locales: patch.locales,
                is_multilocale,
            };
            self.store.update_by_id(id, &set)?;

            self.store
                .find_by_id(id)?
                .ok_or_else(|| CatalogError::NotFound(id.to_owned()))
        })();

        result.inspect_err(|e| error!("Error updating catalog: {}", e))
    }

    pub fn delete_catalog(&self, id: &str) -> Result<(), CatalogError> {
        let deleted = self.store.delete_by_id(id)?;
        if deleted == 0 {
            return Err(CatalogError::NotFound(id.to_owned()));
        }
        info!("Deleted catalog {}", id);
        Ok(())
    }

    /// Delete every catalog whose id is in `ids` in one store call.
    ///
    /// The zero-affected check cannot distinguish "none of the ids existed"
    /// from "some existed but were already gone"; it is a count check, not
    /// per-id reporting.
    pub fn delete_multiple_catalogs(&self, ids: &[String]) -> Result<(), CatalogError> {
        let deleted = self.store.delete_by_ids(ids)?;
        if deleted == 0 {
            return Err(CatalogError::NoneDeleted);
        }
        info!("Deleted {} catalogs", deleted);
        Ok(())
    }
}
