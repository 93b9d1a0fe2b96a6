//! Test fixture helpers
//!
//! Catalog ids are store-assigned, so seeding goes through the store handle
//! the `TestServer` exposes rather than through fixed-id SQL inserts.

use vertical_catalog_server::catalog_store::{Catalog, CatalogStore, NewCatalog, Vertical};

/// Insert a catalog directly into the store, bypassing the HTTP layer.
pub fn seed_catalog(
    store: &dyn CatalogStore,
    name: &str,
    vertical: Vertical,
    primary: bool,
    locales: &[&str],
) -> Catalog {
    store
        .insert(NewCatalog {
            name: name.to_owned(),
            vertical,
            primary,
            locales: locales.iter().map(|s| s.to_string()).collect(),
            is_multilocale: locales.len() > 1,
        })
        .expect("Failed to seed catalog")
}
