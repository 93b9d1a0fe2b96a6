//! SQLite schema definitions for the catalog database.
//!
//! Primary keys are integer rowids with unique text ids for lookups.
//! Locales live in a junction table so their order is preserved.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

/// Catalogs table - one row per catalog record
const CATALOGS_TABLE: Table = Table {
    name: "catalogs",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true), // store-assigned UUID
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("vertical", &SqlType::Text, non_null = true), // 'fashion', 'home', 'general'
        sqlite_column!(
            "is_primary",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "is_multilocale",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[
        ("idx_catalogs_id", "id"),
        ("idx_catalogs_vertical", "vertical"),
    ],
    unique_constraints: &[&["id"]],
};

/// Catalog <-> locale relationship, ordered by position
const CATALOG_LOCALES_TABLE: Table = Table {
    name: "catalog_locales",
    columns: &[
        sqlite_column!("catalog_rowid", &SqlType::Integer, non_null = true),
        sqlite_column!("locale", &SqlType::Text, non_null = true), // xx_YY code
        sqlite_column!("position", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_catalog_locales_catalog", "catalog_rowid")],
    unique_constraints: &[&["catalog_rowid", "position"]],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[CATALOGS_TABLE, CATALOG_LOCALES_TABLE],
}];
