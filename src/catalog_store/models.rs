//! Catalog entity models.
//!
//! The wire representation matches the legacy service field names, so the
//! derived flag serializes as `isMultilocale`.

use serde::{Deserialize, Serialize};

/// Vertical category a catalog belongs to.
///
/// Primary-exclusivity is scoped per vertical: at most one catalog in each
/// vertical carries `primary = true`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    Fashion,
    Home,
    General,
}

impl Vertical {
    /// Convert from database string representation
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "fashion" => Some(Vertical::Fashion),
            "home" => Some(Vertical::Home),
            "general" => Some(Vertical::General),
            _ => None,
        }
    }

    /// Convert to database string representation
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Vertical::Fashion => "fashion",
            Vertical::Home => "home",
            Vertical::General => "general",
        }
    }
}

impl std::fmt::Display for Vertical {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// A stored catalog record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Store-assigned opaque identifier, immutable after insertion.
    pub id: String,
    pub name: String,
    pub vertical: Vertical,
    pub primary: bool,
    /// Ordered locale codes, each in `xx_YY` form. Never empty.
    pub locales: Vec<String>,
    /// Derived: `locales.len() > 1`. Recomputed whenever locales change,
    /// never accepted from callers.
    #[serde(rename = "isMultilocale")]
    pub is_multilocale: bool,
}

/// Fields for a catalog to be inserted. The store assigns the id.
#[derive(Clone, Debug)]
pub struct NewCatalog {
    pub name: String,
    pub vertical: Vertical,
    pub primary: bool,
    pub locales: Vec<String>,
    pub is_multilocale: bool,
}

/// Equality-conjunction filter over catalog fields, with optional id
/// exclusion for the self-excluding demotion lookup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogFilter {
    pub id: Option<String>,
    pub vertical: Option<Vertical>,
    pub primary: Option<bool>,
    pub exclude_id: Option<String>,
}

impl CatalogFilter {
    /// Match a single record by id.
    pub fn by_id(id: &str) -> Self {
        CatalogFilter {
            id: Some(id.to_owned()),
            ..Default::default()
        }
    }

    /// Match the current primary catalog of a vertical.
    pub fn primary_of(vertical: Vertical) -> Self {
        CatalogFilter {
            vertical: Some(vertical),
            primary: Some(true),
            ..Default::default()
        }
    }

    /// Exclude the given id from the matches.
    pub fn excluding(mut self, id: &str) -> Self {
        self.exclude_id = Some(id.to_owned());
        self
    }
}

/// Fields to set on matching records, in the style of a document-store
/// `$set` clause. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogFieldSet {
    pub name: Option<String>,
    pub vertical: Option<Vertical>,
    pub primary: Option<bool>,
    pub locales: Option<Vec<String>>,
    pub is_multilocale: Option<bool>,
}

impl CatalogFieldSet {
    /// The demotion write: clears the primary flag and nothing else.
    pub fn clear_primary() -> Self {
        CatalogFieldSet {
            primary: Some(false),
            ..Default::default()
        }
    }
}
