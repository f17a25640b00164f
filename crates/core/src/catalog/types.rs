//! Types for the catalog notifier module.

use serde::{Deserialize, Serialize};

/// A library registered in the media catalog service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Library {
    /// Catalog-assigned library identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Media kind served by this library (e.g. "book", "podcast").
    pub media_type: String,
}
