//! Shared data structures for the inventory
//!
//! These structs represent the data model that flows between
//! the database layer and the UI layer. The `category`, `sub_category`
//! and `location` fields on [`Item`] are free-text snapshots of the
//! reference names taken at save time, not live foreign keys: renaming
//! or deleting a reference row never rewrites existing items.

use serde::{Deserialize, Serialize};

/// A top-level grouping for items (e.g. 食品)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique database ID
    pub id: i64,
    pub name: String,
}

impl Category {
    /// Build a pre-insert draft; the real id is assigned by the store.
    pub fn new(name: impl Into<String>) -> Self {
        Category {
            id: 0,
            name: name.into(),
        }
    }
}

/// A grouping nested under exactly one [`Category`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: i64,
    pub name: String,
    /// Parent category id; checked against the category table at insert time
    pub parent_category_id: i64,
    /// Copy of the parent's name at creation time. Not kept in sync if the
    /// parent is later renamed.
    pub parent_category_name: String,
}

impl SubCategory {
    pub fn new(
        name: impl Into<String>,
        parent_category_id: i64,
        parent_category_name: impl Into<String>,
    ) -> Self {
        SubCategory {
            id: 0,
            name: name.into(),
            parent_category_id,
            parent_category_name: parent_category_name.into(),
        }
    }
}

/// A place an item is physically kept (e.g. 冰箱)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub id: i64,
    pub name: String,
}

impl StorageLocation {
    pub fn new(name: impl Into<String>) -> Self {
        StorageLocation {
            id: 0,
            name: name.into(),
        }
    }
}

/// A tracked inventory record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    /// Unique database ID
    pub id: i64,
    pub name: String,
    /// Category name snapshot, free text
    pub category: String,
    /// Sub-category name snapshot, free text
    pub sub_category: String,
    /// Storage location name snapshot, free text
    pub location: String,
    /// Expiration date as `YYYY-MM-DD`, or empty / `未设置` when unset
    pub valid_date: String,
    pub description: String,
    /// Remaining quantity, free text ("approx. 3" is valid)
    pub quantity: String,
    /// Legacy single image path; newer records use the item_image table
    pub image_path: Option<String>,
}

/// A photo associated with an [`Item`], many per item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemImage {
    pub id: i64,
    pub item_id: i64,
    /// Absolute file-system path, treated as an opaque string
    pub image_path: String,
}
