//! Built-in fallback reference data
//!
//! When a reference table is still empty the UI needs something to show in
//! its pickers, so the repository substitutes these fixed lists in memory.
//! They are display-time fallbacks only: nothing here is ever written to
//! storage unless the user explicitly adds an entry.

use super::data::{Category, StorageLocation, SubCategory};

/// Sentinel filter value meaning "do not filter on this field"
pub const FILTER_ALL: &str = "全部";

/// Fallback category names, in display order
pub const DEFAULT_CATEGORIES: [&str; 5] = ["食品", "日用品", "家电", "服饰", "其他"];

/// Fallback sub-category names, attached to the first category
pub const DEFAULT_SUB_CATEGORIES: [&str; 6] =
    ["零食", "生鲜", "调味品", "清洁用品", "洗漱用品", "其他"];

/// Fallback storage location names
pub const DEFAULT_LOCATIONS: [&str; 7] =
    ["冰箱", "厨房橱柜", "卫生间", "卧室衣柜", "客厅书架", "阳台", "其他"];

/// In-memory default categories (synthetic id 0, never persisted)
pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES.into_iter().map(Category::new).collect()
}

/// In-memory default sub-categories, all hanging off `parent`
pub fn default_sub_categories(parent: &Category) -> Vec<SubCategory> {
    DEFAULT_SUB_CATEGORIES
        .iter()
        .map(|name| SubCategory::new(*name, parent.id, parent.name.clone()))
        .collect()
}

/// In-memory default storage locations
pub fn default_locations() -> Vec<StorageLocation> {
    DEFAULT_LOCATIONS
        .into_iter()
        .map(StorageLocation::new)
        .collect()
}
