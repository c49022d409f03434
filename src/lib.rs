//! Household inventory core
//!
//! A local, single-process inventory tracker: items with
//! category / sub-category / location metadata, expiration dates,
//! quantities and photos, backed by a SQLite catalog.
//!
//! The UI layer talks to two surfaces only:
//! - [`Repository`] for synchronous, same-thread access (tests, tools)
//! - [`InventoryHandle`] to run the same operations on a background
//!   writer thread without ever blocking the UI
//!
//! ```no_run
//! use home_inventory::{Inventory, Item, Repository};
//!
//! let repo = Repository::new(Inventory::new()?);
//! let mut milk = Item::default();
//! milk.name = "鲜牛奶".to_string();
//! milk.valid_date = "2026-09-01".to_string();
//! let id = repo.add_item(&milk)?;
//! let listing = repo.query_items_classified("", "全部", "全部")?;
//! # let _ = (id, listing);
//! # Ok::<(), home_inventory::InventoryError>(())
//! ```

pub mod config;
pub mod error;
pub mod state;
pub mod tasks;

pub use config::AppConfig;
pub use error::{InventoryError, Result};
pub use state::data::{Category, Item, ItemImage, StorageLocation, SubCategory};
pub use state::defaults::{
    DEFAULT_CATEGORIES, DEFAULT_LOCATIONS, DEFAULT_SUB_CATEGORIES, FILTER_ALL,
};
pub use state::expiry::{
    classify, day_interval, is_expired, is_expiring_soon, ExpiryState, DATE_UNSET,
    EXPIRING_SOON_WINDOW_DAYS,
};
pub use state::repository::{ClassifiedItem, Repository, RepositoryOptions};
pub use state::store::Inventory;
pub use tasks::InventoryHandle;
