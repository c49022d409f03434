//! Inventory repository
//!
//! Mediates every read and write against the store and applies the rules
//! the store itself does not enforce: uniqueness of reference names,
//! parent-category existence, the image cascade on item deletion, and the
//! display-time default data when a reference table is still empty.

use crate::error::{InventoryError, Result};

use super::data::{Category, Item, ItemImage, StorageLocation, SubCategory};
use super::defaults;
use super::expiry::{self, ExpiryState};
use super::store::Inventory;

/// Tunable repository behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryOptions {
    /// When set, attaching an image to a nonexistent item is rejected.
    /// Off by default: historical databases contain orphan image rows.
    pub strict_references: bool,
    /// Days ahead within which a listing row is flagged as expiring soon
    pub expiring_soon_window_days: i64,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        RepositoryOptions {
            strict_references: false,
            expiring_soon_window_days: expiry::EXPIRING_SOON_WINDOW_DAYS,
        }
    }
}

/// An item annotated with its expiration classification for listing screens
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedItem {
    pub item: Item,
    /// Whole days until the valid date; `None` when no date is set
    pub days_left: Option<i64>,
    pub state: ExpiryState,
}

/// All inventory reads and writes go through here; the UI layer never
/// touches [`Inventory`] directly.
pub struct Repository {
    store: Inventory,
    options: RepositoryOptions,
}

impl Repository {
    pub fn new(store: Inventory) -> Self {
        Self::with_options(store, RepositoryOptions::default())
    }

    pub fn with_options(store: Inventory, options: RepositoryOptions) -> Self {
        Repository { store, options }
    }

    pub fn options(&self) -> RepositoryOptions {
        self.options
    }

    // ========== Category ==========

    /// Add a category, rejecting blank and duplicate names.
    /// Returns the generated id.
    pub fn add_category(&self, name: &str) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InventoryError::Validation(
                "category name must not be empty".into(),
            ));
        }
        if self.store.category_by_name(name)?.is_some() {
            return Err(InventoryError::Duplicate(format!("category '{name}'")));
        }
        Ok(self.store.insert_category(name)?)
    }

    /// Categories in insertion order; may be empty.
    pub fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.all_categories()?)
    }

    /// Categories, falling back to the built-in defaults when the table is
    /// empty. The defaults are in-memory only and never persisted.
    pub fn categories_or_default(&self) -> Result<Vec<Category>> {
        let categories = self.store.all_categories()?;
        if categories.is_empty() {
            Ok(defaults::default_categories())
        } else {
            Ok(categories)
        }
    }

    pub fn category_by_id(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.store.category_by_id(id)?)
    }

    /// Delete a category and every sub-category under it.
    /// Dependents are removed before the category row itself.
    pub fn delete_category(&self, id: i64) -> Result<()> {
        if self.store.category_by_id(id)?.is_none() {
            return Err(InventoryError::NotFound(format!("category id {id}")));
        }
        self.store.delete_sub_categories_of(id)?;
        self.store.delete_category(id)?;
        Ok(())
    }

    // ========== SubCategory ==========

    /// Add a sub-category under an existing parent.
    ///
    /// The parent's name is copied onto the new row at this moment; later
    /// parent renames do not propagate.
    pub fn add_sub_category(&self, name: &str, parent_category_id: i64) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InventoryError::Validation(
                "sub-category name must not be empty".into(),
            ));
        }

        let parent = self
            .store
            .category_by_id(parent_category_id)?
            .ok_or_else(|| {
                InventoryError::NotFound(format!("parent category id {parent_category_id}"))
            })?;

        if self.store.sub_category_exists(name, parent_category_id)? {
            return Err(InventoryError::Duplicate(format!(
                "sub-category '{name}' under '{}'",
                parent.name
            )));
        }

        let sub = SubCategory::new(name, parent.id, parent.name);
        Ok(self.store.insert_sub_category(&sub)?)
    }

    pub fn sub_categories(&self) -> Result<Vec<SubCategory>> {
        Ok(self.store.all_sub_categories()?)
    }

    /// Sub-categories under one parent, for the linked picker
    pub fn sub_categories_of(&self, parent_category_id: i64) -> Result<Vec<SubCategory>> {
        Ok(self.store.sub_categories_by_parent(parent_category_id)?)
    }

    /// Sub-categories, falling back to defaults attached to the first
    /// category of the (possibly itself defaulted) category list.
    pub fn sub_categories_or_default(&self) -> Result<Vec<SubCategory>> {
        let subs = self.store.all_sub_categories()?;
        if !subs.is_empty() {
            return Ok(subs);
        }

        let categories = self.categories_or_default()?;
        match categories.first() {
            Some(parent) => Ok(defaults::default_sub_categories(parent)),
            None => Ok(Vec::new()),
        }
    }

    pub fn delete_sub_category(&self, id: i64) -> Result<()> {
        if self.store.delete_sub_category(id)? == 0 {
            return Err(InventoryError::NotFound(format!("sub-category id {id}")));
        }
        Ok(())
    }

    // ========== StorageLocation ==========

    /// Add a storage location, rejecting blank and duplicate names.
    pub fn add_storage_location(&self, name: &str) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InventoryError::Validation(
                "location name must not be empty".into(),
            ));
        }
        if self.store.location_by_name(name)?.is_some() {
            return Err(InventoryError::Duplicate(format!("location '{name}'")));
        }
        Ok(self.store.insert_location(name)?)
    }

    pub fn locations(&self) -> Result<Vec<StorageLocation>> {
        Ok(self.store.all_locations()?)
    }

    pub fn locations_or_default(&self) -> Result<Vec<StorageLocation>> {
        let locations = self.store.all_locations()?;
        if locations.is_empty() {
            Ok(defaults::default_locations())
        } else {
            Ok(locations)
        }
    }

    pub fn delete_storage_location(&self, id: i64) -> Result<()> {
        if self.store.delete_location(id)? == 0 {
            return Err(InventoryError::NotFound(format!("location id {id}")));
        }
        Ok(())
    }

    // ========== Filter options ==========

    /// Category names for the query screen, with 全部 prepended
    pub fn category_filter_options(&self) -> Result<Vec<String>> {
        let mut options = vec![defaults::FILTER_ALL.to_string()];
        options.extend(self.categories_or_default()?.into_iter().map(|c| c.name));
        Ok(options)
    }

    /// Location names for the query screen, with 全部 prepended
    pub fn location_filter_options(&self) -> Result<Vec<String>> {
        let mut options = vec![defaults::FILTER_ALL.to_string()];
        options.extend(self.locations_or_default()?.into_iter().map(|l| l.name));
        Ok(options)
    }

    // ========== Item ==========

    /// Add an item. The name is required; everything else may be blank.
    /// Returns the generated id.
    pub fn add_item(&self, item: &Item) -> Result<i64> {
        if item.name.trim().is_empty() {
            return Err(InventoryError::Validation(
                "item name must not be empty".into(),
            ));
        }
        Ok(self.store.insert_item(item)?)
    }

    /// Add an item and attach its images in one call.
    ///
    /// Two-phase by construction: the images are keyed by the id the insert
    /// actually returned, never by a provisional placeholder, so they can
    /// only be written after the item row exists.
    pub fn add_item_with_images(&self, item: &Item, image_paths: &[String]) -> Result<i64> {
        let item_id = self.add_item(item)?;
        if !image_paths.is_empty() {
            self.store.insert_item_images(item_id, image_paths)?;
        }
        Ok(item_id)
    }

    /// Overwrite all fields of an existing item
    pub fn update_item(&self, item: &Item) -> Result<()> {
        if item.name.trim().is_empty() {
            return Err(InventoryError::Validation(
                "item name must not be empty".into(),
            ));
        }
        if self.store.update_item(item)? == 0 {
            return Err(InventoryError::NotFound(format!("item id {}", item.id)));
        }
        Ok(())
    }

    /// Delete an item together with every image row that references it.
    /// The image cascade is mandatory: the store has no FK to do it for us.
    pub fn delete_item(&self, id: i64) -> Result<()> {
        if self.store.item_by_id(id)?.is_none() {
            return Err(InventoryError::NotFound(format!("item id {id}")));
        }
        self.store.delete_images_for_item(id)?;
        self.store.delete_item(id)?;
        Ok(())
    }

    pub fn item_by_id(&self, id: i64) -> Result<Option<Item>> {
        Ok(self.store.item_by_id(id)?)
    }

    /// All items, newest first
    pub fn query_all_items(&self) -> Result<Vec<Item>> {
        Ok(self.store.all_items()?)
    }

    /// Filtered item listing, newest first.
    ///
    /// `name_filter` empty matches all names, otherwise case-sensitive
    /// substring; 全部 disables the category / location equality filters.
    pub fn query_items(
        &self,
        name_filter: &str,
        category_filter: &str,
        location_filter: &str,
    ) -> Result<Vec<Item>> {
        Ok(self
            .store
            .items_by_filter(name_filter, category_filter, location_filter)?)
    }

    /// Same rows as [`query_items`](Self::query_items), each annotated with
    /// its expiration classification for the listing screen.
    pub fn query_items_classified(
        &self,
        name_filter: &str,
        category_filter: &str,
        location_filter: &str,
    ) -> Result<Vec<ClassifiedItem>> {
        let items = self.query_items(name_filter, category_filter, location_filter)?;
        let window = self.options.expiring_soon_window_days;
        Ok(items
            .into_iter()
            .map(|item| {
                let days_left = expiry::day_interval(&item.valid_date);
                let state = expiry::classify_within(&item.valid_date, window);
                ClassifiedItem {
                    item,
                    days_left,
                    state,
                }
            })
            .collect())
    }

    /// Row counts for the settings screen summary
    pub fn category_count(&self) -> Result<i64> {
        Ok(self.store.category_count()?)
    }

    pub fn sub_category_count_of(&self, parent_category_id: i64) -> Result<i64> {
        Ok(self.store.sub_category_count_by_parent(parent_category_id)?)
    }

    pub fn location_count(&self) -> Result<i64> {
        Ok(self.store.location_count()?)
    }

    pub fn item_count(&self) -> Result<i64> {
        Ok(self.store.item_count()?)
    }

    // ========== ItemImage ==========

    /// Attach one image path to an item.
    ///
    /// Lenient by default (an orphan row is accepted); with
    /// `strict_references` the item must exist.
    pub fn add_item_image(&self, item_id: i64, path: &str) -> Result<i64> {
        self.check_item_reference(item_id)?;
        Ok(self.store.insert_item_image(item_id, path)?)
    }

    /// Attach a batch of image paths to an item
    pub fn add_item_images(&self, item_id: i64, paths: &[String]) -> Result<usize> {
        self.check_item_reference(item_id)?;
        Ok(self.store.insert_item_images(item_id, paths)?)
    }

    /// Image paths for one item, in insertion order
    pub fn image_paths(&self, item_id: i64) -> Result<Vec<String>> {
        Ok(self.store.image_paths_for_item(item_id)?)
    }

    /// Full image rows for one item, for callers that need the row ids
    pub fn item_images(&self, item_id: i64) -> Result<Vec<ItemImage>> {
        Ok(self.store.images_for_item(item_id)?)
    }

    fn check_item_reference(&self, item_id: i64) -> Result<()> {
        if self.options.strict_references && self.store.item_by_id(item_id)?.is_none() {
            return Err(InventoryError::NotFound(format!("item id {item_id}")));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("store", &self.store)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> Repository {
        Repository::new(Inventory::open_in_memory().unwrap())
    }

    fn strict_repo() -> Repository {
        Repository::with_options(
            Inventory::open_in_memory().unwrap(),
            RepositoryOptions {
                strict_references: true,
                ..RepositoryOptions::default()
            },
        )
    }

    fn item_named(name: &str) -> Item {
        Item {
            name: name.to_string(),
            ..Item::default()
        }
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let repo = repo();
        repo.add_category("食品").unwrap();

        let err = repo.add_category("食品").unwrap_err();
        assert!(matches!(err, InventoryError::Duplicate(_)));
        assert!(err.is_caller_error());

        // Case differs: exact match only, so this one goes through
        repo.add_category("Food").unwrap();
        repo.add_category("food").unwrap();
    }

    #[test]
    fn test_blank_names_rejected() {
        let repo = repo();
        assert!(matches!(
            repo.add_category("   "),
            Err(InventoryError::Validation(_))
        ));
        assert!(matches!(
            repo.add_storage_location(""),
            Err(InventoryError::Validation(_))
        ));
        assert!(matches!(
            repo.add_item(&item_named("")),
            Err(InventoryError::Validation(_))
        ));
    }

    #[test]
    fn test_sub_category_requires_existing_parent() {
        let repo = repo();
        let err = repo.add_sub_category("零食", 12345).unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }

    #[test]
    fn test_sub_category_unique_within_parent_only() {
        let repo = repo();
        let food = repo.add_category("食品").unwrap();
        let daily = repo.add_category("日用品").unwrap();

        repo.add_sub_category("其他", food).unwrap();

        // Same name under the same parent: rejected
        assert!(matches!(
            repo.add_sub_category("其他", food),
            Err(InventoryError::Duplicate(_))
        ));

        // Same name under another parent: fine
        repo.add_sub_category("其他", daily).unwrap();
    }

    #[test]
    fn test_sub_category_snapshots_parent_name() {
        let repo = repo();
        let food = repo.add_category("食品").unwrap();
        repo.add_sub_category("零食", food).unwrap();

        let subs = repo.sub_categories_of(food).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].parent_category_name, "食品");
        assert_eq!(subs[0].parent_category_id, food);
    }

    #[test]
    fn test_delete_category_cascades_to_sub_categories() {
        let repo = repo();
        let food = repo.add_category("食品").unwrap();
        let daily = repo.add_category("日用品").unwrap();
        repo.add_sub_category("零食", food).unwrap();
        repo.add_sub_category("生鲜", food).unwrap();
        repo.add_sub_category("清洁用品", daily).unwrap();

        repo.delete_category(food).unwrap();

        let remaining = repo.sub_categories().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "清洁用品");

        // Gone means gone
        assert!(matches!(
            repo.delete_category(food),
            Err(InventoryError::NotFound(_))
        ));
    }

    #[test]
    fn test_item_round_trip() {
        let repo = repo();
        let draft = Item {
            id: 0,
            name: "鲜牛奶".to_string(),
            category: "食品".to_string(),
            sub_category: "生鲜".to_string(),
            location: "冰箱".to_string(),
            valid_date: "2030-01-31".to_string(),
            description: "两盒装".to_string(),
            quantity: "approx. 3".to_string(),
            image_path: Some("/photos/milk.jpg".to_string()),
        };

        let id = repo.add_item(&draft).unwrap();
        let fetched = repo.item_by_id(id).unwrap().unwrap();

        assert_eq!(fetched.id, id);
        let mut expected = draft.clone();
        expected.id = id;
        assert_eq!(fetched, expected);
    }

    #[test]
    fn test_query_items_filters_and_order() {
        let repo = repo();
        let mut milk = item_named("whole milk");
        milk.category = "食品".to_string();
        milk.location = "冰箱".to_string();
        let mut soap = item_named("soap");
        soap.category = "日用品".to_string();
        soap.location = "卫生间".to_string();
        let mut oat_milk = item_named("oat milk");
        oat_milk.category = "食品".to_string();
        oat_milk.location = "厨房橱柜".to_string();

        repo.add_item(&milk).unwrap();
        repo.add_item(&soap).unwrap();
        repo.add_item(&oat_milk).unwrap();

        // Unfiltered: everything, newest first
        let all = repo.query_items("", "全部", "全部").unwrap();
        let names: Vec<&str> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["oat milk", "soap", "whole milk"]);

        // Name substring
        let milky = repo.query_items("milk", "全部", "全部").unwrap();
        assert_eq!(milky.len(), 2);

        // Category equality combined with location equality
        let fridge_food = repo.query_items("", "食品", "冰箱").unwrap();
        assert_eq!(fridge_food.len(), 1);
        assert_eq!(fridge_food[0].name, "whole milk");
    }

    #[test]
    fn test_classified_listing_annotates_rows() {
        let repo = repo();
        let mut expired = item_named("old yogurt");
        expired.valid_date = "2000-01-01".to_string();
        let mut dateless = item_named("scissors");
        dateless.valid_date = "未设置".to_string();

        repo.add_item(&expired).unwrap();
        repo.add_item(&dateless).unwrap();

        let rows = repo.query_items_classified("", "全部", "全部").unwrap();
        assert_eq!(rows.len(), 2);

        // Newest first: scissors, then yogurt
        assert_eq!(rows[0].state, ExpiryState::NoDate);
        assert_eq!(rows[0].days_left, None);
        assert_eq!(rows[1].state, ExpiryState::Expired);
        assert!(rows[1].days_left.unwrap() < 0);
    }

    #[test]
    fn test_update_item_requires_existing_row() {
        let repo = repo();
        let mut ghost = item_named("ghost");
        ghost.id = 4242;
        assert!(matches!(
            repo.update_item(&ghost),
            Err(InventoryError::NotFound(_))
        ));

        let id = repo.add_item(&item_named("rice")).unwrap();
        let mut stored = repo.item_by_id(id).unwrap().unwrap();
        stored.quantity = "half a bag".to_string();
        repo.update_item(&stored).unwrap();

        assert_eq!(
            repo.item_by_id(id).unwrap().unwrap().quantity,
            "half a bag"
        );
    }

    #[test]
    fn test_delete_item_cascades_to_images() {
        let repo = repo();
        let id = repo
            .add_item_with_images(
                &item_named("camera"),
                &["/p/1.jpg".to_string(), "/p/2.jpg".to_string()],
            )
            .unwrap();
        assert_eq!(repo.image_paths(id).unwrap().len(), 2);

        repo.delete_item(id).unwrap();

        assert!(repo.item_by_id(id).unwrap().is_none());
        assert!(repo.image_paths(id).unwrap().is_empty());
    }

    #[test]
    fn test_image_attachment_leniency_and_strict_mode() {
        // Default: an orphan image row is accepted
        let lenient = repo();
        lenient.add_item_image(9999, "/orphan.jpg").unwrap();
        assert_eq!(lenient.image_paths(9999).unwrap(), vec!["/orphan.jpg"]);

        // Strict: the item must exist
        let strict = strict_repo();
        assert!(strict.options().strict_references);
        assert!(matches!(
            strict.add_item_image(9999, "/orphan.jpg"),
            Err(InventoryError::NotFound(_))
        ));
        let id = strict.add_item(&item_named("lamp")).unwrap();
        strict.add_item_image(id, "/lamp.jpg").unwrap();
    }

    #[test]
    fn test_defaults_shown_only_while_table_empty() {
        let repo = repo();

        let categories = repo.categories_or_default().unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["食品", "日用品", "家电", "服饰", "其他"]);

        // Nothing was written back
        assert_eq!(repo.categories().unwrap().len(), 0);

        // One real row replaces the whole default list
        repo.add_category("自定义").unwrap();
        let categories = repo.categories_or_default().unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "自定义");
    }

    #[test]
    fn test_default_sub_categories_attach_to_first_category() {
        let repo = repo();

        // Entirely empty tables: synthetic parent from the default list
        let subs = repo.sub_categories_or_default().unwrap();
        assert_eq!(subs.len(), 6);
        assert!(subs.iter().all(|s| s.parent_category_name == "食品"));

        // Real categories but no sub-categories: defaults follow the first real row
        let first = repo.add_category("厨房用品").unwrap();
        let subs = repo.sub_categories_or_default().unwrap();
        assert!(subs.iter().all(|s| s.parent_category_id == first));
        assert!(subs.iter().all(|s| s.parent_category_name == "厨房用品"));
    }

    #[test]
    fn test_filter_options_prepend_all_sentinel() {
        let repo = repo();
        let options = repo.location_filter_options().unwrap();
        assert_eq!(options[0], "全部");
        assert_eq!(options.len(), 1 + 7);

        repo.add_storage_location("车库").unwrap();
        let options = repo.location_filter_options().unwrap();
        assert_eq!(options, vec!["全部", "车库"]);
    }

    #[test]
    fn test_counts_and_image_rows() {
        let repo = repo();
        assert_eq!(repo.item_count().unwrap(), 0);

        let food = repo.add_category("食品").unwrap();
        repo.add_sub_category("零食", food).unwrap();
        repo.add_sub_category("生鲜", food).unwrap();
        repo.add_storage_location("冰箱").unwrap();

        assert_eq!(repo.category_count().unwrap(), 1);
        assert_eq!(repo.sub_category_count_of(food).unwrap(), 2);
        assert_eq!(repo.location_count().unwrap(), 1);

        let id = repo
            .add_item_with_images(&item_named("tea"), &["/t.jpg".to_string()])
            .unwrap();
        assert_eq!(repo.item_count().unwrap(), 1);

        let images = repo.item_images(id).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].item_id, id);
        assert_eq!(images[0].image_path, "/t.jpg");
        assert!(images[0].id > 0);
    }

    #[test]
    fn test_delete_reference_rows() {
        let repo = repo();
        let id = repo.add_storage_location("阳台").unwrap();
        repo.delete_storage_location(id).unwrap();
        assert!(matches!(
            repo.delete_storage_location(id),
            Err(InventoryError::NotFound(_))
        ));

        let food = repo.add_category("食品").unwrap();
        let sub = repo.add_sub_category("零食", food).unwrap();
        repo.delete_sub_category(sub).unwrap();
        assert!(matches!(
            repo.delete_sub_category(sub),
            Err(InventoryError::NotFound(_))
        ));
    }
}
