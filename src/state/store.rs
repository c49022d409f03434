use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult, Row};
use std::path::{Path, PathBuf};

use super::data::{Category, Item, ItemImage, StorageLocation, SubCategory};

/// Column list shared by every item SELECT so row mapping stays in one place
const ITEM_COLUMNS: &str =
    "id, item_name, category, sub_category, location, valid_date, description, item_count, image_path";

/// The Inventory store manages the SQLite database.
///
/// It owns the five tables (category, sub_category, storage_location, item,
/// item_image) and exposes one method per statement. The schema carries no
/// UNIQUE or FOREIGN KEY constraints; uniqueness and referential rules
/// belong to the repository layered on top.
pub struct Inventory {
    conn: Connection,
    db_path: PathBuf,
}

impl Inventory {
    /// Create a store at the default per-user location and initialize the schema.
    ///
    /// The database file lives in the user's data directory:
    /// - Linux: ~/.local/share/home-inventory/inventory.db
    /// - macOS: ~/Library/Application Support/home-inventory/inventory.db
    /// - Windows: %APPDATA%\home-inventory\inventory.db
    pub fn new() -> SqlResult<Self> {
        Self::open(Self::default_db_path())
    }

    /// Open (or create) a store at an explicit path.
    pub fn open(db_path: PathBuf) -> SqlResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .expect("Failed to create application data directory");
        }

        let conn = Connection::open(&db_path)?;

        println!("📁 Inventory database at: {}", db_path.display());

        let store = Inventory { conn, db_path };
        store.init_schema()?;

        Ok(store)
    }

    /// In-memory store, used by tests and throwaway sessions.
    pub fn open_in_memory() -> SqlResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Inventory {
            conn,
            db_path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Default database location under the platform data directory
    pub fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .expect("Could not determine user data directory");

        path.push("home-inventory");
        path.push("inventory.db");
        path
    }

    /// Initialize the database schema.
    /// Creates all tables and indexes if they don't exist.
    fn init_schema(&self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS category (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                category_name   TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS sub_category (
                id                   INTEGER PRIMARY KEY AUTOINCREMENT,
                sub_category_name    TEXT NOT NULL,
                parent_category_id   INTEGER NOT NULL,
                parent_category_name TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS storage_location (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                location_name   TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS item (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                item_name       TEXT NOT NULL,
                category        TEXT NOT NULL DEFAULT '',
                sub_category    TEXT NOT NULL DEFAULT '',
                location        TEXT NOT NULL DEFAULT '',
                valid_date      TEXT NOT NULL DEFAULT '',
                description     TEXT NOT NULL DEFAULT '',
                item_count      TEXT NOT NULL DEFAULT '',
                image_path      TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS item_image (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                item_id         INTEGER NOT NULL,
                image_path      TEXT NOT NULL
            )",
            [],
        )?;

        // Indexes for the hot lookups
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_item_image_item_id
             ON item_image(item_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sub_category_parent
             ON sub_category(parent_category_id)",
            [],
        )?;

        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    // ========== Category ==========

    /// Insert a category, returning the generated id
    pub fn insert_category(&self, name: &str) -> SqlResult<i64> {
        self.conn.execute(
            "INSERT INTO category (category_name) VALUES (?1)",
            params![name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All categories in insertion order
    pub fn all_categories(&self) -> SqlResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, category_name FROM category ORDER BY id ASC")?;

        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut categories = Vec::new();
        for category in rows {
            categories.push(category?);
        }
        Ok(categories)
    }

    pub fn category_by_id(&self, id: i64) -> SqlResult<Option<Category>> {
        self.conn
            .query_row(
                "SELECT id, category_name FROM category WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
    }

    pub fn category_by_name(&self, name: &str) -> SqlResult<Option<Category>> {
        self.conn
            .query_row(
                "SELECT id, category_name FROM category WHERE category_name = ?1",
                params![name],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
    }

    /// Delete a category row, returning the number of rows removed
    pub fn delete_category(&self, id: i64) -> SqlResult<usize> {
        self.conn
            .execute("DELETE FROM category WHERE id = ?1", params![id])
    }

    pub fn category_count(&self) -> SqlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))
    }

    // ========== SubCategory ==========

    /// Insert a sub-category, returning the generated id
    pub fn insert_sub_category(&self, sub: &SubCategory) -> SqlResult<i64> {
        self.conn.execute(
            "INSERT INTO sub_category (sub_category_name, parent_category_id, parent_category_name)
             VALUES (?1, ?2, ?3)",
            params![sub.name, sub.parent_category_id, sub.parent_category_name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All sub-categories in insertion order
    pub fn all_sub_categories(&self) -> SqlResult<Vec<SubCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, sub_category_name, parent_category_id, parent_category_name
             FROM sub_category ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], Self::map_sub_category)?;

        let mut subs = Vec::new();
        for sub in rows {
            subs.push(sub?);
        }
        Ok(subs)
    }

    /// Sub-categories under one parent, in insertion order
    pub fn sub_categories_by_parent(&self, parent_id: i64) -> SqlResult<Vec<SubCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, sub_category_name, parent_category_id, parent_category_name
             FROM sub_category WHERE parent_category_id = ?1 ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![parent_id], Self::map_sub_category)?;

        let mut subs = Vec::new();
        for sub in rows {
            subs.push(sub?);
        }
        Ok(subs)
    }

    /// True when a sub-category with this name already exists under the parent
    pub fn sub_category_exists(&self, name: &str, parent_id: i64) -> SqlResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sub_category
             WHERE sub_category_name = ?1 AND parent_category_id = ?2",
            params![name, parent_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn delete_sub_category(&self, id: i64) -> SqlResult<usize> {
        self.conn
            .execute("DELETE FROM sub_category WHERE id = ?1", params![id])
    }

    /// Remove every sub-category under `parent_id`, returning how many went
    pub fn delete_sub_categories_of(&self, parent_id: i64) -> SqlResult<usize> {
        self.conn.execute(
            "DELETE FROM sub_category WHERE parent_category_id = ?1",
            params![parent_id],
        )
    }

    pub fn sub_category_count_by_parent(&self, parent_id: i64) -> SqlResult<i64> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM sub_category WHERE parent_category_id = ?1",
            params![parent_id],
            |row| row.get(0),
        )
    }

    fn map_sub_category(row: &Row) -> SqlResult<SubCategory> {
        Ok(SubCategory {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_category_id: row.get(2)?,
            parent_category_name: row.get(3)?,
        })
    }

    // ========== StorageLocation ==========

    /// Insert a storage location, returning the generated id
    pub fn insert_location(&self, name: &str) -> SqlResult<i64> {
        self.conn.execute(
            "INSERT INTO storage_location (location_name) VALUES (?1)",
            params![name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All storage locations in insertion order
    pub fn all_locations(&self) -> SqlResult<Vec<StorageLocation>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, location_name FROM storage_location ORDER BY id ASC")?;

        let rows = stmt.query_map([], |row| {
            Ok(StorageLocation {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut locations = Vec::new();
        for location in rows {
            locations.push(location?);
        }
        Ok(locations)
    }

    pub fn location_by_name(&self, name: &str) -> SqlResult<Option<StorageLocation>> {
        self.conn
            .query_row(
                "SELECT id, location_name FROM storage_location WHERE location_name = ?1",
                params![name],
                |row| {
                    Ok(StorageLocation {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
    }

    pub fn delete_location(&self, id: i64) -> SqlResult<usize> {
        self.conn
            .execute("DELETE FROM storage_location WHERE id = ?1", params![id])
    }

    pub fn location_count(&self) -> SqlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM storage_location", [], |row| {
                row.get(0)
            })
    }

    // ========== Item ==========

    /// Insert an item, returning the generated id
    pub fn insert_item(&self, item: &Item) -> SqlResult<i64> {
        self.conn.execute(
            "INSERT INTO item (item_name, category, sub_category, location,
                               valid_date, description, item_count, image_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                item.name,
                item.category,
                item.sub_category,
                item.location,
                item.valid_date,
                item.description,
                item.quantity,
                item.image_path,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All items, newest first
    pub fn all_items(&self) -> SqlResult<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ITEM_COLUMNS} FROM item ORDER BY id DESC"))?;

        let rows = stmt.query_map([], Self::map_item)?;

        let mut items = Vec::new();
        for item in rows {
            items.push(item?);
        }
        Ok(items)
    }

    /// Filtered item query, newest first.
    ///
    /// An empty `name_key` matches every name; otherwise the match is a
    /// case-sensitive substring (instr, not LIKE; LIKE folds ASCII case).
    /// The 全部 sentinel bypasses the category / location equality checks.
    pub fn items_by_filter(
        &self,
        name_key: &str,
        category: &str,
        location: &str,
    ) -> SqlResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM item
             WHERE (?1 = '' OR instr(item_name, ?1) > 0)
               AND (?2 = '全部' OR category = ?2)
               AND (?3 = '全部' OR location = ?3)
             ORDER BY id DESC"
        ))?;

        let rows = stmt.query_map(params![name_key, category, location], Self::map_item)?;

        let mut items = Vec::new();
        for item in rows {
            items.push(item?);
        }
        Ok(items)
    }

    pub fn item_by_id(&self, id: i64) -> SqlResult<Option<Item>> {
        self.conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM item WHERE id = ?1"),
                params![id],
                Self::map_item,
            )
            .optional()
    }

    /// Overwrite every mutable field of an existing item.
    /// Returns the number of rows touched (0 when the id is absent).
    pub fn update_item(&self, item: &Item) -> SqlResult<usize> {
        self.conn.execute(
            "UPDATE item SET item_name = ?1, category = ?2, sub_category = ?3,
                             location = ?4, valid_date = ?5, description = ?6,
                             item_count = ?7, image_path = ?8
             WHERE id = ?9",
            params![
                item.name,
                item.category,
                item.sub_category,
                item.location,
                item.valid_date,
                item.description,
                item.quantity,
                item.image_path,
                item.id,
            ],
        )
    }

    pub fn delete_item(&self, id: i64) -> SqlResult<usize> {
        self.conn
            .execute("DELETE FROM item WHERE id = ?1", params![id])
    }

    pub fn item_count(&self) -> SqlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM item", [], |row| row.get(0))
    }

    fn map_item(row: &Row) -> SqlResult<Item> {
        Ok(Item {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            sub_category: row.get(3)?,
            location: row.get(4)?,
            valid_date: row.get(5)?,
            description: row.get(6)?,
            quantity: row.get(7)?,
            image_path: row.get(8)?,
        })
    }

    // ========== ItemImage ==========

    /// Insert one image row, returning the generated id
    pub fn insert_item_image(&self, item_id: i64, path: &str) -> SqlResult<i64> {
        self.conn.execute(
            "INSERT INTO item_image (item_id, image_path) VALUES (?1, ?2)",
            params![item_id, path],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a batch of image rows for one item.
    /// Each row is an independent single-row insert; the count of inserted
    /// rows is returned.
    pub fn insert_item_images(&self, item_id: i64, paths: &[String]) -> SqlResult<usize> {
        let mut stmt = self
            .conn
            .prepare("INSERT INTO item_image (item_id, image_path) VALUES (?1, ?2)")?;

        let mut inserted = 0;
        for path in paths {
            stmt.execute(params![item_id, path])?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Full image rows for one item, in insertion order
    pub fn images_for_item(&self, item_id: i64) -> SqlResult<Vec<ItemImage>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, image_path FROM item_image
             WHERE item_id = ?1 ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![item_id], |row| {
            Ok(ItemImage {
                id: row.get(0)?,
                item_id: row.get(1)?,
                image_path: row.get(2)?,
            })
        })?;

        let mut images = Vec::new();
        for image in rows {
            images.push(image?);
        }
        Ok(images)
    }

    /// Image paths for one item, in insertion order
    pub fn image_paths_for_item(&self, item_id: i64) -> SqlResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT image_path FROM item_image WHERE item_id = ?1 ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![item_id], |row| row.get(0))?;

        let mut paths = Vec::new();
        for path in rows {
            paths.push(path?);
        }
        Ok(paths)
    }

    /// Remove every image row belonging to `item_id`
    pub fn delete_images_for_item(&self, item_id: i64) -> SqlResult<usize> {
        self.conn.execute(
            "DELETE FROM item_image WHERE item_id = ?1",
            params![item_id],
        )
    }
}

impl std::fmt::Debug for Inventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inventory")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Inventory {
        Inventory::open_in_memory().unwrap()
    }

    #[test]
    fn test_in_memory_store_has_sentinel_path() {
        assert_eq!(store().path(), Path::new(":memory:"));
    }

    #[test]
    fn test_reference_tables_keep_insertion_order() {
        let store = store();
        store.insert_category("食品").unwrap();
        store.insert_category("日用品").unwrap();
        store.insert_category("其他").unwrap();

        let names: Vec<String> = store
            .all_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["食品", "日用品", "其他"]);
        assert_eq!(store.category_count().unwrap(), 3);
    }

    #[test]
    fn test_items_come_back_newest_first() {
        let store = store();
        for name in ["A", "B", "C"] {
            let item = Item {
                name: name.to_string(),
                ..Item::default()
            };
            store.insert_item(&item).unwrap();
        }

        let names: Vec<String> = store
            .all_items()
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_name_filter_is_case_sensitive_substring() {
        let store = store();
        for name in ["whole milk", "Milk powder", "butter"] {
            let item = Item {
                name: name.to_string(),
                ..Item::default()
            };
            store.insert_item(&item).unwrap();
        }

        let hits = store.items_by_filter("milk", "全部", "全部").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "whole milk");

        // Empty name key matches everything
        assert_eq!(store.items_by_filter("", "全部", "全部").unwrap().len(), 3);
    }

    #[test]
    fn test_image_paths_keep_insertion_order() {
        let store = store();
        store
            .insert_item_images(
                7,
                &["/a.jpg".to_string(), "/b.jpg".to_string(), "/c.jpg".to_string()],
            )
            .unwrap();

        let paths = store.image_paths_for_item(7).unwrap();
        assert_eq!(paths, vec!["/a.jpg", "/b.jpg", "/c.jpg"]);

        assert_eq!(store.delete_images_for_item(7).unwrap(), 3);
        assert!(store.image_paths_for_item(7).unwrap().is_empty());
    }

    #[test]
    fn test_update_touches_zero_rows_for_missing_id() {
        let store = store();
        let ghost = Item {
            id: 999,
            name: "ghost".to_string(),
            ..Item::default()
        };
        assert_eq!(store.update_item(&ghost).unwrap(), 0);
    }
}
