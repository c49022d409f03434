//! Background database worker
//!
//! The UI thread must never block on storage I/O, and no two writes may
//! race on the same table. Both rules fall out of the same shape: one
//! dedicated thread owns the [`Repository`], every operation is a closure
//! sent down a channel, and each result travels back over a oneshot that
//! delivers exactly once. A caller that has gone away simply drops its
//! receiving end and the result is discarded, never delivered late.

use std::sync::mpsc;
use std::sync::OnceLock;
use std::thread;

use tokio::sync::oneshot;

use crate::config::AppConfig;
use crate::error::{InventoryError, Result};
use crate::state::data::{Category, Item, ItemImage, StorageLocation, SubCategory};
use crate::state::repository::{ClassifiedItem, Repository};
use crate::state::store::Inventory;

/// A unit of work executed on the writer thread
type Job = Box<dyn FnOnce(&Repository) + Send>;

/// Cheap-to-clone handle to the single writer thread.
///
/// All methods are async: they enqueue the operation and resolve when the
/// writer has executed it. Operations run to completion in submission
/// order; there is no cancellation beyond dropping the future.
#[derive(Clone)]
pub struct InventoryHandle {
    tx: mpsc::Sender<Job>,
}

impl InventoryHandle {
    /// Spawn a writer thread owning `repository` and return its handle.
    /// The thread drains jobs until the last handle is dropped.
    pub fn spawn(repository: Repository) -> Self {
        let (tx, rx) = mpsc::channel::<Job>();

        thread::Builder::new()
            .name("inventory-db".to_string())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    job(&repository);
                }
            })
            .expect("Failed to spawn inventory worker thread");

        InventoryHandle { tx }
    }

    /// Process-wide handle over the default store, created on first use.
    ///
    /// Configuration is read once here; the handle lives until process
    /// exit. If the database cannot be opened at all the process panics:
    /// the application cannot function without its database.
    pub fn global() -> &'static InventoryHandle {
        static GLOBAL: OnceLock<InventoryHandle> = OnceLock::new();

        GLOBAL.get_or_init(|| {
            let config = AppConfig::load();
            let store = match &config.db_path {
                Some(path) => Inventory::open(path.clone()),
                None => Inventory::new(),
            }
            .expect("Failed to initialize database. Check permissions and disk space.");

            InventoryHandle::spawn(Repository::with_options(
                store,
                config.repository_options(),
            ))
        })
    }

    /// Run an arbitrary repository operation on the writer thread
    pub async fn run<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&Repository) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let job: Job = Box::new(move |repository| {
            // The send fails only when the caller is gone; the result is dropped
            let _ = reply_tx.send(job(repository));
        });

        self.tx.send(job).map_err(|_| InventoryError::Shutdown)?;
        reply_rx.await.map_err(|_| InventoryError::Shutdown)?
    }

    // ========== Category ==========

    pub async fn add_category(&self, name: String) -> Result<i64> {
        self.run(move |repo| repo.add_category(&name)).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.run(|repo| repo.categories()).await
    }

    pub async fn categories_or_default(&self) -> Result<Vec<Category>> {
        self.run(|repo| repo.categories_or_default()).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.run(move |repo| repo.delete_category(id)).await
    }

    // ========== SubCategory ==========

    pub async fn add_sub_category(&self, name: String, parent_category_id: i64) -> Result<i64> {
        self.run(move |repo| repo.add_sub_category(&name, parent_category_id))
            .await
    }

    pub async fn sub_categories(&self) -> Result<Vec<SubCategory>> {
        self.run(|repo| repo.sub_categories()).await
    }

    pub async fn sub_categories_of(&self, parent_category_id: i64) -> Result<Vec<SubCategory>> {
        self.run(move |repo| repo.sub_categories_of(parent_category_id))
            .await
    }

    pub async fn sub_categories_or_default(&self) -> Result<Vec<SubCategory>> {
        self.run(|repo| repo.sub_categories_or_default()).await
    }

    pub async fn delete_sub_category(&self, id: i64) -> Result<()> {
        self.run(move |repo| repo.delete_sub_category(id)).await
    }

    // ========== StorageLocation ==========

    pub async fn add_storage_location(&self, name: String) -> Result<i64> {
        self.run(move |repo| repo.add_storage_location(&name)).await
    }

    pub async fn locations(&self) -> Result<Vec<StorageLocation>> {
        self.run(|repo| repo.locations()).await
    }

    pub async fn locations_or_default(&self) -> Result<Vec<StorageLocation>> {
        self.run(|repo| repo.locations_or_default()).await
    }

    pub async fn delete_storage_location(&self, id: i64) -> Result<()> {
        self.run(move |repo| repo.delete_storage_location(id)).await
    }

    // ========== Filter options ==========

    pub async fn category_filter_options(&self) -> Result<Vec<String>> {
        self.run(|repo| repo.category_filter_options()).await
    }

    pub async fn location_filter_options(&self) -> Result<Vec<String>> {
        self.run(|repo| repo.location_filter_options()).await
    }

    // ========== Item ==========

    pub async fn add_item(&self, item: Item) -> Result<i64> {
        self.run(move |repo| repo.add_item(&item)).await
    }

    /// Two-phase save: the item row first, then its images keyed by the
    /// generated id. Both run in the same enqueued job, so no other write
    /// lands between them.
    pub async fn add_item_with_images(&self, item: Item, image_paths: Vec<String>) -> Result<i64> {
        self.run(move |repo| repo.add_item_with_images(&item, &image_paths))
            .await
    }

    pub async fn update_item(&self, item: Item) -> Result<()> {
        self.run(move |repo| repo.update_item(&item)).await
    }

    pub async fn delete_item(&self, id: i64) -> Result<()> {
        self.run(move |repo| repo.delete_item(id)).await
    }

    pub async fn item_by_id(&self, id: i64) -> Result<Option<Item>> {
        self.run(move |repo| repo.item_by_id(id)).await
    }

    pub async fn query_all_items(&self) -> Result<Vec<Item>> {
        self.run(|repo| repo.query_all_items()).await
    }

    pub async fn query_items(
        &self,
        name_filter: String,
        category_filter: String,
        location_filter: String,
    ) -> Result<Vec<Item>> {
        self.run(move |repo| repo.query_items(&name_filter, &category_filter, &location_filter))
            .await
    }

    pub async fn query_items_classified(
        &self,
        name_filter: String,
        category_filter: String,
        location_filter: String,
    ) -> Result<Vec<ClassifiedItem>> {
        self.run(move |repo| {
            repo.query_items_classified(&name_filter, &category_filter, &location_filter)
        })
        .await
    }

    // ========== Counts ==========

    pub async fn category_count(&self) -> Result<i64> {
        self.run(|repo| repo.category_count()).await
    }

    pub async fn sub_category_count_of(&self, parent_category_id: i64) -> Result<i64> {
        self.run(move |repo| repo.sub_category_count_of(parent_category_id))
            .await
    }

    pub async fn location_count(&self) -> Result<i64> {
        self.run(|repo| repo.location_count()).await
    }

    pub async fn item_count(&self) -> Result<i64> {
        self.run(|repo| repo.item_count()).await
    }

    // ========== ItemImage ==========

    pub async fn add_item_image(&self, item_id: i64, path: String) -> Result<i64> {
        self.run(move |repo| repo.add_item_image(item_id, &path))
            .await
    }

    pub async fn add_item_images(&self, item_id: i64, paths: Vec<String>) -> Result<usize> {
        self.run(move |repo| repo.add_item_images(item_id, &paths))
            .await
    }

    pub async fn image_paths(&self, item_id: i64) -> Result<Vec<String>> {
        self.run(move |repo| repo.image_paths(item_id)).await
    }

    pub async fn item_images(&self, item_id: i64) -> Result<Vec<ItemImage>> {
        self.run(move |repo| repo.item_images(item_id)).await
    }
}

impl std::fmt::Debug for InventoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryHandle").finish()
    }
}
