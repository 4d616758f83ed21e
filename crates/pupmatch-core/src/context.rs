//! Page-level state shared by the site routes.
//!
//! Lock order is catalog, then images, then adoptions.

use chrono::{Datelike, NaiveDate};
use tokio::sync::Mutex;
use tracing::info;

use crate::adoption::AdoptionBook;
use crate::catalog::Catalog;
use crate::editor::{self, Preset};
use crate::error::Result;
use crate::export::ExportPayload;
use crate::images::{ImageRegistry, decode_data_url};
use crate::model::{AdoptionFields, AdoptionRecord, Dog};
use crate::render::{DetailPage, Renderer, detail_view, index_page};
use crate::storage::SharedStore;

#[derive(Debug)]
pub struct AppContext {
    pub catalog: Mutex<Catalog>,
    pub images: Mutex<ImageRegistry>,
    pub adoptions: Mutex<AdoptionBook>,
    renderer: Renderer,
}

/// Banner lines for the index page.
#[derive(Debug, Clone, Default)]
pub struct Notice {
    pub flash: Option<String>,
    pub error: Option<String>,
}

impl AppContext {
    /// Load every collection from `store` and backfill legacy ages.
    pub fn open(store: SharedStore, today: NaiveDate) -> Result<Self> {
        let mut catalog = Catalog::new(store.clone());
        let dogs = catalog.load();
        let migrated = catalog.migrate_legacy_ages(today)?;
        let images = ImageRegistry::open(store.clone());
        let adoptions = AdoptionBook::open(store);
        info!(dogs = dogs.len(), migrated, "site context ready");
        Ok(Self {
            catalog: Mutex::new(catalog),
            images: Mutex::new(images),
            adoptions: Mutex::new(adoptions),
            renderer: Renderer::new()?,
        })
    }

    pub async fn render_index(&self, owner_mode: bool, today: NaiveDate, notice: Notice) -> Result<String> {
        let catalog = self.catalog.lock().await;
        let images = self.images.lock().await;
        let mut page = index_page(&catalog.list(), &images, owner_mode, today);
        page.flash = notice.flash;
        page.error = notice.error;
        self.renderer.index(&page)
    }

    /// `None` when no dog has this id.
    pub async fn render_detail(&self, id: &str, owner_mode: bool, today: NaiveDate) -> Result<Option<String>> {
        let catalog = self.catalog.lock().await;
        let Some(dog) = catalog.get(id) else {
            return Ok(None);
        };
        let images = self.images.lock().await;
        let page = DetailPage {
            detail: detail_view(dog, &images, owner_mode, today),
            owner_mode,
            year: today.year(),
        };
        self.renderer.detail(&page).map(Some)
    }

    pub async fn add_dog(&self, dog: Dog) -> Result<()> {
        self.catalog.lock().await.add(dog)
    }

    /// Remove the dog and the uploads only it referenced.
    pub async fn remove_dog(&self, id: &str) -> Result<Option<Dog>> {
        let mut catalog = self.catalog.lock().await;
        let Some(dog) = catalog.get(id).cloned() else {
            return Ok(None);
        };
        catalog.remove_by_id(id)?;
        let mut images = self.images.lock().await;
        for image_id in owned_image_ids(&dog) {
            let shared = catalog
                .list()
                .iter()
                .any(|other| owned_image_ids(other).contains(&image_id));
            if !shared {
                images.remove(&image_id)?;
            }
        }
        Ok(Some(dog))
    }

    pub async fn submit_adoption(&self, fields: AdoptionFields) -> Result<AdoptionRecord> {
        self.adoptions.lock().await.submit(fields)
    }

    pub async fn export(&self) -> ExportPayload {
        let dogs = self.catalog.lock().await.list();
        let adoptions = self.adoptions.lock().await.list();
        ExportPayload { dogs, adoptions }
    }

    /// PNG bytes of upload `id` rendered with `preset` at thumbnail size.
    pub async fn preview_image(&self, id: &str, preset: Preset) -> Result<Vec<u8>> {
        let images = self.images.lock().await;
        let (_, png) = decode_data_url(&editor::thumbnail(&images, id, preset)?)?;
        Ok(png)
    }

    /// Re-render upload `id` with `preset` and save it in place.
    pub async fn edit_image(&self, id: &str, preset: Preset) -> Result<()> {
        editor::apply(&mut *self.images.lock().await, id, preset).map(|_| ())
    }

    /// Drop the catalog. Adoptions and uploads are kept.
    pub async fn clear(&self) -> Result<()> {
        self.catalog.lock().await.clear()
    }
}

fn owned_image_ids(dog: &Dog) -> Vec<String> {
    let parents = [&dog.parents.mother, &dog.parents.father];
    dog.image_id
        .iter()
        .chain(dog.gif_id.iter())
        .chain(
            parents
                .into_iter()
                .flatten()
                .filter_map(|p| p.image_id.as_ref()),
        )
        .cloned()
        .collect()
}
