//! Registry of uploaded images, keyed by locally generated ids.
//!
//! Payloads are held as base64 `data:` URLs so a card can embed them
//! directly in an `<img src>`.

use std::collections::HashMap;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::model::{StoredImage, new_id, timestamp};
use crate::storage::{SharedStore, UPLOADED_IMAGES_KEY, load_json, save_json};

pub struct ImageRegistry {
    store: SharedStore,
    images: HashMap<String, StoredImage>,
}

impl std::fmt::Debug for ImageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImageRegistry({} images)", self.images.len())
    }
}

impl ImageRegistry {
    pub fn open(store: SharedStore) -> Self {
        let images = load_json(store.as_ref(), UPLOADED_IMAGES_KEY).unwrap_or_default();
        Self { store, images }
    }

    fn save(&self) -> Result<()> {
        save_json(self.store.as_ref(), UPLOADED_IMAGES_KEY, &self.images)
    }

    /// Read `path`, embed it and return the new id.
    pub async fn store(&mut self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_for(&filename, &bytes);
        self.store_bytes(&filename, &mime, &bytes)
    }

    /// Embed bytes that are already in memory, e.g. a multipart field.
    pub fn store_bytes(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> Result<String> {
        let id = new_id();
        let image = StoredImage {
            id: id.clone(),
            data: to_data_url(mime, bytes),
            filename: filename.to_owned(),
            size: bytes.len() as u64,
            mime_type: mime.to_owned(),
            uploaded_at: timestamp(Utc::now()),
        };
        self.images.insert(id.clone(), image);
        self.save()?;
        info!(image_id = %id, filename, size = bytes.len(), "image stored");
        Ok(id)
    }

    /// Overwrite an existing entry in place, keeping its id.
    pub fn replace(&mut self, image: StoredImage) -> Result<()> {
        if !self.images.contains_key(&image.id) {
            return Err(CoreError::UnknownImage(image.id));
        }
        debug!(image_id = %image.id, "image replaced");
        self.images.insert(image.id.clone(), image);
        self.save()
    }

    /// The embedded payload for `id`, if any.
    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.images.get(id).map(|img| img.data.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&StoredImage> {
        self.images.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Result<()> {
        if self.images.remove(id).is_some() {
            info!(image_id = %id, "image removed");
        }
        self.save()
    }

    pub fn all(&self) -> Vec<StoredImage> {
        self.images.values().cloned().collect()
    }
}

pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its MIME type and decoded bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let invalid = || CoreError::InvalidDataUrl(url.chars().take(48).collect());
    let rest = url.strip_prefix("data:").ok_or_else(invalid)?;
    let (meta, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let mime = meta.strip_suffix(";base64").ok_or_else(invalid)?;
    let bytes = STANDARD.decode(payload).map_err(|_| invalid())?;
    Ok((mime.to_owned(), bytes))
}

/// MIME type from the file extension, falling back to sniffing the bytes.
pub fn mime_for(filename: &str, bytes: &[u8]) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let by_ext = match ext.as_deref() {
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("gif") => Some("image/gif"),
        Some("webp") => Some("image/webp"),
        Some("svg") => Some("image/svg+xml"),
        _ => None,
    };
    if let Some(mime) = by_ext {
        return mime.to_owned();
    }
    image::guess_format(bytes)
        .map(|f| f.to_mime_type().to_owned())
        .unwrap_or_else(|_| "application/octet-stream".to_owned())
}
