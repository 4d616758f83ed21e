//! Projection of the catalog into view models and HTML pages.
//!
//! View construction is pure: it reads a dog and the image registry and
//! produces serializable structs. [`Renderer`] turns those into pages with
//! minijinja templates compiled into the binary.

use chrono::{Datelike, NaiveDate};
use minijinja::Environment;
use serde::Serialize;

use crate::age::format_age;
use crate::error::Result;
use crate::images::ImageRegistry;
use crate::model::{Dog, ParentRecord, SCORE_MAX};

/// Shown when a card or detail image fails to load.
pub const PLACEHOLDER: &str = "data:image/svg+xml;utf8,<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"800\" height=\"600\" viewBox=\"0 0 800 600\"><rect width=\"100%\" height=\"100%\" fill=\"%23f2f3f5\"/><g fill=\"%239aa1a9\" font-family=\"Arial,Helvetica,sans-serif\" text-anchor=\"middle\"><text x=\"400\" y=\"310\" font-size=\"22\">Image not available</text></g></svg>";

/// Shown for a parent without a usable image.
pub const PARENT_PLACEHOLDER: &str = "data:image/svg+xml;utf8,<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"300\" viewBox=\"0 0 800 600\"><rect width=\"100%\" height=\"100%\" fill=\"%23f2f3f5\"/></svg>";

// ── Image slot ────────────────────────────────────────────────────────────────

/// An `<img>` with a one-shot fallback.
///
/// The first error swaps the source to the placeholder; later errors are
/// ignored so a failing placeholder cannot loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSlot {
    pub src: String,
    pub alt: String,
    pub fallback: String,
    pub fallback_applied: bool,
    pub error_class: bool,
}

impl ImageSlot {
    pub fn new(src: impl Into<String>, alt: impl Into<String>, fallback: &str) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            fallback: fallback.to_owned(),
            fallback_applied: false,
            error_class: false,
        }
    }

    /// Handle an error event. Returns `true` only for the event that swapped.
    pub fn on_error(&mut self, subject: &str) -> bool {
        if self.fallback_applied {
            return false;
        }
        tracing::warn!(subject, src = %self.src, "image failed to load; using placeholder");
        self.fallback_applied = true;
        self.error_class = true;
        self.src = self.fallback.clone();
        self.alt = format!("Placeholder for {subject}");
        true
    }

    pub fn on_load(&mut self) {
        self.error_class = false;
    }
}

// ── View models ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AttributeRow {
    pub label: &'static str,
    pub score: u8,
    /// One flag per bone, `true` when filled.
    pub bones: Vec<bool>,
}

fn attribute_rows(dog: &Dog) -> Vec<AttributeRow> {
    dog.attributes
        .rows()
        .into_iter()
        .map(|(label, score)| AttributeRow {
            label,
            score,
            bones: (1..=SCORE_MAX).map(|i| i <= score).collect(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub breed: String,
    pub age: String,
    pub subtitle: String,
    pub image: ImageSlot,
    /// Shown while hovered or touched.
    pub animated_src: Option<String>,
    pub attributes: Vec<AttributeRow>,
    pub show_delete: bool,
}

impl CardView {
    /// Source the card shows in the given hover state.
    pub fn media_src(&self, hovered: bool) -> &str {
        match (&self.animated_src, hovered) {
            (Some(animated), true) => animated,
            _ => &self.image.src,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParentView {
    pub label: &'static str,
    pub name: String,
    pub breed: String,
    pub image: ImageSlot,
}

/// An uploaded image the owner can re-edit from the detail page.
#[derive(Debug, Clone, Serialize)]
pub struct UploadView {
    pub id: String,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub card: CardView,
    pub description: String,
    pub parents: Vec<ParentView>,
    /// Empty outside owner mode.
    pub uploads: Vec<UploadView>,
}

/// Registry payload when `id` resolves, otherwise `url`.
pub fn resolve_source(registry: &ImageRegistry, id: Option<&str>, url: &str) -> String {
    id.and_then(|id| registry.resolve(id))
        .unwrap_or(url)
        .to_owned()
}

pub fn card_view(dog: &Dog, registry: &ImageRegistry, owner_mode: bool, today: NaiveDate) -> CardView {
    let age = format_age(dog.birthdate.as_deref(), dog.age.as_deref(), today);
    let src = resolve_source(registry, dog.image_id.as_deref(), &dog.image_url);
    let mut image = ImageSlot::new(src, format!("{} the {}", dog.name, dog.breed), PLACEHOLDER);
    if image.src.is_empty() {
        image.on_error(&dog.name);
    }
    let animated = resolve_source(registry, dog.gif_id.as_deref(), &dog.gif_url);
    CardView {
        id: dog.id.clone(),
        name: dog.name.clone(),
        breed: dog.breed.clone(),
        subtitle: format!("{} • {}", dog.breed, age),
        age,
        image,
        animated_src: Some(animated).filter(|a| !a.is_empty()),
        attributes: attribute_rows(dog),
        show_delete: owner_mode,
    }
}

fn parent_view(label: &'static str, parent: &ParentRecord, registry: &ImageRegistry) -> ParentView {
    let src = resolve_source(
        registry,
        parent.image_id.as_deref(),
        parent.image_url.as_deref().unwrap_or_default(),
    );
    let src = if src.is_empty() { PARENT_PLACEHOLDER.to_owned() } else { src };
    ParentView {
        label,
        name: parent.name.clone().unwrap_or_else(|| "—".to_owned()),
        breed: parent.breed.clone().unwrap_or_default(),
        image: ImageSlot::new(src, format!("{label} image"), PARENT_PLACEHOLDER),
    }
}

pub fn detail_view(dog: &Dog, registry: &ImageRegistry, owner_mode: bool, today: NaiveDate) -> DetailView {
    let mut parents = Vec::new();
    if let Some(mother) = dog.parents.mother.as_ref().filter(|p| !p.is_blank()) {
        parents.push(parent_view("Mother", mother, registry));
    }
    if let Some(father) = dog.parents.father.as_ref().filter(|p| !p.is_blank()) {
        parents.push(parent_view("Father", father, registry));
    }
    let uploads = if owner_mode {
        [("Photo", &dog.image_id), ("GIF", &dog.gif_id)]
            .into_iter()
            .filter_map(|(label, id)| id.as_ref().map(|id| (label, id)))
            .filter(|(_, id)| registry.get(id).is_some())
            .map(|(label, id)| UploadView { id: id.clone(), label })
            .collect()
    } else {
        Vec::new()
    };
    DetailView {
        card: card_view(dog, registry, owner_mode, today),
        description: dog.description.clone(),
        parents,
        uploads,
    }
}

// ── Pages ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexPage {
    pub cards: Vec<CardView>,
    pub owner_mode: bool,
    /// One-line notice shown above the grid.
    pub flash: Option<String>,
    pub error: Option<String>,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailPage {
    pub detail: DetailView,
    pub owner_mode: bool,
    pub year: i32,
}

/// Compiled page templates.
pub struct Renderer {
    env: Environment<'static>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Renderer")
    }
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("../templates/base.html"))?;
        env.add_template("index.html", include_str!("../templates/index.html"))?;
        env.add_template("detail.html", include_str!("../templates/detail.html"))?;
        Ok(Self { env })
    }

    pub fn index(&self, page: &IndexPage) -> Result<String> {
        Ok(self.env.get_template("index.html")?.render(page)?)
    }

    pub fn detail(&self, page: &DetailPage) -> Result<String> {
        Ok(self.env.get_template("detail.html")?.render(page)?)
    }
}

pub fn index_page(
    dogs: &[Dog],
    registry: &ImageRegistry,
    owner_mode: bool,
    today: NaiveDate,
) -> IndexPage {
    IndexPage {
        cards: dogs
            .iter()
            .map(|d| card_view(d, registry, owner_mode, today))
            .collect(),
        owner_mode,
        flash: None,
        error: None,
        year: today.year(),
    }
}
