//! Server-rendered site: the dog grid, detail pages, owner mode and the
//! add-dog form.
//!
//! Pages read and write the local [`pupmatch_core::AppContext`]. When a remote
//! mirror is configured, writes are forwarded in the background and failures
//! are only logged.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{HeaderMap, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use bytes::Bytes;
use chrono::{Local, NaiveDate};
use pupmatch_core::age::parse_date;
use pupmatch_core::editor::{self, Preset};
use pupmatch_core::images::{ImageRegistry, mime_for};
use pupmatch_core::mirror::RemoteMirror;
use pupmatch_core::resolver::ImageResolver;
use pupmatch_core::{AdoptionFields, Attributes, CoreError, NewDog, Notice, ParentRecord, Parents};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::state::AppState;

pub const OWNER_COOKIE: &str = "pupmatch_owner";

pub fn router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/dogs", post(add_dog))
        .route("/dogs/{id}", get(detail))
        .route("/dogs/{id}/adopt", post(adopt))
        .route("/dogs/{id}/delete", post(delete_dog))
        .route("/owner", post(enter_owner_mode))
        .route("/owner/exit", post(exit_owner_mode))
        .route("/export", get(export))
        .route("/clear", post(clear))
        .route("/images/{id}/preview", get(preview_image))
        .route("/images/{id}/edit", post(edit_image))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ── Owner mode ────────────────────────────────────────────────────────────────

fn owner_mode(headers: &HeaderMap) -> bool {
    let wanted = format!("{OWNER_COOKIE}=1");
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .any(|pair| pair.trim() == wanted)
}

fn require_owner(headers: &HeaderMap) -> Result<(), ServerError> {
    if owner_mode(headers) {
        Ok(())
    } else {
        Err(ServerError::Forbidden("Owner mode required".into()))
    }
}

#[derive(Debug, Deserialize)]
struct PinForm {
    #[serde(default)]
    pin: String,
}

async fn enter_owner_mode(State(state): State<Arc<AppState>>, Form(form): Form<PinForm>) -> Response {
    if form.pin != state.config.owner_pin {
        info!("owner mode refused");
        return Redirect::to("/?error=pin").into_response();
    }
    info!("owner mode enabled");
    let cookie = format!("{OWNER_COOKIE}=1; Path=/; HttpOnly; SameSite=Lax");
    ([(header::SET_COOKIE, cookie)], Redirect::to("/?flash=owner")).into_response()
}

async fn exit_owner_mode() -> Response {
    let cookie = format!("{OWNER_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax");
    ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}

// ── Pages ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct IndexParams {
    flash: Option<String>,
    error: Option<String>,
}

fn flash_text(code: &str) -> Option<&'static str> {
    match code {
        "added" => Some("Dog added."),
        "deleted" => Some("Dog removed."),
        "cleared" => Some("All dogs cleared."),
        "adopted" => Some("Thank you! Your adoption request was received."),
        "owner" => Some("Owner mode enabled."),
        "edited" => Some("Image updated."),
        _ => None,
    }
}

fn error_text(code: &str) -> Option<&'static str> {
    match code {
        "pin" => Some("Incorrect PIN."),
        "missing" => Some("Name, breed and description are required."),
        "image" => Some("Add an image upload or an image URL."),
        "preset" => Some("Unknown image preset."),
        "birthdate" => Some("Birthdate is not a valid date."),
        "url" => Some("An image URL could not be used."),
        "upload" => Some("An uploaded image could not be read."),
        _ => None,
    }
}

async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<IndexParams>,
) -> Result<Html<String>, ServerError> {
    let notice = Notice {
        flash: params.flash.as_deref().and_then(flash_text).map(str::to_owned),
        error: params.error.as_deref().and_then(error_text).map(str::to_owned),
    };
    let html = state
        .site
        .render_index(owner_mode(&headers), today(), notice)
        .await?;
    Ok(Html(html))
}

async fn detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Html<String>, ServerError> {
    state
        .site
        .render_detail(&id, owner_mode(&headers), today())
        .await?
        .map(Html)
        .ok_or_else(|| ServerError::NotFound("Dog not found".into()))
}

// ── Adoption ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AdoptForm {
    full_name: String,
    pickup_time: String,
    remarks: String,
}

async fn adopt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<AdoptForm>,
) -> Result<Redirect, ServerError> {
    let dog_name = state
        .site
        .catalog
        .lock()
        .await
        .get(&id)
        .map(|d| d.name.clone())
        .ok_or_else(|| ServerError::NotFound("Dog not found".into()))?;

    let full_name = form.full_name.trim();
    let pickup_time = form.pickup_time.trim();
    if full_name.is_empty() || pickup_time.is_empty() {
        return Ok(Redirect::to(&format!("/dogs/{id}")));
    }

    let record = state
        .site
        .submit_adoption(AdoptionFields {
            dog_id: id,
            dog_name,
            full_name: full_name.to_owned(),
            pickup_time: pickup_time.to_owned(),
            remarks: Some(form.remarks.trim().to_owned()),
        })
        .await?;
    mirror_in_background(&state, "create_adoption", move |m| async move {
        m.create_adoption(&record).await
    });
    Ok(Redirect::to("/?flash=adopted"))
}

// ── Owner actions ─────────────────────────────────────────────────────────────

struct Upload {
    filename: String,
    bytes: Bytes,
}

/// Text fields (trimmed) and non-empty file fields of the add-dog form.
#[derive(Default)]
struct DogForm {
    text: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl DogForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ServerError> {
        let bad = |e: axum::extract::multipart::MultipartError| {
            ServerError::BadRequest(format!("Failed to read multipart field: {e}"))
        };
        let mut form = DogForm::default();
        while let Some(field) = multipart.next_field().await.map_err(bad)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match field.file_name().map(str::to_owned) {
                Some(filename) => {
                    let bytes = field.bytes().await.map_err(bad)?;
                    if !bytes.is_empty() {
                        form.files.insert(name, Upload { filename, bytes });
                    }
                }
                None => {
                    let value = field.text().await.map_err(bad)?;
                    form.text.insert(name, value.trim().to_owned());
                }
            }
        }
        Ok(form)
    }

    fn field(&self, key: &str) -> &str {
        self.text.get(key).map(String::as_str).unwrap_or("")
    }

    fn optional(&self, key: &str) -> Option<String> {
        Some(self.field(key)).filter(|v| !v.is_empty()).map(str::to_owned)
    }

    fn score(&self, key: &str, default: u8) -> u8 {
        self.field(key).parse().unwrap_or(default)
    }

    /// `Ok(None)` when the select was left at "as uploaded".
    fn preset(&self, key: &str) -> Result<Option<Preset>, String> {
        match self.field(key) {
            "" => Ok(None),
            raw => raw.parse().map(Some),
        }
    }
}

/// Back to the grid with an error banner.
fn rejected(code: &str) -> Redirect {
    Redirect::to(&format!("/?error={code}"))
}

fn store_upload(
    images: &mut ImageRegistry,
    upload: Option<Upload>,
    preset: Option<Preset>,
) -> pupmatch_core::Result<Option<String>> {
    let Some(upload) = upload else {
        return Ok(None);
    };
    let mime = mime_for(&upload.filename, &upload.bytes);
    let id = images.store_bytes(&upload.filename, &mime, &upload.bytes)?;
    if let Some(preset) = preset {
        if let Err(e) = editor::apply(images, &id, preset) {
            discard_uploads(images, [&id]);
            return Err(e);
        }
    }
    Ok(Some(id))
}

/// Store every present upload in order. If one fails, the ones already
/// stored are removed again.
fn stage_uploads(
    images: &mut ImageRegistry,
    uploads: Vec<(Option<Upload>, Option<Preset>)>,
) -> pupmatch_core::Result<Vec<Option<String>>> {
    let mut ids = Vec::with_capacity(uploads.len());
    for (upload, preset) in uploads {
        match store_upload(images, upload, preset) {
            Ok(id) => ids.push(id),
            Err(e) => {
                discard_uploads(images, ids.iter().flatten());
                return Err(e);
            }
        }
    }
    Ok(ids)
}

fn discard_uploads<'a>(images: &mut ImageRegistry, ids: impl IntoIterator<Item = &'a String>) {
    for id in ids {
        if let Err(e) = images.remove(id) {
            warn!(image_id = %id, error = %e, "failed to discard upload");
        }
    }
}

fn parent(form: &DogForm, key: &str, image_id: Option<String>) -> Option<ParentRecord> {
    let record = ParentRecord {
        name: form.optional(&format!("{key}Name")),
        breed: form.optional(&format!("{key}Breed")),
        image_url: form.optional(&format!("{key}ImageUrl")),
        image_id,
    };
    (!record.is_blank()).then_some(record)
}

async fn add_dog(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Redirect, ServerError> {
    require_owner(&headers)?;
    let mut form = DogForm::read(multipart).await?;
    let image = form.files.remove("imageFile");
    let gif = form.files.remove("gifFile");
    let mother_file = form.files.remove("motherImageFile");
    let father_file = form.files.remove("fatherImageFile");

    let (name, breed, description) = (form.field("name"), form.field("breed"), form.field("description"));
    if name.is_empty() || breed.is_empty() || description.is_empty() {
        return Ok(rejected("missing"));
    }
    let image_url = form.field("imageUrl").to_owned();
    if image.is_none() && image_url.is_empty() {
        return Ok(rejected("image"));
    }
    let (Ok(image_preset), Ok(gif_preset)) = (form.preset("imagePreset"), form.preset("gifPreset")) else {
        return Ok(rejected("preset"));
    };
    let birthdate = match form.field("birthdate") {
        "" => None,
        raw => match parse_date(raw) {
            Some(date) => Some(date.format("%Y-%m-%d").to_string()),
            None => return Ok(rejected("birthdate")),
        },
    };
    for key in ["imageUrl", "gifUrl", "motherImageUrl", "fatherImageUrl"] {
        let url = form.field(key);
        if url.is_empty() {
            continue;
        }
        if let Err(e) = state.resolver.check(url).await {
            info!(field = key, error = %e, "image URL rejected");
            return Ok(rejected("url"));
        }
    }

    let staged = stage_uploads(
        &mut *state.site.images.lock().await,
        vec![(image, image_preset), (gif, gif_preset), (mother_file, None), (father_file, None)],
    );
    let ids = match staged {
        Ok(ids) => ids,
        Err(e @ (CoreError::Image(_) | CoreError::InvalidDataUrl(_))) => {
            info!(error = %e, "upload rejected");
            return Ok(rejected("upload"));
        }
        Err(e) => return Err(e.into()),
    };
    let stored: Vec<String> = ids.iter().flatten().cloned().collect();
    let mut ids = ids.into_iter();
    let (image_id, gif_id) = (ids.next().flatten(), ids.next().flatten());
    let (mother_image_id, father_image_id) = (ids.next().flatten(), ids.next().flatten());

    let defaults = Attributes::default();
    let dog = NewDog {
        name: name.to_owned(),
        breed: breed.to_owned(),
        birthdate,
        description: description.to_owned(),
        image_url,
        gif_url: form.field("gifUrl").to_owned(),
        image_id,
        gif_id,
        attributes: Attributes {
            friendliness: form.score("friendliness", defaults.friendliness),
            energy: form.score("energy", defaults.energy),
            trainability: form.score("trainability", defaults.trainability),
            kid_friendly: form.score("kidFriendly", defaults.kid_friendly),
            size: form.score("size", defaults.size),
        },
        parents: Parents {
            mother: parent(&form, "mother", mother_image_id),
            father: parent(&form, "father", father_image_id),
        },
    }
    .into_dog();

    if let Err(e) = state.site.add_dog(dog.clone()).await {
        discard_uploads(&mut *state.site.images.lock().await, &stored);
        return Err(e.into());
    }
    mirror_in_background(&state, "create_dog", move |m| async move { m.create_dog(&dog).await });
    Ok(Redirect::to("/?flash=added"))
}

async fn delete_dog(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Redirect, ServerError> {
    require_owner(&headers)?;
    if state.site.remove_dog(&id).await?.is_none() {
        return Err(ServerError::NotFound("Dog not found".into()));
    }
    mirror_in_background(&state, "delete_dog", move |m| async move { m.delete_dog(&id).await });
    Ok(Redirect::to("/?flash=deleted"))
}

async fn export(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response, ServerError> {
    require_owner(&headers)?;
    let payload = state.site.export().await;
    let body = payload.to_json()?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        pupmatch_core::export::export_filename(today())
    );
    info!(dogs = payload.dogs.len(), adoptions = payload.adoptions.len(), "data exported");
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

async fn clear(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Redirect, ServerError> {
    require_owner(&headers)?;
    state.site.clear().await?;
    Ok(Redirect::to("/?flash=cleared"))
}

// ── Upload editor ────────────────────────────────────────────────────────────

fn parse_preset(raw: &str) -> Result<Preset, ServerError> {
    match raw {
        "" => Ok(Preset::default()),
        raw => raw.parse().map_err(ServerError::BadRequest),
    }
}

#[derive(Debug, Default, Deserialize)]
struct PreviewParams {
    #[serde(default)]
    preset: String,
}

async fn preview_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<PreviewParams>,
) -> Result<Response, ServerError> {
    require_owner(&headers)?;
    let preset = parse_preset(&params.preset)?;
    let png = state.site.preview_image(&id, preset).await?;
    Ok((
        [(header::CONTENT_TYPE, "image/png"), (header::CACHE_CONTROL, "no-store")],
        png,
    )
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EditForm {
    preset: String,
    dog_id: String,
}

async fn edit_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<EditForm>,
) -> Result<Redirect, ServerError> {
    require_owner(&headers)?;
    let preset = parse_preset(&form.preset)?;
    state.site.edit_image(&id, preset).await?;
    let known_dog = state.site.catalog.lock().await.get(&form.dog_id).is_some();
    if known_dog {
        Ok(Redirect::to(&format!("/dogs/{}", form.dog_id)))
    } else {
        Ok(Redirect::to("/?flash=edited"))
    }
}

// ── Mirror ────────────────────────────────────────────────────────────────────

fn mirror_in_background<F, Fut>(state: &AppState, operation: &'static str, op: F)
where
    F: FnOnce(Arc<RemoteMirror>) -> Fut,
    Fut: Future<Output = pupmatch_core::Result<()>> + Send + 'static,
{
    let Some(mirror) = state.mirror.clone() else {
        return;
    };
    let fut = op(mirror);
    tokio::spawn(async move {
        if let Err(e) = fut.await {
            warn!(operation, error = %e, "remote mirror write failed");
        }
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::routes::test_support::{body_bytes, body_text};
    use crate::state::testing;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    const BOUNDARY: &str = "pupmatch-test-boundary";

    fn app(state: Arc<AppState>) -> Router {
        router(1024 * 1024).with_state(state)
    }

    fn owner_cookie() -> String {
        format!("{OWNER_COOKIE}=1")
    }

    fn multipart(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                    .as_bytes(),
            );
        }
        for (name, filename, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_dog(state: Arc<AppState>, cookie: Option<String>, body: Vec<u8>) -> Response {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/dogs")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        app(state).oneshot(req.body(Body::from(body)).unwrap()).await.unwrap()
    }

    async fn post_form(state: Arc<AppState>, uri: &str, cookie: Option<String>, body: &str) -> Response {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        app(state).oneshot(req.body(Body::from(body.to_owned())).unwrap()).await.unwrap()
    }

    async fn get_page(state: Arc<AppState>, uri: &str, cookie: Option<String>) -> Response {
        let mut req = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        app(state).oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
    }

    fn rex_fields() -> Vec<(&'static str, &'static str)> {
        vec![
            ("name", "Rex"),
            ("breed", "Lab"),
            ("description", "friendly"),
            ("imageUrl", "https://example.com/rex.jpg"),
            ("friendliness", "9"),
            ("motherName", "Bella"),
        ]
    }

    async fn add_rex(state: &Arc<AppState>) -> String {
        let resp = post_dog(state.clone(), Some(owner_cookie()), multipart(&rex_fields(), &[])).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        state.site.catalog.lock().await.list()[0].id.clone()
    }

    fn location(resp: &Response) -> &str {
        resp.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn pin_unlocks_owner_mode() {
        let state = testing::state().await;
        let resp = post_form(state.clone(), "/owner", None, "pin=wrong").await;
        assert_eq!(location(&resp), "/?error=pin");
        assert!(!resp.headers().contains_key(header::SET_COOKIE));

        let resp = post_form(state, "/owner", None, "pin=owner123").await;
        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("pupmatch_owner=1"));
    }

    #[tokio::test]
    async fn index_hides_owner_controls_from_visitors() {
        let state = testing::state().await;
        add_rex(&state).await;

        let html = body_text(get_page(state.clone(), "/", None).await).await;
        assert!(html.contains("Rex"));
        assert!(!html.contains("Delete"));

        let html = body_text(get_page(state, "/?flash=added", Some(owner_cookie())).await).await;
        assert!(html.contains("Delete"));
        assert!(html.contains("Dog added."));
    }

    #[tokio::test]
    async fn add_dog_requires_owner_mode() {
        let state = testing::state().await;
        let resp = post_dog(state.clone(), None, multipart(&rex_fields(), &[])).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(state.site.catalog.lock().await.is_empty());
    }

    #[tokio::test]
    async fn add_dog_stores_clamped_attributes_and_parents() {
        let state = testing::state().await;
        add_rex(&state).await;
        let catalog = state.site.catalog.lock().await;
        let dog = &catalog.list()[0];
        assert_eq!(dog.attributes.friendliness, 5);
        assert_eq!(dog.attributes.energy, Attributes::default().energy);
        assert_eq!(dog.parents.mother.as_ref().and_then(|m| m.name.as_deref()), Some("Bella"));
        assert!(dog.parents.father.is_none());
    }

    #[tokio::test]
    async fn add_dog_without_any_image_is_rejected() {
        let state = testing::state().await;
        let fields = [("name", "Rex"), ("breed", "Lab"), ("description", "friendly")];
        let resp = post_dog(state.clone(), Some(owner_cookie()), multipart(&fields, &[])).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/?error=image");
        assert!(state.site.catalog.lock().await.is_empty());
    }

    #[tokio::test]
    async fn add_dog_validation_redirects_with_a_banner() {
        let state = testing::state().await;
        let fields = [("name", "Rex"), ("imageUrl", "https://example.com/rex.jpg")];
        let resp = post_dog(state.clone(), Some(owner_cookie()), multipart(&fields, &[])).await;
        assert_eq!(location(&resp), "/?error=missing");

        let mut fields = rex_fields();
        fields.push(("birthdate", "someday"));
        let resp = post_dog(state.clone(), Some(owner_cookie()), multipart(&fields, &[])).await;
        assert_eq!(location(&resp), "/?error=birthdate");

        let mut fields = rex_fields();
        fields.push(("imagePreset", "zoom"));
        let resp = post_dog(state.clone(), Some(owner_cookie()), multipart(&fields, &[])).await;
        assert_eq!(location(&resp), "/?error=preset");
        assert!(state.site.catalog.lock().await.is_empty());

        let html = body_text(get_page(state, "/?error=missing", Some(owner_cookie())).await).await;
        assert!(html.contains("Name, breed and description are required."));
    }

    #[tokio::test]
    async fn add_dog_rejects_non_http_image_url() {
        let state = testing::state().await;
        let fields = [
            ("name", "Rex"),
            ("breed", "Lab"),
            ("description", "friendly"),
            ("imageUrl", "ftp://example.com/rex.jpg"),
        ];
        let resp = post_dog(state, Some(owner_cookie()), multipart(&fields, &[])).await;
        assert_eq!(location(&resp), "/?error=url");
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn uploaded_image_is_edited_with_the_preset() {
        let state = testing::state().await;
        let png = png(40, 20);
        let fields = [
            ("name", "Rex"),
            ("breed", "Lab"),
            ("description", "friendly"),
            ("imagePreset", "fill"),
        ];
        let resp = post_dog(
            state.clone(),
            Some(owner_cookie()),
            multipart(&fields, &[("imageFile", "rex.png", &png)]),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let image_id = state.site.catalog.lock().await.list()[0].image_id.clone().unwrap();
        let images = state.site.images.lock().await;
        let stored = images.get(&image_id).unwrap();
        assert!(stored.filename.starts_with("edited_"));
        assert_eq!(stored.mime_type, "image/png");
    }

    #[tokio::test]
    async fn gif_upload_takes_its_own_preset() {
        let state = testing::state().await;
        let (photo, gif) = (png(40, 20), png(10, 30));
        let fields = [
            ("name", "Rex"),
            ("breed", "Lab"),
            ("description", "friendly"),
            ("gifPreset", "fit"),
        ];
        let resp = post_dog(
            state.clone(),
            Some(owner_cookie()),
            multipart(&fields, &[("imageFile", "rex.png", &photo), ("gifFile", "rex.gif", &gif)]),
        )
        .await;
        assert_eq!(location(&resp), "/?flash=added");

        let dog = state.site.catalog.lock().await.list()[0].clone();
        let images = state.site.images.lock().await;
        assert_eq!(images.get(dog.image_id.as_deref().unwrap()).unwrap().filename, "rex.png");
        assert!(images.get(dog.gif_id.as_deref().unwrap()).unwrap().filename.starts_with("edited_"));
    }

    #[tokio::test]
    async fn failed_upload_leaves_no_orphans() {
        let state = testing::state().await;
        let photo = png(40, 20);
        let fields = [
            ("name", "Rex"),
            ("breed", "Lab"),
            ("description", "friendly"),
            ("imagePreset", "fill"),
            ("gifPreset", "fit"),
        ];
        let resp = post_dog(
            state.clone(),
            Some(owner_cookie()),
            multipart(&fields, &[("imageFile", "rex.png", &photo), ("gifFile", "rex.gif", b"not a gif")]),
        )
        .await;
        assert_eq!(location(&resp), "/?error=upload");
        assert!(state.site.catalog.lock().await.is_empty());
        assert!(state.site.images.lock().await.all().is_empty());
    }

    #[tokio::test]
    async fn owner_previews_and_re_edits_an_upload() {
        let state = testing::state().await;
        let photo = png(40, 20);
        let fields = [("name", "Rex"), ("breed", "Lab"), ("description", "friendly")];
        post_dog(state.clone(), Some(owner_cookie()), multipart(&fields, &[("imageFile", "rex.png", &photo)])).await;
        let dog = state.site.catalog.lock().await.list()[0].clone();
        let image_id = dog.image_id.clone().unwrap();

        let detail = body_text(get_page(state.clone(), &format!("/dogs/{}", dog.id), Some(owner_cookie())).await).await;
        assert!(detail.contains(&format!("/images/{image_id}/preview?preset=fill")));

        let uri = format!("/images/{image_id}/preview?preset=fill");
        let resp = get_page(state.clone(), &uri, None).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let resp = get_page(state.clone(), &uri, Some(owner_cookie())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
        let thumb = image::load_from_memory(&body_bytes(resp).await).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (editor::THUMBNAIL_SIZE, editor::THUMBNAIL_SIZE));
        assert_eq!(state.site.images.lock().await.get(&image_id).unwrap().filename, "rex.png");

        let resp = get_page(state.clone(), "/images/missing/preview", Some(owner_cookie())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = format!("preset=center&dogId={}", dog.id);
        let resp = post_form(state.clone(), &format!("/images/{image_id}/edit"), Some(owner_cookie()), &body).await;
        assert_eq!(location(&resp), format!("/dogs/{}", dog.id));
        assert!(state.site.images.lock().await.get(&image_id).unwrap().filename.starts_with("edited_"));
    }

    #[tokio::test]
    async fn detail_page_and_unknown_dog() {
        let state = testing::state().await;
        let id = add_rex(&state).await;

        let resp = get_page(state.clone(), &format!("/dogs/{id}"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("fullName"));

        let resp = get_page(state, "/dogs/nope", None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_adoption_is_a_silent_no_op() {
        let state = testing::state().await;
        let id = add_rex(&state).await;

        let resp = post_form(state.clone(), &format!("/dogs/{id}/adopt"), None, "fullName=&pickupTime=").await;
        assert_eq!(location(&resp), format!("/dogs/{id}"));
        assert!(state.site.adoptions.lock().await.list().is_empty());

        let body = "fullName=Jane+Doe&pickupTime=2026-11-01T10%3A00&remarks=";
        let resp = post_form(state.clone(), &format!("/dogs/{id}/adopt"), None, body).await;
        assert_eq!(location(&resp), "/?flash=adopted");
        let adoptions = state.site.adoptions.lock().await.list();
        assert_eq!(adoptions.len(), 1);
        assert_eq!(adoptions[0].dog_name, "Rex");
        assert_eq!(adoptions[0].remarks, None);
    }

    #[tokio::test]
    async fn owner_can_delete_and_visitors_cannot() {
        let state = testing::state().await;
        let id = add_rex(&state).await;
        let uri = format!("/dogs/{id}/delete");

        let resp = post_form(state.clone(), &uri, None, "").await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = post_form(state.clone(), &uri, Some(owner_cookie()), "").await;
        assert_eq!(location(&resp), "/?flash=deleted");
        assert!(state.site.catalog.lock().await.is_empty());
    }

    #[tokio::test]
    async fn export_downloads_everything() {
        let state = testing::state().await;
        add_rex(&state).await;
        add_rex(&state).await;

        let resp = get_page(state.clone(), "/export", None).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = get_page(state, "/export", Some(owner_cookie())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_owned();
        assert!(disposition.contains("pupmatch-data-"));
        let payload: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(payload["dogs"].as_array().map(Vec::len), Some(2));
        assert_eq!(payload["adoptions"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn clear_empties_the_catalog() {
        let state = testing::state().await;
        add_rex(&state).await;
        let resp = post_form(state.clone(), "/clear", Some(owner_cookie()), "").await;
        assert_eq!(location(&resp), "/?flash=cleared");
        assert!(state.site.catalog.lock().await.is_empty());
    }
}
