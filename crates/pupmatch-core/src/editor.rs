//! Preset crop/fit transforms for uploaded images.
//!
//! An image is drawn onto a transparent square canvas according to a
//! [`Preset`] and re-encoded as PNG. Saving writes the result back into the
//! registry under the original id.

use std::io::Cursor;
use std::str::FromStr;

use chrono::Utc;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::info;

use crate::error::{CoreError, Result};
use crate::images::{ImageRegistry, decode_data_url, to_data_url};
use crate::model::{StoredImage, timestamp};

/// Side of the canvas an edited image is saved at.
pub const SAVE_SIZE: u32 = 400;
/// Side of the editor's thumbnail preview.
pub const THUMBNAIL_SIZE: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    Center,
    #[default]
    Fit,
    Fill,
    Original,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Center => "center",
            Preset::Fit => "fit",
            Preset::Fill => "fill",
            Preset::Original => "original",
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" => Ok(Preset::Center),
            "fit" => Ok(Preset::Fit),
            "fill" => Ok(Preset::Fill),
            "original" => Ok(Preset::Original),
            other => Err(format!("unknown preset '{other}'")),
        }
    }
}

/// Region of the source image that stays visible on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where the scaled window lands on the canvas. Always inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

fn scale_for(preset: Preset, w: f64, h: f64, c: f64) -> f64 {
    match preset {
        Preset::Center | Preset::Fit => (c / w).min(c / h),
        Preset::Fill => (c / w).max(c / h),
        Preset::Original => (c / w).min(c / h).min(1.0),
    }
}

/// Compute the visible source window of a `src_w` x `src_h` image and where
/// it lands on a square canvas.
///
/// `Fill` crops the overflow before scaling, so the scaled buffer never
/// exceeds `canvas` x `canvas`.
pub fn layout(preset: Preset, src_w: u32, src_h: u32, canvas: u32) -> (Window, Placement) {
    let (src_w, src_h, canvas) = (src_w.max(1), src_h.max(1), canvas.max(1));
    let c = canvas as f64;
    let scale = scale_for(preset, src_w as f64, src_h as f64, c);

    let visible = |side: u32| ((c / scale).round() as u32).clamp(1, side);
    let (win_w, win_h) = (visible(src_w), visible(src_h));
    let window = Window {
        x: (src_w - win_w) / 2,
        y: (src_h - win_h) / 2,
        width: win_w,
        height: win_h,
    };

    let scaled = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, canvas);
    let (width, height) = (scaled(win_w), scaled(win_h));
    let placement = Placement {
        x: (canvas - width) / 2,
        y: (canvas - height) / 2,
        width,
        height,
    };
    (window, placement)
}

/// Draw `source` on a transparent `canvas` x `canvas` image.
pub fn render(source: &DynamicImage, preset: Preset, canvas: u32) -> RgbaImage {
    let (window, placement) = layout(preset, source.width(), source.height(), canvas);
    let scaled = source
        .crop_imm(window.x, window.y, window.width, window.height)
        .resize_exact(placement.width, placement.height, FilterType::Lanczos3)
        .to_rgba8();
    let mut out = RgbaImage::new(canvas, canvas);
    imageops::overlay(&mut out, &scaled, placement.x as i64, placement.y as i64);
    out
}

fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Render a `data:` URL payload with `preset` and return a PNG `data:` URL.
pub fn render_data_url(data_url: &str, preset: Preset, canvas: u32) -> Result<String> {
    let (_, bytes) = decode_data_url(data_url)?;
    let source = image::load_from_memory(&bytes)?;
    let png = encode_png(&render(&source, preset, canvas))?;
    Ok(to_data_url("image/png", &png))
}

/// Preview of `id` at thumbnail size; nothing is stored.
pub fn thumbnail(registry: &ImageRegistry, id: &str, preset: Preset) -> Result<String> {
    let data = registry
        .resolve(id)
        .ok_or_else(|| CoreError::UnknownImage(id.to_owned()))?;
    render_data_url(data, preset, THUMBNAIL_SIZE)
}

/// Apply `preset` to image `id` and store the result under the same id.
///
/// Returns the new payload.
pub fn apply(registry: &mut ImageRegistry, id: &str, preset: Preset) -> Result<String> {
    let data = registry
        .resolve(id)
        .ok_or_else(|| CoreError::UnknownImage(id.to_owned()))?;
    let edited = render_data_url(data, preset, SAVE_SIZE)?;
    let now = Utc::now();
    registry.replace(StoredImage {
        id: id.to_owned(),
        data: edited.clone(),
        filename: format!("edited_{}.png", now.timestamp_millis()),
        size: edited.len() as u64,
        mime_type: "image/png".to_owned(),
        uploaded_at: timestamp(now),
    })?;
    info!(image_id = %id, preset = preset.as_str(), "image edited");
    Ok(edited)
}
