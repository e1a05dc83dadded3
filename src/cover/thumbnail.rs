use iced::widget::image::Handle;
use image::{imageops::FilterType, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Width of a card cover in pixels
pub const COVER_WIDTH: u32 = 100;

/// Height of a card cover in pixels
pub const COVER_HEIGHT: u32 = 150;

/// Extensions offered by the cover file picker
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decode an image file and stretch it to cover size
pub fn decode_cover(path: &Path) -> Result<RgbaImage, CoverError> {
    let img = image::open(path).map_err(|source| CoverError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(img
        .resize_exact(COVER_WIDTH, COVER_HEIGHT, FilterType::Triangle)
        .to_rgba8())
}

/// Blank image shown when a cover can't be loaded
pub fn placeholder() -> RgbaImage {
    RgbaImage::from_pixel(COVER_WIDTH, COVER_HEIGHT, Rgba([0, 0, 0, 0]))
}

/// Decode a cover, substituting the placeholder on any failure
pub fn cover_or_placeholder(path: &Path) -> RgbaImage {
    match decode_cover(path) {
        Ok(cover) => cover,
        Err(e) => {
            log::debug!("Using placeholder cover: {}", e);
            placeholder()
        }
    }
}

/// Convert decoded pixels into a handle the image widget can draw
pub fn to_handle(cover: RgbaImage) -> Handle {
    let (width, height) = cover.dimensions();
    Handle::from_rgba(width, height, cover.into_raw())
}

/// Load a cover for display.
/// Decoding is CPU-bound, so it runs on a blocking thread.
pub async fn load_cover(path: String) -> Handle {
    let cover = tokio::task::spawn_blocking(move || cover_or_placeholder(Path::new(&path)))
        .await
        .unwrap_or_else(|e| {
            log::debug!("Cover task join error: {}", e);
            placeholder()
        });

    to_handle(cover)
}
