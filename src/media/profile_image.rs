use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use rand::Rng;

use crate::domain::error::DomainError;

/// Persists uploaded profile pictures as bounded thumbnails under a root
/// directory.
///
/// Each call writes exactly one new file named `<32-hex-chars>.<ext>`; the
/// random token carries 128 bits so collisions are negligible and nothing of
/// the original filename leaks except its extension. Superseded pictures are
/// intentionally left on disk — callers only ever learn the new filename.
#[derive(Debug, Clone)]
pub struct ProfileImageStore {
    root: PathBuf,
    max_dimension: u32,
}

impl ProfileImageStore {
    pub const DEFAULT_MAX_DIMENSION: u32 = 125;

    pub fn new(root: impl Into<PathBuf>, max_dimension: u32) -> Self {
        Self {
            root: root.into(),
            max_dimension,
        }
    }

    /// Validates, resizes and persists one uploaded image. Returns the
    /// generated filename (never a path) for assignment to the user record.
    ///
    /// The upstream form already restricts extensions, but the check is
    /// repeated here and fails with `UnsupportedFormat` on anything other
    /// than jpg/jpeg/png. Undecodable bytes fail with `UnreadableImage`,
    /// write errors with `StorageWrite`; in both cases no file name is
    /// returned, so the user record stays untouched.
    pub async fn store(
        &self,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<String, DomainError> {
        let (extension, format) = allowed_format(original_filename)?;

        let img = image::load_from_memory(bytes)
            .map_err(|err| DomainError::UnreadableImage(err.to_string()))?;
        let img = self.bound_dimensions(img);

        // jpeg has no alpha channel; an RGBA source uploaded under a jpg
        // name would otherwise fail at encode time
        let img = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
            _ => img,
        };

        let token: u128 = rand::rng().random();
        let filename = format!("{token:032x}.{extension}");

        let mut encoded = Vec::new();
        img.write_to(&mut Cursor::new(&mut encoded), format)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        tokio::fs::write(self.root.join(&filename), encoded)
            .await
            .map_err(DomainError::StorageWrite)?;

        Ok(filename)
    }

    fn bound_dimensions(&self, img: DynamicImage) -> DynamicImage {
        if img.width() > self.max_dimension || img.height() > self.max_dimension {
            // scales down preserving aspect ratio; small sources pass
            // through untouched
            img.thumbnail(self.max_dimension, self.max_dimension)
        } else {
            img
        }
    }
}

fn allowed_format(filename: &str) -> Result<(&'static str, ImageFormat), DomainError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" => Ok(("jpg", ImageFormat::Jpeg)),
        "jpeg" => Ok(("jpeg", ImageFormat::Jpeg)),
        "png" => Ok(("png", ImageFormat::Png)),
        _ => Err(DomainError::UnsupportedFormat(extension)),
    }
}
