//! Decoded image payloads.

use std::sync::Arc;

use image::DynamicImage;

use crate::error::FetchError;

/// A decoded image. Clones share the pixel buffer.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: Arc<DynamicImage>,
}

impl DecodedImage {
    /// Decode PNG or JPEG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, FetchError> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self {
            image: Arc::new(image),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Whether both handles point at the same decoded buffer.
    pub fn ptr_eq(&self, other: &DecodedImage) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}
