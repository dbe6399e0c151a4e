//! CPU-side texture decoding
//!
//! MTL texture maps are decoded to RGBA8 with the `image` crate before a texture loader
//! hands them to the device.

use std::path::Path;

use crate::render::backend::TextureLoadError;

/// Decoded RGBA8 pixels
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Row-major RGBA pixels, top row first
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ImageData {
    /// Decode an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureLoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TextureLoadError::NotFound(path.to_path_buf()));
        }

        let rgba = image::open(path)
            .map_err(|e| TextureLoadError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("Decoded texture {}x{} from {:?}", width, height, path);

        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Copy with the rows reversed, for APIs whose texture origin is bottom-left
    pub fn flipped_vertically(&self) -> Self {
        let row = self.width as usize * 4;
        let data = if row == 0 {
            Vec::new()
        } else {
            self.data.chunks_exact(row).rev().flatten().copied().collect()
        };
        Self {
            data,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_and_flip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stripes.png");
        let mut img = image::RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        img.save(&path).unwrap();

        let decoded = ImageData::from_file(&path).unwrap();
        assert_eq!(decoded.size_bytes(), 8);
        assert_eq!(&decoded.data[0..4], &[255, 0, 0, 255]);

        let flipped = decoded.flipped_vertically();
        assert_eq!(&flipped.data[0..4], &[0, 0, 255, 255]);
        assert_eq!(&flipped.data[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        assert!(matches!(
            ImageData::from_file(&path),
            Err(TextureLoadError::Decode { .. })
        ));
    }
}
