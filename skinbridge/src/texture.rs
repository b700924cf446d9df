use anyhow::{Context, Result};
use bytes::Bytes;
use image::{RgbaImage, imageops};

/// Raw RGBA pixels with their dimensions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextureData {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    pub fn new(data: impl Into<Bytes>, width: u32, height: u32) -> Self {
        Self {
            data: data.into(),
            width,
            height,
        }
    }

    /// Zero sized texture used by sentinel resources
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decodes any image format the `image` crate recognises
    pub fn decode(encoded: &[u8]) -> Result<Self> {
        let image = image::ImageReader::new(std::io::Cursor::new(encoded))
            .with_guessed_format()?
            .decode()
            .context("Failed to decode image")?;
        Ok(Self::from_image(image.into_rgba8()))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height)
    }

    pub fn to_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec()).with_context(|| {
            format!(
                "Texture of {} bytes does not fit {}x{}",
                self.data.len(),
                self.width,
                self.height
            )
        })
    }
}

/// Halves the image until it is no wider than `width`, then places it in the top left of a
/// `width` x `height` transparent canvas
pub fn scale_to_width(image: RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut image = image;
    while image.width() > width {
        let (w, h) = (image.width() / 2, (image.height() / 2).max(1));
        image = imageops::resize(&image, w, h, imageops::FilterType::Triangle);
    }
    let mut canvas = RgbaImage::new(width, height);
    imageops::overlay(&mut canvas, &image, 0, 0);
    canvas
}

/// Draws `overlay` over a copy of `base` at the given pixel offset
pub fn composite(base: &TextureData, overlay: &TextureData, x: i64, y: i64) -> Result<TextureData> {
    let mut canvas = base.to_image()?;
    let overlay = overlay.to_image()?;
    imageops::overlay(&mut canvas, &overlay, x, y);
    Ok(TextureData::from_image(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(pixel))
    }

    #[test]
    fn test_scale_large_cape_down() {
        // 256x128 HD cape halves twice to 64x32
        let scaled = scale_to_width(solid(256, 128, [255, 0, 0, 255]), 64, 32);
        assert_eq!(scaled.dimensions(), (64, 32));
        assert_eq!(scaled.get_pixel(63, 31), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_scale_small_cape_is_padded() {
        let scaled = scale_to_width(solid(22, 17, [0, 255, 0, 255]), 64, 32);
        assert_eq!(scaled.dimensions(), (64, 32));
        assert_eq!(scaled.get_pixel(0, 0), &Rgba([0, 255, 0, 255]));
        assert_eq!(scaled.get_pixel(40, 20), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_composite_at_offset() {
        let base = TextureData::from_image(solid(64, 64, [10, 10, 10, 255]));
        let ears = TextureData::from_image(solid(14, 7, [200, 0, 0, 255]));
        let merged = composite(&base, &ears, 24, 0).unwrap().to_image().unwrap();
        assert_eq!(merged.get_pixel(24, 0), &Rgba([200, 0, 0, 255]));
        assert_eq!(merged.get_pixel(37, 6), &Rgba([200, 0, 0, 255]));
        assert_eq!(merged.get_pixel(23, 0), &Rgba([10, 10, 10, 255]));
        assert_eq!(merged.get_pixel(24, 7), &Rgba([10, 10, 10, 255]));
    }

    #[test]
    fn test_mismatched_dimensions() {
        let texture = TextureData::new(vec![0u8; 10], 4, 4);
        assert!(texture.to_image().is_err());
    }

    #[test]
    fn test_decode_bundled_png() {
        let texture = TextureData::decode(crate::assets::bundled("bedrock/skin/skin_steve.png").unwrap()).unwrap();
        assert_eq!((texture.width, texture.height), (64, 64));
        assert_eq!(texture.data.len(), 64 * 64 * 4);
    }
}
