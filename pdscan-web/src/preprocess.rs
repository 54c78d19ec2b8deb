//! Image preprocessing for classifier input
//!
//! Decodes an uploaded PNG/JPEG, converts it to RGB, resizes directly to
//! 128×128 (no aspect-ratio preservation), scales to [0,1] and lays it out
//! as a single-image NHWC batch of shape (1, 128, 128, 3).

use image::imageops::FilterType;
use image::DynamicImage;
use pdscan_common::{Error, Result};
use tracing::debug;

/// Square input edge expected by every modality classifier
pub const INPUT_SIZE: u32 = 128;

/// Color channels expected by every modality classifier
pub const INPUT_CHANNELS: usize = 3;

/// Tensor shape: batch, height, width, channels
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, INPUT_CHANNELS];

/// Preprocessed classifier input, row-major NHWC f32 in [0,1]
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
}

impl ImageTensor {
    pub fn shape(&self) -> [usize; 4] {
        INPUT_SHAPE
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value at (row, col, channel) of the single batch entry
    pub fn get(&self, row: usize, col: usize, channel: usize) -> f32 {
        let width = INPUT_SIZE as usize;
        self.data[(row * width + col) * INPUT_CHANNELS + channel]
    }
}

/// Decode raw upload bytes
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(Error::InvalidInput("Uploaded image is empty".to_string()));
    }
    image::load_from_memory(bytes)
        .map_err(|e| Error::InvalidInput(format!("Could not decode image: {}", e)))
}

/// Convert a decoded image into classifier input
pub fn preprocess(image: &DynamicImage) -> ImageTensor {
    debug!(
        "Preprocessing {}x{} {:?} image",
        image.width(),
        image.height(),
        image.color()
    );

    // Channel conversion happens before the resize
    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let data = resized
        .pixels()
        .flat_map(|p| p.0.into_iter().map(|c| c as f32 / 255.0))
        .collect();

    ImageTensor { data }
}

/// Decode and preprocess in one step
pub fn preprocess_bytes(bytes: &[u8]) -> Result<ImageTensor> {
    let image = decode_image(bytes)?;
    Ok(preprocess(&image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(image: DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn assert_normalized(tensor: &ImageTensor) {
        assert_eq!(tensor.shape(), [1, 128, 128, 3]);
        assert_eq!(tensor.data().len(), 128 * 128 * 3);
        assert!(tensor.data().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_rgb_non_square_resized() {
        let img = RgbImage::from_pixel(300, 40, Rgb([255, 0, 51]));
        let tensor = preprocess(&DynamicImage::ImageRgb8(img));
        assert_normalized(&tensor);
        assert!((tensor.get(64, 64, 0) - 1.0).abs() < 1e-6);
        assert!(tensor.get(64, 64, 1).abs() < 1e-6);
        assert!((tensor.get(0, 127, 2) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_grayscale_expands_to_three_channels() {
        let img = GrayImage::from_pixel(50, 70, Luma([102]));
        let tensor = preprocess(&DynamicImage::ImageLuma8(img));
        assert_normalized(&tensor);
        for channel in 0..3 {
            assert!((tensor.get(10, 10, channel) - 0.4).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let img = RgbaImage::from_pixel(128, 128, Rgba([0, 255, 0, 10]));
        let tensor = preprocess(&DynamicImage::ImageRgba8(img));
        assert_normalized(&tensor);
        assert!((tensor.get(5, 5, 1) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_bytes_png() {
        let bytes = encode_png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            16,
            16,
            Rgb([0, 0, 0]),
        )));
        let tensor = preprocess_bytes(&bytes).unwrap();
        assert_normalized(&tensor);
        assert!(tensor.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(matches!(
            preprocess_bytes(b"definitely not an image"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(preprocess_bytes(&[]), Err(Error::InvalidInput(_))));
    }
}
