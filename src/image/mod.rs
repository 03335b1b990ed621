//! Photo preparation before a word lookup
//!
//! Crops a captured frame to the focus region and re-encodes it as JPEG so
//! the backend only sees the subject.

use crate::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::str::FromStr;

/// JPEG quality used for the re-encoded crop.
pub const CAPTURE_JPEG_QUALITY: u8 = 80;

/// Focus region in percentages of the frame (0..=100).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Default for CropRegion {
    fn default() -> Self {
        Self {
            x: 10.0,
            y: 10.0,
            w: 80.0,
            h: 80.0,
        }
    }
}

impl CropRegion {
    pub fn full_frame() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 100.0,
            h: 100.0,
        }
    }

    fn validate(&self) -> Result<()> {
        let in_range = |v: f32| v.is_finite() && (0.0..=100.0).contains(&v);
        if !(in_range(self.x) && in_range(self.y) && in_range(self.w) && in_range(self.h)) {
            return Err(Error::Config(format!("Crop values out of range: {:?}", self)));
        }
        if self.w <= 0.0 || self.h <= 0.0 || self.x + self.w > 100.0 || self.y + self.h > 100.0 {
            return Err(Error::Config(format!("Crop region leaves the frame: {:?}", self)));
        }
        Ok(())
    }

    /// Pixel rectangle `(x, y, width, height)` for a frame, at least 1x1.
    pub fn to_pixels(&self, frame_width: u32, frame_height: u32) -> (u32, u32, u32, u32) {
        let scale = |percent: f32, size: u32| ((percent / 100.0) * size as f32).round() as u32;

        let x = scale(self.x, frame_width).min(frame_width.saturating_sub(1));
        let y = scale(self.y, frame_height).min(frame_height.saturating_sub(1));
        let w = scale(self.w, frame_width).clamp(1, frame_width - x);
        let h = scale(self.h, frame_height).clamp(1, frame_height - y);
        (x, y, w, h)
    }
}

impl FromStr for CropRegion {
    type Err = String;

    /// Parses `x,y,w,h` in percent.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let values: Vec<f32> = s
            .split(',')
            .map(|part| part.trim().parse::<f32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| format!("Invalid crop '{}': {}", s, e))?;

        match values.as_slice() {
            [x, y, w, h] => {
                let region = Self {
                    x: *x,
                    y: *y,
                    w: *w,
                    h: *h,
                };
                region.validate().map_err(|e| e.to_string())?;
                Ok(region)
            }
            _ => Err(format!("Invalid crop '{}'. Expected format: x,y,w,h", s)),
        }
    }
}

fn crop_and_encode(frame: &[u8], region: CropRegion) -> Result<Vec<u8>> {
    region.validate()?;

    let image = image::load_from_memory(frame)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::Invariant("Captured frame has no pixels".to_string()));
    }

    let (x, y, w, h) = region.to_pixels(image.width(), image.height());
    let cropped = DynamicImage::ImageRgb8(image.crop_imm(x, y, w, h).to_rgb8());

    let mut bytes = Vec::new();
    cropped.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, CAPTURE_JPEG_QUALITY))?;
    Ok(bytes)
}

/// Crop `frame` to `region` and re-encode it as JPEG off the async runtime.
pub async fn prepare_photo(frame: Vec<u8>, region: CropRegion) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || crop_and_encode(&frame, region))
        .await
        .map_err(|e| Error::Invariant(format!("Photo preparation task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    fn create_test_frame(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 120, 40, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_default_region_is_centered_80_percent() {
        assert_eq!(CropRegion::default().to_pixels(100, 50), (10, 5, 80, 40));
    }

    #[test]
    fn test_parse_region() {
        let region: CropRegion = "0, 25, 50,50".parse().unwrap();
        assert_eq!(
            region,
            CropRegion {
                x: 0.0,
                y: 25.0,
                w: 50.0,
                h: 50.0
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_regions() {
        assert!("10,10,80".parse::<CropRegion>().is_err());
        assert!("a,b,c,d".parse::<CropRegion>().is_err());
        assert!("50,50,60,10".parse::<CropRegion>().is_err());
        assert!("0,0,0,10".parse::<CropRegion>().is_err());
    }

    #[test]
    fn test_tiny_frame_still_yields_a_pixel() {
        assert_eq!(CropRegion::default().to_pixels(1, 1), (0, 0, 1, 1));
    }

    #[tokio::test]
    async fn test_prepare_photo_crops_and_encodes_jpeg() {
        let jpeg = prepare_photo(create_test_frame(100, 60), CropRegion::default())
            .await
            .unwrap();

        assert_eq!(&jpeg[..3], &[0xFF, 0xD8, 0xFF]);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (80, 48));
    }

    #[tokio::test]
    async fn test_prepare_photo_rejects_garbage() {
        let err = prepare_photo(vec![1, 2, 3], CropRegion::full_frame())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }
}
