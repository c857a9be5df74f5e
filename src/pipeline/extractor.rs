// Crop and resample native frames down to the panel geometry

use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::model::{FRAME_HEIGHT, FRAME_WIDTH, Frame};

use super::color::correct_frame;

/// Rows `y..y + height` of the source across its full width. `y` is negative when
/// the band is taller than the source; rows outside the image read as black.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Full-width band of height `width / 2`, centered vertically with floor rounding.
pub fn strip_crop(width: u32, height: u32) -> CropRect {
    let band = width / 2;
    let top = (i64::from(height) - i64::from(band)).div_euclid(2);
    CropRect {
        y: top,
        width,
        height: band,
    }
}

/// Copy the band out of `image`, padding with black where it overhangs.
fn crop_band(image: &RgbImage, crop: CropRect) -> RgbImage {
    let (width, height) = (crop.width.max(1), crop.height.max(1));
    if crop.y >= 0 && crop.y + i64::from(height) <= i64::from(image.height()) {
        return imageops::crop_imm(image, 0, crop.y as u32, width, height).to_image();
    }

    let mut band = RgbImage::new(width, height);
    imageops::replace(&mut band, image, 0, -crop.y);
    band
}

#[derive(Debug, Clone)]
pub struct FrameExtractor {
    pub width: u32,
    pub height: u32,
    pub filter: FilterType,
    pub color_correction: bool,
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            filter: FilterType::Lanczos3,
            color_correction: true,
        }
    }
}

impl FrameExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color_correction(mut self, enabled: bool) -> Self {
        self.color_correction = enabled;
        self
    }

    /// Crop and resample without touching color. Used for previews as well.
    pub fn resample(&self, image: &RgbImage) -> RgbImage {
        let crop = strip_crop(image.width(), image.height());
        let cropped = crop_band(image, crop);
        imageops::resize(&cropped, self.width, self.height, self.filter)
    }

    pub fn extract(&self, image: &RgbImage) -> Frame {
        let resampled = self.resample(image);
        self.finish(&resampled)
    }

    /// Apply color correction to an already resampled image.
    pub fn finish(&self, resampled: &RgbImage) -> Frame {
        let mut frame = Frame::from_image(resampled);
        if self.color_correction {
            correct_frame(&mut frame);
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_strip_crop_tall_source() {
        let crop = strip_crop(1920, 1080);
        assert_eq!(
            crop,
            CropRect {
                y: 60,
                width: 1920,
                height: 960
            }
        );
    }

    #[test]
    fn test_strip_crop_exact_ratio() {
        let crop = strip_crop(310, 155);
        assert_eq!(crop.y, 0);
        assert_eq!(crop.height, 155);
    }

    #[test]
    fn test_strip_crop_odd_width_floors() {
        let crop = strip_crop(101, 100);
        assert_eq!(crop.height, 50);
        assert_eq!(crop.y, 25);
    }

    #[test]
    fn test_strip_crop_wide_source() {
        let crop = strip_crop(400, 100);
        assert_eq!(
            crop,
            CropRect {
                y: -50,
                width: 400,
                height: 200
            }
        );
        // Odd overhang rounds toward the top like floor division
        assert_eq!(strip_crop(402, 100).y, -51);
    }

    #[test]
    fn test_wide_source_padded_with_black() {
        let image = RgbImage::from_pixel(400, 100, Rgb([255, 255, 255]));
        let frame = FrameExtractor::new().with_color_correction(false).extract(&image);
        assert_eq!(frame.get(0, 0), (0, 0, 0));
        assert_eq!(frame.get(154, 47), (0, 0, 0));
        assert_eq!(frame.get(77, 24), (255, 255, 255));
        assert_eq!(frame.get(0, 23), (255, 255, 255));
    }

    #[test]
    fn test_crop_band_keeps_full_width() {
        let mut image = RgbImage::from_pixel(40, 10, Rgb([1, 1, 1]));
        image.put_pixel(39, 0, Rgb([9, 9, 9]));
        let band = crop_band(&image, strip_crop(40, 10));
        assert_eq!(band.dimensions(), (40, 20));
        assert_eq!(band.get_pixel(39, 5).0, [9, 9, 9]);
        assert_eq!(band.get_pixel(0, 4).0, [0, 0, 0]);
        assert_eq!(band.get_pixel(0, 15).0, [0, 0, 0]);
    }

    #[test]
    fn test_extract_geometry() {
        let image = RgbImage::from_pixel(640, 480, Rgb([10, 20, 30]));
        let frame = FrameExtractor::new().with_color_correction(false).extract(&image);
        assert_eq!(frame.width(), 155);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.pixel_count(), 7440);
    }

    #[test]
    fn test_solid_color_survives_resampling() {
        let image = RgbImage::from_pixel(400, 300, Rgb([0, 128, 255]));
        let frame = FrameExtractor::new().with_color_correction(false).extract(&image);
        assert!(frame.pixels().all(|px| px == (0, 128, 255)));
    }

    #[test]
    fn test_crop_discards_top_and_bottom() {
        // 200x200: only rows 50..150 survive the crop
        let mut image = RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]));
        for y in 50..150 {
            for x in 0..200 {
                image.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let frame = FrameExtractor::new().with_color_correction(false).extract(&image);
        assert!(frame.pixels().all(|px| px == (0, 0, 0)));
    }

    #[test]
    fn test_color_correction_applied() {
        let image = RgbImage::from_pixel(310, 96, Rgb([100, 100, 100]));
        let frame = FrameExtractor::new().extract(&image);
        assert!(frame.pixels().all(|px| px == (100, 75, 75)));
    }

    #[test]
    fn test_deterministic() {
        let mut image = RgbImage::new(321, 199);
        for (x, y, px) in image.enumerate_pixels_mut() {
            *px = Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8]);
        }
        let extractor = FrameExtractor::new();
        assert_eq!(extractor.extract(&image), extractor.extract(&image));
    }
}
