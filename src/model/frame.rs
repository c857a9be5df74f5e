use anyhow::{Result, bail};
use image::RgbImage;

pub const FRAME_WIDTH: u32 = 155;
pub const FRAME_HEIGHT: u32 = 48;

pub type Rgb = (u8, u8, u8);

/// One display frame as a contiguous row-major RGB buffer. Row 0 is the visual top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 3) as usize],
        }
    }

    /// A black frame at the panel geometry.
    pub fn blank() -> Self {
        Self::new(FRAME_WIDTH, FRAME_HEIGHT)
    }

    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let mut frame = Self::new(width, height);
        for px in frame.data.chunks_exact_mut(3) {
            px[0] = color.0;
            px[1] = color.1;
            px[2] = color.2;
        }
        frame
    }

    pub fn from_pixels(width: u32, height: u32, pixels: &[Rgb]) -> Result<Self> {
        let expected = (width * height) as usize;
        if pixels.len() != expected {
            bail!(
                "Expected {} pixels for a {}x{} frame, got {}",
                expected,
                width,
                height,
                pixels.len()
            );
        }
        let mut data = Vec::with_capacity(expected * 3);
        for &(r, g, b) in pixels {
            data.extend_from_slice(&[r, g, b]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_image(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.as_raw().clone(),
        }
    }

    pub fn to_image(&self) -> RgbImage {
        // Buffer length always matches width * height * 3
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        ((y * self.width + x) * 3) as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Rgb {
        let i = self.offset(x, y);
        (self.data[i], self.data[i + 1], self.data[i + 2])
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgb) {
        let i = self.offset(x, y);
        self.data[i] = color.0;
        self.data[i + 1] = color.1;
        self.data[i + 2] = color.2;
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.data.chunks_exact(3).map(|px| (px[0], px[1], px[2]))
    }

    pub fn map_pixels<F>(&mut self, mut f: F)
    where
        F: FnMut(Rgb) -> Rgb,
    {
        for px in self.data.chunks_exact_mut(3) {
            let (r, g, b) = f((px[0], px[1], px[2]));
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_geometry() {
        let frame = Frame::blank();
        assert_eq!(frame.width(), 155);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.pixel_count(), 7440);
        assert!(frame.pixels().all(|px| px == (0, 0, 0)));
    }

    #[test]
    fn test_set_get_row_major() {
        let mut frame = Frame::new(4, 3);
        frame.set(1, 2, (10, 20, 30));
        assert_eq!(frame.get(1, 2), (10, 20, 30));
        assert_eq!(frame.pixels().nth(2 * 4 + 1), Some((10, 20, 30)));
    }

    #[test]
    fn test_from_pixels_rejects_wrong_count() {
        let pixels = vec![(1, 2, 3); 5];
        assert!(Frame::from_pixels(2, 2, &pixels).is_err());
        assert!(Frame::from_pixels(5, 1, &pixels).is_ok());
    }

    #[test]
    fn test_image_round_trip() {
        let mut frame = Frame::new(3, 2);
        frame.set(2, 1, (200, 100, 50));
        let image = frame.to_image();
        assert_eq!(image.get_pixel(2, 1).0, [200, 100, 50]);
        assert_eq!(Frame::from_image(&image), frame);
    }

    #[test]
    fn test_map_pixels() {
        let mut frame = Frame::filled(2, 2, (1, 2, 3));
        frame.map_pixels(|(r, g, b)| (b, g, r));
        assert!(frame.pixels().all(|px| px == (3, 2, 1)));
    }
}
