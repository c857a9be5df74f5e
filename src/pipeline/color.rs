// Red-dominance fringe correction applied to every encoded pixel

use crate::model::{Frame, Rgb};

/// Suppress green and blue in proportion to how strongly red dominates them.
///
/// The suppression factor for a channel is `(ratio / (ratio + 1))^2` where
/// `ratio = r / channel`. Zero channels enter the ratio as 1 but still scale the
/// true value, so they stay zero. Red is never changed.
pub fn scale_colors(r: u8, g: u8, b: u8) -> Rgb {
    (r, suppress(r, g), suppress(r, b))
}

fn suppress(r: u8, channel: u8) -> u8 {
    let ratio = f64::from(r) / f64::from(channel.max(1));
    let factor = (ratio / (ratio + 1.0)).powi(2);
    (f64::from(channel) * (1.0 - factor)).floor() as u8
}

pub fn correct_frame(frame: &mut Frame) {
    frame.map_pixels(|(r, g, b)| scale_colors(r, g, b));
}
