pub mod frame;
pub mod manifest;

pub use frame::{FRAME_HEIGHT, FRAME_WIDTH, Frame, Rgb};
pub use manifest::{MANIFEST_FILE, Manifest};
