// Library exports for ledceiling

pub mod config;
pub mod event;
pub mod model;
pub mod pipeline;
pub mod pipeline_worker;

// Re-export commonly used types
pub use model::{FRAME_HEIGHT, FRAME_WIDTH, Frame, Manifest};
pub use pipeline::{FrameAddress, Stage, run_batch};
