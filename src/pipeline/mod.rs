pub mod address;
pub mod batch;
pub mod color;
pub mod encoder;
pub mod extractor;
pub mod fs_ops;
pub mod packer;
pub mod preview;
pub mod source;
pub mod text_frames;

pub use address::{FrameAddress, MAX_FRAME_INDEX, path_for};
pub use batch::{RunSummary, Stage, run_batch};
pub use color::scale_colors;
pub use extractor::FrameExtractor;
pub use packer::{pack_all, pack_animation, pack_frame, remap_row, unpack_frame};

#[cfg(test)]
mod pipeline_test;
