// Digit-sharded directory addressing for packed frames

use anyhow::{Result, bail};
use std::fmt;
use std::path::PathBuf;

/// Highest frame index the four-level address can represent.
pub const MAX_FRAME_INDEX: usize = 99_999;

/// Four directory levels built from the tens through ten-thousands digits of a frame
/// index. The ones digit only appears in the file name, so no directory holds more
/// than ten entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAddress {
    pub index: usize,
    pub tens: u8,
    pub hundreds: u8,
    pub thousands: u8,
    pub ten_thousands: u8,
}

impl FrameAddress {
    pub fn for_index(index: usize) -> Result<Self> {
        if index > MAX_FRAME_INDEX {
            bail!(
                "Frame index {} exceeds the addressable limit of {}",
                index,
                MAX_FRAME_INDEX
            );
        }

        Ok(Self {
            index,
            tens: digit(index, 10),
            hundreds: digit(index, 100),
            thousands: digit(index, 1_000),
            ten_thousands: digit(index, 10_000),
        })
    }

    /// Segments from the outermost directory inwards.
    pub fn segments(&self) -> [String; 4] {
        [
            format!("TTH{}", self.ten_thousands),
            format!("TH{}", self.thousands),
            format!("H{}", self.hundreds),
            format!("T{}", self.tens),
        ]
    }

    pub fn dir_path(&self) -> PathBuf {
        self.segments().iter().collect()
    }

    pub fn file_name(&self) -> String {
        format!("F{}.bin", self.index)
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir_path().join(self.file_name())
    }
}

impl fmt::Display for FrameAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("/"))
    }
}

fn digit(index: usize, place: usize) -> u8 {
    (index / place % 10) as u8
}

pub fn path_for(index: usize) -> Result<PathBuf> {
    Ok(FrameAddress::for_index(index)?.dir_path())
}
