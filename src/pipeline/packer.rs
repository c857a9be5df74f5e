// Wiring remap, 24-bit packing and per-animation slicing into addressed .bin files

use anyhow::{Context, Result, bail};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::model::{FRAME_HEIGHT, FRAME_WIDTH, Frame, MANIFEST_FILE, Manifest};

use super::address::FrameAddress;
use super::text_frames::{count_frames, frame_file_path, read_frame_text};

/// Physical strips are wired in groups of eight, each group running bottom to top.
pub const WIRING_GROUP: u32 = 8;
pub const BYTES_PER_PIXEL: usize = 3;

/// Row of the logical frame that feeds super-strip `strip`. Its own inverse.
pub fn remap_row(strip: u32) -> u32 {
    (strip / WIRING_GROUP) * WIRING_GROUP + (WIRING_GROUP - 1 - strip % WIRING_GROUP)
}

pub fn packed_len(width: u32, height: u32) -> usize {
    (width * height) as usize * BYTES_PER_PIXEL
}

fn check_geometry(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || height % WIRING_GROUP != 0 {
        bail!(
            "Frame of {}x{} cannot be mapped onto strips grouped by {}",
            width,
            height,
            WIRING_GROUP
        );
    }
    Ok(())
}

/// Serialize a frame in wiring order: super-strips 0.. in order, each sourced from
/// its remapped row with pixels right to left, 3 bytes big-endian per pixel.
pub fn pack_frame(frame: &Frame) -> Result<Vec<u8>> {
    let (width, height) = (frame.width(), frame.height());
    check_geometry(width, height)?;

    let mut packed = Vec::with_capacity(packed_len(width, height));
    for strip in 0..height {
        let row = remap_row(strip);
        for x in (0..width).rev() {
            let (r, g, b) = frame.get(x, row);
            let value = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
            packed.write_u24::<BigEndian>(value)?;
        }
    }

    debug_assert_eq!(packed.len(), packed_len(width, height));
    Ok(packed)
}

/// Inverse of [`pack_frame`].
pub fn unpack_frame(data: &[u8], width: u32, height: u32) -> Result<Frame> {
    check_geometry(width, height)?;
    if data.len() != packed_len(width, height) {
        bail!(
            "Packed frame is {} bytes, expected {}",
            data.len(),
            packed_len(width, height)
        );
    }

    let mut frame = Frame::new(width, height);
    let mut cursor = Cursor::new(data);
    for strip in 0..height {
        let row = remap_row(strip);
        for x in (0..width).rev() {
            let value = cursor.read_u24::<BigEndian>()?;
            frame.set(
                x,
                row,
                ((value >> 16) as u8, (value >> 8) as u8, value as u8),
            );
        }
    }
    Ok(frame)
}

pub fn read_packed_frame(path: &Path) -> Result<Frame> {
    let data =
        fs::read(path).with_context(|| format!("Failed to read packed frame {}", path.display()))?;
    unpack_frame(&data, FRAME_WIDTH, FRAME_HEIGHT)
}

pub fn animation_dir_name(number: usize) -> String {
    format!("A{}", number)
}

#[derive(Debug, Clone)]
pub struct PackedAnimation {
    pub name: String,
    pub frames: usize,
}

/// Pack every contiguous text frame of one animation into `out_dir`.
pub fn pack_animation<F>(
    text_dir: &Path,
    out_dir: &Path,
    width: u32,
    height: u32,
    mut log_fn: F,
) -> Result<usize>
where
    F: FnMut(String),
{
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let counted = count_frames(text_dir)?;
    if !counted.stray.is_empty() {
        log_fn(format!(
            "Warning: {} has a gap at frame {}; ignoring {} later frame(s)",
            text_dir.display(),
            counted.count,
            counted.stray.len()
        ));
    }

    for index in 0..counted.count {
        let address = FrameAddress::for_index(index)?;
        let frame = read_frame_text(&frame_file_path(text_dir, index), width, height)
            .with_context(|| format!("Frame {} of {}", index, text_dir.display()))?;
        let packed = pack_frame(&frame)?;

        let frame_dir = out_dir.join(address.dir_path());
        fs::create_dir_all(&frame_dir)
            .with_context(|| format!("Failed to create {}", frame_dir.display()))?;
        let frame_path = frame_dir.join(address.file_name());
        fs::write(&frame_path, &packed)
            .with_context(|| format!("Failed to write {}", frame_path.display()))?;
    }

    Ok(counted.count)
}

/// Animation directories under `text_root`, sorted by name.
pub fn list_animations(text_root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(text_root)
        .with_context(|| format!("Failed to list {}", text_root.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(dirs)
}

/// Pack every animation under `text_root` into `animations_root/A<n>` and record
/// their frame counts in the manifest, in the same order.
pub fn pack_all<F, P>(
    text_root: &Path,
    animations_root: &Path,
    mut log_fn: F,
    mut on_packed: P,
) -> Result<Manifest>
where
    F: FnMut(String),
    P: FnMut(usize, &PackedAnimation),
{
    fs::create_dir_all(animations_root)?;
    let mut manifest = Manifest::create(&animations_root.join(MANIFEST_FILE))?;

    let animations = list_animations(text_root)?;
    log_fn(format!("Packing {} animation(s)", animations.len()));

    for (number, text_dir) in animations.iter().enumerate() {
        let name = text_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_dir = animations_root.join(animation_dir_name(number));

        let frames = pack_animation(text_dir, &output_dir, FRAME_WIDTH, FRAME_HEIGHT, &mut log_fn)
            .with_context(|| format!("Failed to pack animation {} ({})", number, name))?;
        manifest.append(frames)?;
        on_packed(number, &PackedAnimation { name, frames });
    }

    Ok(manifest)
}
