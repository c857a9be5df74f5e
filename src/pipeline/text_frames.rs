// Intermediate per-frame text files: one "R,G,B" line per pixel, row-major

use anyhow::{Context, Result, anyhow, bail};
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::model::{Frame, Rgb};

pub fn frame_file_name(index: usize) -> String {
    format!("{}.txt", index)
}

pub fn frame_file_path(animation_dir: &Path, index: usize) -> PathBuf {
    animation_dir.join(frame_file_name(index))
}

pub fn write_frame_text(frame: &Frame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create text frame {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for (r, g, b) in frame.pixels() {
        writeln!(writer, "{},{},{}", r, g, b)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn parse_pixel_line(line: &str) -> Result<Rgb> {
    let mut parts = line.trim().split(',');
    let mut channel = |name: &str| -> Result<u8> {
        let token = parts
            .next()
            .ok_or_else(|| anyhow!("missing {} channel in {:?}", name, line))?;
        token
            .trim()
            .parse::<u8>()
            .map_err(|e| anyhow!("invalid {} channel {:?}: {}", name, token, e))
    };

    let rgb = (channel("red")?, channel("green")?, channel("blue")?);
    if parts.next().is_some() {
        bail!("too many channels in {:?}", line);
    }
    Ok(rgb)
}

/// Read a text frame of exactly `width * height` pixel lines.
pub fn read_frame_text(path: &Path, width: u32, height: u32) -> Result<Frame> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read text frame {}", path.display()))?;

    let expected = (width * height) as usize;
    let mut pixels = Vec::with_capacity(expected);
    for (idx, line) in content.lines().enumerate() {
        if idx >= expected {
            if line.trim().is_empty() {
                continue;
            }
            bail!(
                "{}: more than {} pixel lines",
                path.display(),
                expected
            );
        }
        let rgb = parse_pixel_line(line)
            .with_context(|| format!("{}: malformed pixel on line {}", path.display(), idx + 1))?;
        pixels.push(rgb);
    }

    if pixels.len() != expected {
        bail!(
            "{}: expected {} pixel lines, found {}",
            path.display(),
            expected,
            pixels.len()
        );
    }

    Frame::from_pixels(width, height, &pixels)
}

/// Indices of `<n>.txt` files in an animation directory.
pub fn list_frame_indices(animation_dir: &Path) -> Result<BTreeSet<usize>> {
    let mut indices = BTreeSet::new();
    let entries = fs::read_dir(animation_dir)
        .with_context(|| format!("Failed to list {}", animation_dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_txt = path
            .extension()
            .map(|ext| ext == "txt")
            .unwrap_or(false);
        if !is_txt {
            continue;
        }
        let index = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
            .and_then(|s| s.parse::<usize>().ok());
        if let Some(index) = index {
            indices.insert(index);
        }
    }

    Ok(indices)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCount {
    /// Length of the contiguous run starting at index 0.
    pub count: usize,
    /// Files present after the first gap; never packed.
    pub stray: Vec<usize>,
}

/// Frames of an animation end at the first missing index.
pub fn count_frames(animation_dir: &Path) -> Result<FrameCount> {
    let indices = list_frame_indices(animation_dir)?;
    let mut count = 0;
    while indices.contains(&count) {
        count += 1;
    }
    let stray = indices.into_iter().filter(|&i| i > count).collect();
    Ok(FrameCount { count, stray })
}
