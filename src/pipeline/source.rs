// Media decoding: stills, animated GIFs and videos as ordered native RGB frames

use anyhow::{Context, Result, anyhow};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, RgbImage};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Still,
    Video,
    Gif,
}

impl MediaKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "jpeg" | "jpg" | "png" => Some(MediaKind::Still),
            "mp4" | "mov" => Some(MediaKind::Video),
            "gif" => Some(MediaKind::Gif),
            _ => None,
        }
    }

    pub fn is_animated(&self) -> bool {
        !matches!(self, MediaKind::Still)
    }
}

#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub image: RgbImage,
    pub delay_ms: Option<u32>,
}

impl SourceFrame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            delay_ms: None,
        }
    }
}

/// Anything that yields native-resolution RGB frames in display order.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<SourceFrame>>;
}

pub struct StillSource {
    image: Option<RgbImage>,
}

impl StillSource {
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("Failed to decode image {}", path.display()))?;
        Ok(Self::from_image(&image))
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        Self {
            image: Some(image.to_rgb8()),
        }
    }
}

impl FrameSource for StillSource {
    fn next_frame(&mut self) -> Result<Option<SourceFrame>> {
        Ok(self.image.take().map(SourceFrame::new))
    }
}

pub struct GifSource {
    frames: std::vec::IntoIter<SourceFrame>,
}

impl GifSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open GIF {}", path.display()))?;
        let decoder = GifDecoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to decode GIF {}", path.display()))?;

        let mut frames = Vec::new();
        for frame in decoder.into_frames() {
            let frame = frame.with_context(|| format!("Corrupt frame in {}", path.display()))?;
            let (numer, denom) = frame.delay().numer_denom_ms();
            let delay_ms = if denom == 0 { 0 } else { numer / denom };
            // Frames come back composited onto the full canvas
            let image = DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8();
            frames.push(SourceFrame {
                image,
                delay_ms: Some(delay_ms),
            });
        }

        Ok(Self {
            frames: frames.into_iter(),
        })
    }
}

impl FrameSource for GifSource {
    fn next_frame(&mut self) -> Result<Option<SourceFrame>> {
        Ok(self.frames.next())
    }
}

/// Video frames dumped to PNG by ffmpeg into a scratch directory that lives as long
/// as the source.
pub struct VideoSource {
    _scratch: TempDir,
    frames: std::vec::IntoIter<PathBuf>,
}

pub fn ffmpeg_args(input: &Path, out_pattern: &Path) -> Vec<String> {
    vec![
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-vsync".into(),
        "0".into(),
        out_pattern.to_string_lossy().into_owned(),
    ]
}

impl VideoSource {
    pub fn open(path: &Path, ffmpeg: &str) -> Result<Self> {
        let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
        let pattern = scratch.path().join("frame_%06d.png");

        let status = Command::new(ffmpeg)
            .args(ffmpeg_args(path, &pattern))
            .status()
            .with_context(|| format!("Failed to run {}", ffmpeg))?;
        if !status.success() {
            return Err(anyhow!(
                "{} failed to decode {} ({})",
                ffmpeg,
                path.display(),
                status
            ));
        }

        let frames = collect_frame_files(scratch.path())?;
        Ok(Self {
            _scratch: scratch,
            frames: frames.into_iter(),
        })
    }
}

/// `frame_*.png` files in name order; ffmpeg zero-pads the counter.
fn collect_frame_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("frame_") && n.ends_with(".png"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

impl FrameSource for VideoSource {
    fn next_frame(&mut self) -> Result<Option<SourceFrame>> {
        match self.frames.next() {
            Some(path) => {
                let image = image::open(&path)
                    .with_context(|| format!("Failed to read video frame {}", path.display()))?;
                Ok(Some(SourceFrame::new(image.to_rgb8())))
            }
            None => Ok(None),
        }
    }
}

pub fn open_source(path: &Path, kind: MediaKind, ffmpeg: &str) -> Result<Box<dyn FrameSource>> {
    let source: Box<dyn FrameSource> = match kind {
        MediaKind::Still => Box::new(StillSource::open(path)?),
        MediaKind::Gif => Box::new(GifSource::open(path)?),
        MediaKind::Video => Box::new(VideoSource::open(path, ffmpeg)?),
    };
    Ok(source)
}
