// Source media -> color-corrected text frames (+ optional preview)

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

use super::address::MAX_FRAME_INDEX;
use super::extractor::FrameExtractor;
use super::fs_ops::remove_path;
use super::preview::{AnimatedPreview, write_still_preview};
use super::source::{FrameSource, MediaKind, open_source};
use super::text_frames::{frame_file_path, write_frame_text};

#[derive(Debug, Clone)]
pub struct EncodedSource {
    pub name: String,
    pub kind: MediaKind,
    pub frames: usize,
    pub text_dir: PathBuf,
    pub preview: Option<PathBuf>,
}

/// Where a source's preview goes, if previews are enabled.
#[derive(Debug, Clone)]
pub enum PreviewTarget {
    Still(PathBuf),
    Animated { path: PathBuf, default_delay_ms: u32 },
}

impl PreviewTarget {
    pub fn path(&self) -> &Path {
        match self {
            PreviewTarget::Still(path) => path,
            PreviewTarget::Animated { path, .. } => path,
        }
    }
}

/// Frames written for one source, and the preview file if one was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrames {
    pub frames: usize,
    pub preview: Option<PathBuf>,
}

/// Animation directory name for a source: its full file name, so `clip.gif` and
/// `clip.mp4` never share a directory.
pub fn animation_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "source".to_string())
}

pub fn preview_target(config: &Config, name: &str, kind: MediaKind) -> Option<PreviewTarget> {
    if !config.write_previews {
        return None;
    }
    if kind.is_animated() {
        Some(PreviewTarget::Animated {
            path: config.sample_animation_dir().join(format!("{}.gif", name)),
            default_delay_ms: config.preview_delay_ms,
        })
    } else {
        Some(PreviewTarget::Still(
            config.sample_images_dir().join(format!("{}.jpg", name)),
        ))
    }
}

/// Drain `source` into `<animation_dir>/<index>.txt`, one file per frame.
pub fn encode_frames(
    source: &mut dyn FrameSource,
    extractor: &FrameExtractor,
    animation_dir: &Path,
    preview: Option<&PreviewTarget>,
) -> Result<EncodedFrames> {
    fs::create_dir_all(animation_dir)
        .with_context(|| format!("Failed to create {}", animation_dir.display()))?;

    let mut animated = match preview {
        Some(PreviewTarget::Animated { path, .. }) => Some(AnimatedPreview::new(path)),
        _ => None,
    };
    let mut still_preview = None;

    let mut index = 0;
    while let Some(source_frame) = source.next_frame()? {
        if index > MAX_FRAME_INDEX {
            bail!(
                "{} has more than {} frames",
                animation_dir.display(),
                MAX_FRAME_INDEX + 1
            );
        }

        let resampled = extractor.resample(&source_frame.image);
        let frame = extractor.finish(&resampled);
        write_frame_text(&frame, &frame_file_path(animation_dir, index))
            .with_context(|| format!("Failed to write frame {}", index))?;

        match preview {
            Some(PreviewTarget::Still(path)) if index == 0 => {
                write_still_preview(&resampled, path)?;
                still_preview = Some(path.clone());
            }
            Some(PreviewTarget::Animated {
                default_delay_ms, ..
            }) => {
                if let Some(animated) = animated.as_mut() {
                    let delay = source_frame.delay_ms.unwrap_or(*default_delay_ms);
                    animated.push(&resampled, delay)?;
                }
            }
            _ => {}
        }

        index += 1;
    }

    let preview = match animated {
        Some(animated) => animated.finish()?,
        None => still_preview,
    };

    Ok(EncodedFrames {
        frames: index,
        preview,
    })
}

pub fn encode_source<F>(
    path: &Path,
    kind: MediaKind,
    config: &Config,
    mut log_fn: F,
) -> Result<EncodedSource>
where
    F: FnMut(String),
{
    let name = animation_name(path);
    let text_dir = config.text_dir.join(&name);
    let extractor = FrameExtractor::new().with_color_correction(config.color_correction);
    let preview = preview_target(config, &name, kind);

    let mut source = open_source(path, kind, &config.ffmpeg)?;
    let encoded = encode_frames(source.as_mut(), &extractor, &text_dir, preview.as_ref())
        .with_context(|| format!("Failed to encode {}", path.display()))?;

    log_fn(format!(
        "  {} frame(s) written to {}",
        encoded.frames,
        text_dir.display()
    ));

    Ok(EncodedSource {
        name,
        kind,
        frames: encoded.frames,
        text_dir,
        preview: encoded.preview,
    })
}

/// Remove the text frames and preview a source may have left behind, so a source
/// that failed partway never reaches the packer or the manifest.
pub fn discard_outputs(path: &Path, kind: MediaKind, config: &Config) -> Result<()> {
    let name = animation_name(path);
    remove_path(config.text_dir.join(&name))?;
    if let Some(target) = preview_target(config, &name, kind) {
        remove_path(target.path())?;
    }
    Ok(())
}
