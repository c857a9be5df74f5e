// End-to-end run: clean outputs, encode every source, pack every animation

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::event::AppMsg;

use super::encoder::{discard_outputs, encode_source};
use super::fs_ops::{clear_dir_contents, ensure_dir};
use super::packer::pack_all;
use super::source::MediaKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    All,
    Encode,
    Pack,
}

impl Stage {
    fn encodes(&self) -> bool {
        matches!(self, Stage::All | Stage::Encode)
    }

    fn packs(&self) -> bool {
        matches!(self, Stage::All | Stage::Pack)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sources_encoded: usize,
    pub sources_failed: usize,
    /// Frame count per packed animation, in manifest order.
    pub frame_counts: Vec<usize>,
}

impl RunSummary {
    pub fn total_frames(&self) -> usize {
        self.frame_counts.iter().sum()
    }
}

/// Supported media directly inside `input_dir`, sorted by file name.
pub fn scan_sources(input_dir: &Path) -> Result<Vec<(PathBuf, MediaKind)>> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to scan {}", input_dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(kind) = MediaKind::from_path(path) {
            sources.push((path.to_path_buf(), kind));
        }
    }
    Ok(sources)
}

fn clean_outputs<F>(config: &Config, notify: &mut F) -> Result<()>
where
    F: FnMut(AppMsg),
{
    for dir in config.generated_dirs() {
        let removed = clear_dir_contents(&dir)
            .with_context(|| format!("Failed to clear {}", dir.display()))?;
        notify(AppMsg::LogMessage(format!(
            "Cleared {} ({} entries)",
            dir.display(),
            removed
        )));
    }
    Ok(())
}

fn encode_all<F>(config: &Config, summary: &mut RunSummary, notify: &mut F) -> Result<()>
where
    F: FnMut(AppMsg),
{
    let sources = scan_sources(&config.input_dir)?;
    let total = sources.len();
    if total == 0 {
        notify(AppMsg::LogMessage(format!(
            "No supported media found in {}",
            config.input_dir.display()
        )));
        return Ok(());
    }

    notify(AppMsg::LogMessage(format!(
        "Found {} source file(s) to encode",
        total
    )));

    for (idx, (path, kind)) in sources.iter().enumerate() {
        notify(AppMsg::LogMessage(format!(
            "Encoding {}/{}: {} ({:?})",
            idx + 1,
            total,
            path.display(),
            kind
        )));

        match encode_source(path, *kind, config, |msg| notify(AppMsg::LogMessage(msg))) {
            Ok(encoded) => {
                if let Some(preview) = &encoded.preview {
                    notify(AppMsg::LogMessage(format!("  preview {}", preview.display())));
                }
                summary.sources_encoded += 1;
            }
            Err(e) => {
                notify(AppMsg::ErrorOccurred(format!("{}: {:#}", path.display(), e)));
                // Nothing from a half-encoded source may reach the packer
                discard_outputs(path, *kind, config).with_context(|| {
                    format!("Failed to remove partial output of {}", path.display())
                })?;
                summary.sources_failed += 1;
            }
        }

        notify(AppMsg::PipelineProgress(idx + 1, total));
    }

    Ok(())
}

/// Run the configured stages in order, reporting through `notify`.
///
/// A source that fails while encoding is reported, its partial output is removed and
/// the run moves on. A corrupt text frame during packing aborts the run.
pub fn run_batch<F>(config: &Config, stage: Stage, mut notify: F) -> Result<RunSummary>
where
    F: FnMut(AppMsg),
{
    let mut summary = RunSummary::default();
    notify(AppMsg::PipelineStarted);

    if stage.encodes() {
        if config.clean_outputs {
            clean_outputs(config, &mut notify)?;
        }
        ensure_dir(&config.text_dir)?;
        encode_all(config, &mut summary, &mut notify)?;
    }

    if stage.packs() {
        ensure_dir(&config.text_dir)?;
        let animations_dir = config.animations_dir();
        if !stage.encodes() && config.clean_outputs {
            clear_dir_contents(&animations_dir)?;
        }

        let mut packed = Vec::new();
        let manifest = pack_all(
            &config.text_dir,
            &animations_dir,
            |msg| notify(AppMsg::LogMessage(msg)),
            |index, animation| packed.push((index, animation.name.clone(), animation.frames)),
        )?;
        for (index, name, frames) in packed {
            notify(AppMsg::AnimationPacked {
                index,
                name,
                frames,
            });
        }
        summary.frame_counts = manifest.counts;
    }

    notify(AppMsg::PipelineCompleted(summary.clone()));
    Ok(summary)
}
