use anyhow::{Context, Result, bail};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame as ImageFrame, ImageFormat, RgbImage};
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

pub fn write_still_preview(image: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    image
        .save_with_format(path, ImageFormat::Jpeg)
        .with_context(|| format!("Failed to write preview {}", path.display()))?;
    Ok(())
}

/// GIF block terminator written by the encoder on drop.
const GIF_TRAILER: u8 = 0x3B;

/// Looping GIF written one resampled frame at a time. The file is only created once
/// the first frame arrives.
pub struct AnimatedPreview {
    path: PathBuf,
    output: Option<(GifEncoder<fs::File>, fs::File)>,
}

impl AnimatedPreview {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            output: None,
        }
    }

    fn open(&self) -> Result<(GifEncoder<fs::File>, fs::File)> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .with_context(|| format!("Failed to create preview {}", self.path.display()))?;
        let handle = file.try_clone()?;
        let mut encoder = GifEncoder::new(file);
        encoder.set_repeat(Repeat::Infinite)?;
        Ok((encoder, handle))
    }

    pub fn push(&mut self, image: &RgbImage, delay_ms: u32) -> Result<()> {
        let output = match self.output.take() {
            Some(output) => output,
            None => self.open()?,
        };
        let (encoder, _) = self.output.insert(output);

        let rgba = DynamicImage::ImageRgb8(image.clone()).to_rgba8();
        let frame = ImageFrame::from_parts(rgba, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1));
        encoder
            .encode_frame(frame)
            .with_context(|| format!("Failed to encode preview {}", self.path.display()))?;
        Ok(())
    }

    /// Close the GIF and check that its trailer reached the disk. `None` when no
    /// frame was ever pushed, in which case nothing was written.
    pub fn finish(self) -> Result<Option<PathBuf>> {
        let Some((encoder, mut handle)) = self.output else {
            return Ok(None);
        };
        // The trailer is written on drop and its error discarded
        drop(encoder);

        handle
            .sync_all()
            .with_context(|| format!("Failed to flush preview {}", self.path.display()))?;
        let mut last = [0u8; 1];
        handle.seek(SeekFrom::End(-1))?;
        handle.read_exact(&mut last)?;
        if last[0] != GIF_TRAILER {
            bail!("Preview {} is truncated", self.path.display());
        }
        Ok(Some(self.path))
    }
}
