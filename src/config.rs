use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ANIMATIONS_DIR: &str = "animations";
pub const SAMPLE_DIR: &str = "SAMPLE";
pub const SAMPLE_IMAGES_DIR: &str = "IMAGES";
pub const SAMPLE_ANIMATION_DIR: &str = "ANIMATION";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Photos, videos and GIFs to convert.
    pub input_dir: PathBuf,
    /// Intermediate text frames, one directory per animation.
    pub text_dir: PathBuf,
    /// Root for `animations/` and `SAMPLE/`.
    pub output_dir: PathBuf,
    pub color_correction: bool,
    pub write_previews: bool,
    pub clean_outputs: bool,
    /// Frame delay for video previews.
    pub preview_delay_ms: u32,
    pub ffmpeg: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./INPUT"),
            text_dir: PathBuf::from("./TXT"),
            output_dir: PathBuf::from("."),
            color_correction: true,
            write_previews: true,
            clean_outputs: true,
            preview_delay_ms: 33,
            ffmpeg: "ffmpeg".to_string(),
        }
    }
}

impl Config {
    pub fn animations_dir(&self) -> PathBuf {
        self.output_dir.join(ANIMATIONS_DIR)
    }

    pub fn sample_images_dir(&self) -> PathBuf {
        self.output_dir.join(SAMPLE_DIR).join(SAMPLE_IMAGES_DIR)
    }

    pub fn sample_animation_dir(&self) -> PathBuf {
        self.output_dir.join(SAMPLE_DIR).join(SAMPLE_ANIMATION_DIR)
    }

    /// Directories wiped at the start of a run when `clean_outputs` is set.
    pub fn generated_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.animations_dir(),
            self.text_dir.clone(),
            self.sample_animation_dir(),
            self.sample_images_dir(),
        ]
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ledceiling").join("config.toml"))
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let content = self
            .to_toml_string()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Explicit file if given, else the per-user file if present, else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> std::io::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(path),
            _ => Ok(Self::default()),
        }
    }
}
