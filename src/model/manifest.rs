use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "frames.txt";

/// Per-animation frame counts, one line each, in processing order.
///
/// Lines are appended to disk as soon as an animation finishes so a controller never
/// sees a rewritten entry.
#[derive(Clone, Debug)]
pub struct Manifest {
    pub counts: Vec<usize>,
    path: PathBuf,
}

impl Manifest {
    /// Start an empty manifest file at `path`, truncating any previous run.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::File::create(path)
            .with_context(|| format!("Failed to create manifest {}", path.display()))?;
        Ok(Self {
            counts: Vec::new(),
            path: path.to_path_buf(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let counts = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                line.trim().parse::<usize>().with_context(|| {
                    format!("Invalid manifest entry on line {}: {:?}", idx + 1, line)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            counts,
            path: path.to_path_buf(),
        })
    }

    pub fn append(&mut self, count: usize) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open manifest {}", self.path.display()))?;
        writeln!(file, "{}", count)?;
        self.counts.push(count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_writes_one_line_per_animation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("animations").join(MANIFEST_FILE);

        let mut manifest = Manifest::create(&path).unwrap();
        manifest.append(12).unwrap();
        manifest.append(1).unwrap();
        manifest.append(0).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "12\n1\n0\n");
        assert_eq!(manifest.counts, vec![12, 1, 0]);

        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded.counts, vec![12, 1, 0]);
    }

    #[test]
    fn test_create_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "99\n").unwrap();

        let manifest = Manifest::create(&path).unwrap();
        assert!(manifest.counts.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "3\nabc\n").unwrap();

        let err = Manifest::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}
