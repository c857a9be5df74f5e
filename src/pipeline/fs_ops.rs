use std::fs;
use std::path::Path;

pub fn ensure_dir<P: AsRef<Path>>(p: P) -> std::io::Result<()> {
    if !p.as_ref().exists() {
        fs::create_dir_all(&p)?;
    }
    Ok(())
}

/// Remove everything inside `dir` but keep `dir` itself. Returns the number of
/// top-level entries removed.
pub fn clear_dir_contents<P: AsRef<Path>>(dir: P) -> std::io::Result<usize> {
    let dir = dir.as_ref();
    ensure_dir(dir)?;

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        removed += 1;
    }
    Ok(removed)
}

/// Delete a file or a whole directory tree. Missing paths are not an error; returns
/// whether anything was removed.
pub fn remove_path<P: AsRef<Path>>(path: P) -> std::io::Result<bool> {
    let path = path.as_ref();
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
