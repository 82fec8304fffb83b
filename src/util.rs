/// Shared filesystem helpers.
pub mod fs {
    use std::fs;
    use std::io;

    use camino::{Utf8Path, Utf8PathBuf};

    /// Ensure a directory exists, creating it recursively if needed.
    pub fn ensure_dir(path: &Utf8Path) -> io::Result<()> {
        if !path.is_dir() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Resolve `path` against `base` unless it is already absolute.
    pub fn resolve_from(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            base.join(path)
        }
    }

}
