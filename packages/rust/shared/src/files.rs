//! File writing helpers.

use std::path::Path;

use tracing::debug;

use crate::error::{ManubuildError, Result};

/// Write `contents` next to `path` under a dot-prefixed temp name, then rename
/// over the target. Parent directories are created.
pub fn write_atomic(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    let contents = contents.as_ref();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| ManubuildError::io(dir, e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ManubuildError::validation(format!("not a file path: {}", path.display())))?;
    let temp = dir.join(format!(".{name}.tmp"));

    std::fs::write(&temp, contents).map_err(|e| ManubuildError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| ManubuildError::io(path, e))?;

    debug!(path = %path.display(), size = contents.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_replaces() {
        let dir = std::env::temp_dir().join(format!("mb-files-test-{}", uuid::Uuid::now_v7()));
        let target = dir.join("nested/out.bin");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, "second").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"second");
        assert!(!dir.join("nested/.out.bin.tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_directory_like_paths() {
        assert!(write_atomic(Path::new("/"), b"x").is_err());
    }
}
