use std::path::{Path, PathBuf};

use crate::error::Result;

const IGNORED_EXTENSIONS: &[&str] = &["stream", "gpu_resources", "ini", "data"];

/// True if `path` should be skipped by the extension policy: a recognized
/// non-archive sibling file, or any file whose name contains `patch`.
pub fn is_ignored(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if name.contains("patch") {
            return true;
        }
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => IGNORED_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Enumerates `dir` non-recursively and returns candidate archive paths,
/// sorted for deterministic downstream dispatch order.
pub fn list_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if is_ignored(&path) {
            log::trace!("{}: ignored by extension/name policy", path.display());
            continue;
        }
        out.push(path);
    }
    out.sort();
    log::debug!("{}: {} candidate archives", dir.display(), out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn ignores_known_sibling_extensions() {
        assert!(is_ignored(Path::new("foo.stream")));
        assert!(is_ignored(Path::new("foo.gpu_resources")));
        assert!(is_ignored(Path::new("foo.ini")));
        assert!(is_ignored(Path::new("foo.data")));
        assert!(!is_ignored(Path::new("foo.archive")));
    }

    #[test]
    fn ignores_patch_substring_regardless_of_extension() {
        assert!(is_ignored(Path::new("base_patch_001.archive")));
        assert!(is_ignored(Path::new("patchnotes.txt")));
    }

    #[test]
    fn lists_only_non_ignored_files_sorted() {
        let dir = std::env::temp_dir().join(format!(
            "audiodex-listing-test-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("b.archive"), b"").unwrap();
        fs::write(dir.join("a.archive"), b"").unwrap();
        fs::write(dir.join("skip.stream"), b"").unwrap();
        fs::write(dir.join("skip_patch_01.archive"), b"").unwrap();
        fs::create_dir_all(dir.join("subdir")).unwrap();

        let found = list_archives(&dir).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.archive".to_string(), "b.archive".to_string()]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
