//! Path normalization (§6.4) and the extract-to-disk naming convention
//! (§6.5).

use std::path::{Path, PathBuf};

/// Normalizes `target` to be relative to `db_dir`, the directory
/// containing the database file, per §6.4.
///
/// Mirrors what a relative-path algorithm like Go's `filepath.Rel` does:
/// if `target` can't be expressed relative to `db_dir` (different
/// Windows drive letters, or simply not nested under it), the cleaned
/// absolute path is stored instead.
pub fn normalize(db_dir: &Path, target: &Path) -> PathBuf {
    let target = clean(target);
    match target.strip_prefix(db_dir) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => target,
    }
}

/// Lexically cleans a path: resolves `.` and `..` components without
/// touching the filesystem (so it works for paths that don't exist yet,
/// unlike `Path::canonicalize`).
fn clean(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Picks a non-colliding filename for extracting `filename` as it existed
/// at `sid`, per §6.5: `<base>#<sid><ext>`, doubling the `#` until a free
/// name is found. `exists` is injected so this stays pure/testable rather
/// than probing the filesystem directly.
pub fn extract_filename(filename: &Path, sid: u32, exists: impl Fn(&Path) -> bool) -> PathBuf {
    let parent = filename.parent().unwrap_or_else(|| Path::new(""));
    let stem = filename.file_stem().unwrap_or_default().to_string_lossy().into_owned();
    let ext = filename
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut hashes = "#".to_string();
    loop {
        let candidate = parent.join(format!("{stem}{hashes}{sid}{ext}"));
        if !exists(&candidate) {
            return candidate;
        }
        hashes.push('#');
    }
}
