//! Filesystem read/write boundary.
//!
//! Reads distinguish "not found" (`Ok(None)`, the caller skips or omits) from every other IO
//! failure (propagated). Writes create parent directories and overwrite existing files.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::Context;

use crate::foundation::error::{WardrobeError, WardrobeResult};

/// Read a whole file; `Ok(None)` when it does not exist.
pub fn read_optional(path: &Path) -> WardrobeResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("read '{}'", path.display()))
            .into()),
    }
}

/// Last-modified time of a regular file; `Ok(None)` when missing or not a file.
pub fn modified_optional(path: &Path) -> WardrobeResult<Option<SystemTime>> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("stat '{}'", path.display()))
                .into());
        }
    };
    if !meta.is_file() {
        return Ok(None);
    }
    let modified = meta
        .modified()
        .with_context(|| format!("read mtime of '{}'", path.display()))?;
    Ok(Some(modified))
}

/// Existence probe that never fails; any error counts as absent.
pub fn is_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Immediate entries of `dir`; `Ok(None)` when the directory does not exist.
pub fn read_dir_optional(dir: &Path) -> WardrobeResult<Option<Vec<fs::DirEntry>>> {
    let rd = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("list directory '{}'", dir.display()))
                .into());
        }
    };
    let mut entries = Vec::new();
    for entry in rd {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable entry"),
        }
    }
    Ok(Some(entries))
}

/// Write `bytes` to `path`, creating parent directories and overwriting any existing file.
pub fn write_creating_dirs(path: &Path, bytes: &[u8]) -> WardrobeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory '{}'", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

/// Normalize a public URL path or relative path.
///
/// The result uses `/` separators, drops `.` segments and any leading `/`, and rejects parent
/// traversals (`..`), absolute URLs with a scheme, and empty paths.
pub fn normalize_rel_path(source: &str) -> WardrobeResult<String> {
    let s = source.replace('\\', "/");
    if s.contains("://") {
        return Err(WardrobeError::validation(format!(
            "remote urls are not supported: '{source}'"
        )));
    }
    let s = s.split(['?', '#']).next().unwrap_or_default();

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(WardrobeError::validation("paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(WardrobeError::validation("path must contain a file name"));
    }

    Ok(out.join("/"))
}

/// Percent-encode an arbitrary key into a single file name component.
///
/// Distinct keys always map to distinct names; `/`, `?`, `#` and `.` segments survive intact.
pub fn key_file_name(key: &str, extension: &str) -> String {
    let stem = url::form_urlencoded::byte_serialize(key.as_bytes()).collect::<String>();
    format!("{stem}.{extension}")
}

/// Resolve a public URL (e.g. `/items/hat.png`) to a file under `root`.
pub fn resolve_public(root: &Path, url: &str) -> WardrobeResult<PathBuf> {
    Ok(root.join(normalize_rel_path(url)?))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fsio.rs"]
mod tests;
