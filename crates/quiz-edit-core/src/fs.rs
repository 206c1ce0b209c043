use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{EditError, EditResult};

/// Writes `content` through a sibling temp file and renames it over `path`.
///
/// With `backup`, the previous file is copied to `<path>.bak` first.
pub fn write_atomic(path: &Path, content: &str, backup: bool) -> EditResult<()> {
    let tmp_path = unique_tmp_path(path);
    {
        let mut file = File::create(&tmp_path).map_err(EditError::io(&tmp_path))?;
        file.write_all(content.as_bytes())
            .map_err(EditError::io(&tmp_path))?;
        file.sync_all().map_err(EditError::io(&tmp_path))?;
    }

    if backup && path.exists() {
        let backup_path = path.with_extension("bak");
        if let Err(err) = fs::copy(path, &backup_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(EditError::io(&backup_path)(err));
        }
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(EditError::io(path)(err));
    }

    log::debug!("wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// `<dir>/<stem>_autosave.<ext>` next to `path`.
pub fn autosave_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_autosave.{}", ext.to_string_lossy()),
        None => format!("{stem}_autosave"),
    };
    path.with_file_name(name)
}

pub fn read_document(path: &Path) -> EditResult<String> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::InvalidData => {
            EditError::InvalidInput(format!("{} is not valid UTF-8", path.display()))
        }
        _ => EditError::io(path)(err),
    })
}

fn unique_tmp_path(path: &Path) -> PathBuf {
    let mut counter = 0u32;
    loop {
        let candidate = if counter == 0 {
            path.with_extension("tmp")
        } else {
            path.with_extension(format!("tmp{counter}"))
        };

        if !candidate.exists() {
            return candidate;
        }

        counter += 1;
    }
}
