//! File persistence shared by the module and version writers.

use crate::error::Error;
use log::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Replaces `path` with `contents` so readers never observe a partial file.
///
/// The bytes are written to a sibling `<name>.tmp` file which is then renamed
/// over the target. Missing parent directories are created.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, contents).await?;

    if let Err(err) = fs::rename(&tmp_path, path).await {
        warn!("Failed to move {} into place: {err}", tmp_path.display());
        let _ = fs::remove_file(&tmp_path).await;
        return Err(err.into());
    }

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Reads a UTF-8 file, returning `None` when it does not exist.
pub async fn read_optional(path: &Path) -> Result<Option<String>, Error> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
