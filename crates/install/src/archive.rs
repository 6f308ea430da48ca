//! Archive extraction into the install directory.
//!
//! Extraction is staged: entries are unpacked into a scratch directory
//! created inside the destination and only moved into place once the whole
//! archive has been read. A truncated or malformed archive therefore
//! leaves the destination exactly as it was.

use std::path::Path;

use flate2::read::GzDecoder;
use shub_core::{Error, Result};
use tracing::debug;

/// Unpack `archive` into `dest`, dispatching on the file extension.
///
/// The release server serves zip; the tar.gz arm covers archives delivered
/// through other channels.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    std::fs::create_dir_all(dest).map_err(|e| Error::filesystem(dest, e))?;
    let scratch = tempfile::Builder::new()
        .prefix(".shub-extract-")
        .tempdir_in(dest)
        .map_err(|e| Error::filesystem(dest, e))?;

    debug!(archive = %archive.display(), dest = %dest.display(), "extracting archive");
    if name.ends_with(".zip") {
        unpack_zip(archive, scratch.path())?;
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        unpack_tar_gz(archive, scratch.path())?;
    } else {
        return Err(Error::archive(format!("unsupported archive format: {name}")));
    }

    promote(scratch.path(), dest)
}

fn unpack_zip(archive: &Path, scratch: &Path) -> Result<()> {
    let file = std::fs::File::open(archive).map_err(|e| Error::filesystem(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| Error::archive(e.to_string()))?;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| Error::archive(e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(Error::archive(format!(
                "archive entry escapes the destination: {}",
                entry.name()
            )));
        };
        let target = scratch.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| Error::filesystem(&target, e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::filesystem(parent, e))?;
        }
        let mut out = std::fs::File::create(&target).map_err(|e| Error::filesystem(&target, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| Error::archive(e.to_string()))?;
    }

    Ok(())
}

fn unpack_tar_gz(archive: &Path, scratch: &Path) -> Result<()> {
    let file = std::fs::File::open(archive).map_err(|e| Error::filesystem(archive, e))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.unpack(scratch)
        .map_err(|e| Error::archive(e.to_string()))
}

/// Move fully-unpacked entries from the scratch directory into the
/// destination. Same directory, so the moves are renames.
fn promote(scratch: &Path, dest: &Path) -> Result<()> {
    let entries = std::fs::read_dir(scratch).map_err(|e| Error::filesystem(scratch, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::filesystem(scratch, e))?;
        let target = dest.join(entry.file_name());
        if target.is_dir() {
            std::fs::remove_dir_all(&target).map_err(|e| Error::filesystem(&target, e))?;
        }
        std::fs::rename(entry.path(), &target).map_err(|e| Error::filesystem(&target, e))?;
    }
    Ok(())
}
