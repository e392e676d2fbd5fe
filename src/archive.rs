//! ZIP archive extraction and repacking
//!
//! An archive is extracted in full into a scratch directory, its `.docx`
//! members are modified in place, and the whole tree is zipped back up with
//! the same relative paths.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use zip::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::{AppendError, Result};

/// Suffix a file name must end with to be treated as a target
pub const DOCX_SUFFIX: &str = ".docx";
pub const PDF_SUFFIX: &str = ".pdf";

/// Sanitize an entry name so extraction cannot escape the scratch directory
///
/// Only normal components are kept: `..`, `.`, roots and drive prefixes are
/// dropped. Returns `None` when nothing is left.
fn sanitize_path(path: &str) -> Option<PathBuf> {
    let mut sanitized = PathBuf::new();

    for component in Path::new(path).components() {
        if let Component::Normal(part) = component {
            sanitized.push(part);
        }
    }

    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Create a fresh, uniquely named scratch directory
pub fn scratch_dir() -> Result<TempDir> {
    Ok(tempfile::Builder::new().prefix("docappend-").tempdir()?)
}

/// Extract every entry of `archive_path` under `dest`
///
/// Returns the number of files written.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut extracted = 0;

    for i in 0..archive.len() {
        {
            let raw = archive.by_index_raw(i)?;
            if raw.encrypted() {
                return Err(AppendError::PasswordProtected(raw.name().to_string()));
            }
        }

        let mut zip_file = archive.by_index(i)?;
        let raw_name = zip_file.name().to_string();

        let Some(relative) = sanitize_path(&raw_name) else {
            warn!("Skipping archive entry with an unusable path: {raw_name}");
            continue;
        };
        let out_path = dest.join(&relative);

        if zip_file.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&out_path)?);
        io::copy(&mut zip_file, &mut out)?;
        out.flush()?;
        extracted += 1;
        debug!("Extracted {}", relative.display());
    }

    Ok(extracted)
}

/// Every regular file under `root`, as paths relative to `root`, sorted
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(root, root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, base_path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            collect_files(&path, base_path, files)?;
        } else if file_type.is_file() {
            let relative = path
                .strip_prefix(base_path)
                .map_err(|e| io::Error::other(e.to_string()))?;
            files.push(relative.to_path_buf());
        }
    }

    Ok(())
}

/// Whether a file name ends with `suffix`, compared case-sensitively
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}

/// Relative paths of every `.docx` under `root`
pub fn find_targets(root: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_files(root)?
        .into_iter()
        .filter(|path| has_suffix(path, DOCX_SUFFIX))
        .collect())
}

/// Archive entry name for a relative path, always `/`-separated
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Zip every file under `root` into `output`, keeping relative paths
///
/// Returns the entry names written.
pub fn pack_directory(root: &Path, output: &Path) -> Result<Vec<String>> {
    let files = list_files(root)?;
    let mut writer = ZipWriter::new(BufWriter::new(File::create(output)?));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut names = Vec::with_capacity(files.len());

    for relative in files {
        let name = entry_name(&relative);
        writer.start_file(name.as_str(), options)?;
        let mut input = BufReader::new(File::open(root.join(&relative))?);
        io::copy(&mut input, &mut writer)?;
        names.push(name);
    }

    writer.finish()?.flush()?;
    Ok(names)
}
