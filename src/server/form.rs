//! Upload form state
//!
//! Multipart fields are staged to a per-request temporary directory as they
//! arrive, then turned into an [`AppendRequest`]. The directory is removed
//! when the returned [`TempDir`] is dropped.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::archive::scratch_dir;
use crate::error::{AppendError, Result};
use crate::pipeline::{AppendMode, AppendRequest, AppendSources};

/// Multipart field names accepted by `POST /process`
pub const FIELD_TARGETS: &str = "targets";
pub const FIELD_MODE: &str = "mode";
pub const FIELD_PDFS: &str = "pdfs";
pub const FIELD_DOCUMENTS: &str = "documents";
pub const FIELD_SOURCES_ARCHIVE: &str = "sources_archive";

/// Uploads collected for one request
pub struct UploadForm {
    dir: TempDir,
    staged: usize,
    targets: Option<PathBuf>,
    mode: Option<String>,
    pdfs: Vec<PathBuf>,
    documents: Vec<PathBuf>,
    sources_archive: Option<PathBuf>,
}

impl UploadForm {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: scratch_dir()?,
            staged: 0,
            targets: None,
            mode: None,
            pdfs: Vec::new(),
            documents: Vec::new(),
            sources_archive: None,
        })
    }

    /// Record one multipart field
    ///
    /// File inputs left empty by the browser arrive with no name and no
    /// data; those are ignored. Unknown fields are ignored too.
    pub fn add_field(&mut self, name: &str, file_name: Option<&str>, data: &[u8]) -> Result<()> {
        if name == FIELD_MODE {
            self.mode = Some(String::from_utf8_lossy(data).into_owned());
            return Ok(());
        }

        let file_name = file_name.unwrap_or_default();
        if file_name.is_empty() && data.is_empty() {
            return Ok(());
        }

        match name {
            FIELD_TARGETS => self.targets = Some(self.stage(file_name, data)?),
            FIELD_PDFS => {
                let path = self.stage(file_name, data)?;
                self.pdfs.push(path);
            }
            FIELD_DOCUMENTS => {
                let path = self.stage(file_name, data)?;
                self.documents.push(path);
            }
            FIELD_SOURCES_ARCHIVE => self.sources_archive = Some(self.stage(file_name, data)?),
            other => debug!("Ignoring unknown form field '{other}'"),
        }

        Ok(())
    }

    /// Write an upload under a numbered name so repeated file names never collide
    fn stage(&mut self, file_name: &str, data: &[u8]) -> Result<PathBuf> {
        self.staged += 1;
        let path = self
            .dir
            .path()
            .join(format!("{:03}-{}", self.staged, safe_file_name(file_name)));
        fs::write(&path, data)?;
        debug!("Staged upload {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }

    fn resolve_mode(&self) -> Result<AppendMode> {
        match self.mode.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => AppendMode::from_label(label)
                .ok_or_else(|| AppendError::validation(format!("Unknown append mode '{label}'."))),
            _ => Ok(match (self.pdfs.is_empty(), self.documents.is_empty()) {
                (false, false) => AppendMode::Both,
                (true, false) => AppendMode::Word,
                _ => AppendMode::Pdf,
            }),
        }
    }

    /// Build the request, handing back the directory that holds the uploads
    pub fn into_request(self) -> Result<(AppendRequest, TempDir)> {
        let Some(target_archive) = self.targets.clone() else {
            return Err(AppendError::validation(
                "Please upload a ZIP file containing Word documents.",
            ));
        };

        let sources = if let Some(archive) = self.sources_archive.clone() {
            AppendSources::Archive(archive)
        } else if self.pdfs.is_empty() && self.documents.is_empty() {
            return Err(AppendError::validation(
                "Please upload at least one PDF file or Word document to append.",
            ));
        } else {
            AppendSources::Direct {
                mode: self.resolve_mode()?,
                pdfs: self.pdfs.clone(),
                documents: self.documents.clone(),
            }
        };

        Ok((
            AppendRequest {
                target_archive,
                sources,
            },
            self.dir,
        ))
    }
}

/// Last path component of a client-supplied file name
fn safe_file_name(file_name: &str) -> String {
    // Browsers on Windows may send a full path
    let normalized = file_name.replace('\\', "/");
    Path::new(&normalized)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("upload")
        .to_string()
}
