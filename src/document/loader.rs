//! Target document loading
//!
//! A target that is missing or cannot be parsed is not an error: appending
//! starts from a blank document instead. `open_target` makes that decision
//! explicit so callers can see which case they are in.

use docx_rs::Docx;
use std::path::Path;
use tracing::warn;

use super::io::read_docx_file;

/// Outcome of opening a target document
#[derive(Debug)]
pub enum LoadedTarget {
    /// The file existed and parsed as a Word document
    Existing(Box<Docx>),
    /// The file was missing or unreadable; a blank document is used
    Fresh,
}

impl LoadedTarget {
    pub fn is_fresh(&self) -> bool {
        matches!(self, LoadedTarget::Fresh)
    }

    pub fn into_docx(self) -> Docx {
        match self {
            LoadedTarget::Existing(docx) => *docx,
            LoadedTarget::Fresh => Docx::new(),
        }
    }
}

/// Open a target document, falling back to a blank one when it is absent or corrupt
pub fn open_target(file_path: &Path) -> LoadedTarget {
    if !file_path.is_file() {
        return LoadedTarget::Fresh;
    }

    match read_docx_file(file_path) {
        Ok(docx) => LoadedTarget::Existing(Box::new(docx)),
        Err(e) => {
            warn!(
                "{} is not a readable Word document ({}), starting from a blank document",
                file_path.display(),
                e
            );
            LoadedTarget::Fresh
        }
    }
}
