//! docappend: append PDF pages and Word documents to every .docx in a ZIP
//!
//! This library extracts an archive of Word documents, appends rendered PDF
//! pages or the bodies of other Word documents to each one, normalizes their
//! fonts and packs the results back into an archive. A small web form drives
//! the whole process.

pub mod archive;
pub mod config;
pub mod document;
pub mod error;
pub mod pdf;
pub mod pipeline;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use document::{AppendSettings, FontSpec, LoadedTarget};
pub use error::AppendError;
pub use pdf::{PageRasterizer, PdfiumRasterizer};
pub use pipeline::{process, AppendMode, AppendRequest, AppendSources, ProcessSummary};
