//! Word document loading, appending and normalization
//!
//! This module opens target documents, appends rendered PDF pages or the
//! bodies of other documents to them, and forces a uniform font before they
//! are written back.

pub mod append;
pub mod formatting;
pub(crate) mod io;
pub mod loader;
pub mod models;
pub mod query;

pub use append::{append_rendered_pdfs, append_source_documents};
pub use formatting::normalize_document_fonts;
pub use io::{read_source_document, save_docx};
pub use loader::{open_target, LoadedTarget};
pub use models::*;
pub use query::*;
