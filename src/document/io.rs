//! File I/O operations and validation
//!
//! This module handles DOCX package validation, reading source documents and
//! writing modified documents back to disk.

use anyhow::bail;
use docx_rs::{
    DocumentChild, Docx, DrawingData, Paragraph, ParagraphChild, Run, RunChild, Table,
    TableCellContent, TableChild, TableRowChild,
};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

use super::models::SourceDocument;
use crate::error::{AppendError, Result};

/// Validates that the file is a Word package that contains a main document part
pub(crate) fn validate_docx_package(file_path: &Path) -> anyhow::Result<()> {
    let file = File::open(file_path)?;
    let mut archive = ZipArchive::new(file)?;

    if archive.by_name("word/document.xml").is_err() {
        // Check if it might be an Excel file
        if archive.by_name("xl/workbook.xml").is_ok() {
            bail!("This appears to be an Excel file (.xlsx), not a Word document");
        }

        bail!("missing word/document.xml, the file may be corrupted");
    }

    Ok(())
}

/// Parse a Word package from disk after validating its structure
pub(crate) fn read_docx_file(file_path: &Path) -> anyhow::Result<Docx> {
    validate_docx_package(file_path)?;
    let file_data = std::fs::read(file_path)?;
    let mut docx = docx_rs::read_docx(&file_data)?;

    let restored = restore_picture_bytes(&mut docx);
    if restored > 0 {
        debug!("Restored {} pictures in {}", restored, file_path.display());
    }
    Ok(docx)
}

/// Image bytes keyed by relationship id
type MediaById<'a> = HashMap<&'a str, &'a [u8]>;

/// Copy media bytes back into the pictures of the document body
///
/// The reader keeps image bytes only in `Docx::images` and leaves every body
/// picture empty, so packing the document unchanged would write empty media
/// parts. Returns the number of pictures filled in.
pub(crate) fn restore_picture_bytes(docx: &mut Docx) -> usize {
    // Main document media is read after header and footer media, so it wins
    // when relationship ids repeat across parts
    let media: MediaById = docx
        .images
        .iter()
        .map(|(id, _, image, _)| (id.as_str(), image.0.as_slice()))
        .collect();

    let mut restored = 0;
    for child in &mut docx.document.children {
        match child {
            DocumentChild::Paragraph(para) => restored += restore_in_paragraph(para, &media),
            DocumentChild::Table(table) => restored += restore_in_table(table, &media),
            _ => {}
        }
    }

    restored
}

fn restore_in_paragraph(para: &mut Paragraph, media: &MediaById) -> usize {
    restore_in_paragraph_children(&mut para.children, media)
}

fn restore_in_paragraph_children(children: &mut [ParagraphChild], media: &MediaById) -> usize {
    children
        .iter_mut()
        .map(|child| match child {
            ParagraphChild::Run(run) => restore_in_run(run, media),
            ParagraphChild::Hyperlink(link) => {
                restore_in_paragraph_children(&mut link.children, media)
            }
            _ => 0,
        })
        .sum()
}

fn restore_in_run(run: &mut Run, media: &MediaById) -> usize {
    let mut restored = 0;

    for child in &mut run.children {
        let RunChild::Drawing(drawing) = child else {
            continue;
        };
        let Some(DrawingData::Pic(pic)) = &mut drawing.data else {
            continue;
        };

        if pic.image.is_empty() {
            if let Some(bytes) = media.get(pic.id.as_str()) {
                pic.image = bytes.to_vec();
                restored += 1;
            }
        }
    }

    restored
}

fn restore_in_table(table: &mut Table, media: &MediaById) -> usize {
    let mut restored = 0;

    for TableChild::TableRow(row) in &mut table.rows {
        for TableRowChild::TableCell(cell) in &mut row.cells {
            for content in &mut cell.children {
                match content {
                    TableCellContent::Paragraph(para) => {
                        restored += restore_in_paragraph(para, media)
                    }
                    TableCellContent::Table(nested) => restored += restore_in_table(nested, media),
                    _ => {}
                }
            }
        }
    }

    restored
}

/// Read a Word document supplied as append content
///
/// Unlike targets, an unreadable source is an error: the request cannot
/// produce the output the user asked for.
pub fn read_source_document(file_path: &Path) -> Result<SourceDocument> {
    let docx = read_docx_file(file_path).map_err(|e| AppendError::SourceDocument {
        path: file_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let elements = docx.document.children;
    debug!(
        "Read {} body elements from {}",
        elements.len(),
        file_path.display()
    );

    Ok(SourceDocument {
        source: file_path.to_path_buf(),
        elements,
    })
}

/// Pack a document and write it to `file_path`, replacing any existing file
pub fn save_docx(docx: Docx, file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    docx.build()
        .pack(file)
        .map_err(|e| AppendError::Save {
            path: file_path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(())
}
