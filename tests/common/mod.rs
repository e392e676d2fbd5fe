//! Fixture builders shared by the integration tests
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use docappend::document::{PageImage, RenderedPdf};
use docappend::pdf::{encode_png, PageRasterizer};
use docappend::{AppendError, FontSpec};
use docx_rs::{
    DocumentChild, Docx, Paragraph, ParagraphChild, Pic, Run, RunFonts, TableCellContent,
    TableChild, TableRowChild,
};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Rasterizer that reads fake PDFs of the form `pages:N`
///
/// Anything else is treated as an unreadable PDF.
pub struct StubRasterizer;

impl PageRasterizer for StubRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<RenderedPdf, AppendError> {
        let contents = std::fs::read_to_string(pdf_path).unwrap_or_default();
        let pages = contents
            .trim()
            .strip_prefix("pages:")
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| AppendError::Pdf {
                path: pdf_path.to_path_buf(),
                reason: "not a PDF".to_string(),
            })?;

        Ok(RenderedPdf {
            source: pdf_path.to_path_buf(),
            pages: (0..pages).map(numbered_page).collect(),
        })
    }
}

pub fn blank_page() -> PageImage {
    numbered_page(0)
}

/// A blank page whose width encodes its index, so every page has distinct bytes
pub fn numbered_page(index: usize) -> PageImage {
    encode_png(image::DynamicImage::new_rgb8(12 + index as u32, 16)).unwrap()
}

pub fn fake_pdf(pages: usize) -> Vec<u8> {
    format!("pages:{pages}").into_bytes()
}

pub fn docx_bytes(docx: Docx) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    cursor.into_inner()
}

pub fn text_docx(paragraphs: &[&str]) -> Vec<u8> {
    let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    });
    docx_bytes(docx)
}

/// A document whose only content is one picture of the given size
pub fn picture_docx(width: u32, height: u32) -> Vec<u8> {
    let png = encode_png(image::DynamicImage::new_rgb8(width, height))
        .unwrap()
        .png;
    let pic = Pic::new(&png).size(914_400, 914_400);
    docx_bytes(Docx::new().add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic))))
}

pub fn write_zip(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap();
}

pub fn read_zip(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        entries.insert(file.name().to_string(), contents);
    }
    entries
}

pub fn read_zip_bytes(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.zip");
    std::fs::write(&path, bytes).unwrap();
    read_zip(&path)
}

const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";
const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

fn xml_attr<'a>(element: &'a str, name: &str) -> Option<&'a str> {
    let start = element.find(&format!(" {name}=\""))? + name.len() + 3;
    let len = element[start..].find('"')?;
    Some(&element[start..start + len])
}

/// Assert that every image relationship of the main document points at a
/// non-empty media part
///
/// Returns the media part names checked.
pub fn assert_media_intact(docx: &[u8]) -> Vec<String> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("document.docx");
    std::fs::write(&path, docx).unwrap();
    let parts = read_zip(&path);

    let rels = String::from_utf8(parts[DOCUMENT_RELS].clone()).unwrap();
    let mut media = Vec::new();
    for element in rels.split("<Relationship ").skip(1) {
        if xml_attr(element, "Type") != Some(IMAGE_REL_TYPE) {
            continue;
        }
        let target = xml_attr(element, "Target").unwrap();
        let part = match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("word/{target}"),
        };

        let bytes = parts
            .get(&part)
            .unwrap_or_else(|| panic!("image relationship points at missing part {part}"));
        assert!(!bytes.is_empty(), "media part {part} is empty");
        assert!(
            image::load_from_memory(bytes).is_ok(),
            "media part {part} is not a readable image"
        );
        media.push(part);
    }

    media
}

pub fn parse_docx(bytes: &[u8]) -> Docx {
    docx_rs::read_docx(bytes).expect("output should be a readable Word document")
}

/// Assert that every body and top-level table-cell run carries `font`
///
/// Returns the number of runs checked.
pub fn assert_uniform_font(docx: &Docx, font: &FontSpec) -> usize {
    let fonts = RunFonts::new()
        .ascii(&font.family)
        .hi_ansi(&font.family)
        .east_asia(&font.family);
    let expected = serde_json::to_value(
        &Run::new().fonts(fonts).size(font.half_points()).run_property,
    )
    .unwrap();

    let mut checked = 0;
    let mut check_paragraph = |para: &Paragraph| {
        for child in &para.children {
            if let ParagraphChild::Run(run) = child {
                let actual = serde_json::to_value(&run.run_property).unwrap();
                assert_eq!(actual["sz"], expected["sz"], "run size should be normalized");
                assert_eq!(
                    actual["fonts"], expected["fonts"],
                    "run font should be normalized"
                );
                checked += 1;
            }
        }
    };

    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(para) => check_paragraph(para),
            DocumentChild::Table(table) => {
                for table_child in &table.rows {
                    let TableChild::TableRow(row) = table_child;
                    for row_child in &row.cells {
                        let TableRowChild::TableCell(cell) = row_child;
                        for content in &cell.children {
                            if let TableCellContent::Paragraph(para) = content {
                                check_paragraph(para);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    checked
}
