//! Font normalization
//!
//! Forces one font family and size onto every run of the body paragraphs and
//! the paragraphs of top-level table cells. Headers, footers, text boxes,
//! nested tables and runs wrapped in hyperlinks are left alone.

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, Run, RunFonts, Table, TableCellContent, TableChild,
    TableRowChild,
};

use super::models::FontSpec;

/// Apply `font` to every run reachable from the document body
pub fn normalize_document_fonts(document: &mut docx_rs::Document, font: &FontSpec) -> usize {
    let mut runs = 0;

    for child in &mut document.children {
        match child {
            DocumentChild::Paragraph(para) => {
                runs += normalize_paragraph(para, font);
            }
            DocumentChild::Table(table) => {
                runs += normalize_table(table, font);
            }
            _ => {
                // Section-level content such as bookmarks carries no runs
            }
        }
    }

    runs
}

fn normalize_table(table: &mut Table, font: &FontSpec) -> usize {
    let mut runs = 0;

    for table_child in &mut table.rows {
        let TableChild::TableRow(row) = table_child;

        for row_child in &mut row.cells {
            let TableRowChild::TableCell(cell) = row_child;

            for content in &mut cell.children {
                if let TableCellContent::Paragraph(para) = content {
                    runs += normalize_paragraph(para, font);
                }
            }
        }
    }

    runs
}

/// Apply `font` to the direct run children of a paragraph
pub(crate) fn normalize_paragraph(para: &mut Paragraph, font: &FontSpec) -> usize {
    let mut runs = 0;

    for child in &mut para.children {
        if let ParagraphChild::Run(run) = child {
            apply_font(run, font);
            runs += 1;
        }
    }

    runs
}

fn apply_font(run: &mut Run, font: &FontSpec) {
    let fonts = RunFonts::new()
        .ascii(&font.family)
        .hi_ansi(&font.family)
        .east_asia(&font.family);

    run.run_property = run
        .run_property
        .clone()
        .fonts(fonts)
        .size(font.half_points());
}
