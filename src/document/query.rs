//! Read-only inspection of document bodies
//!
//! Used to report what a pass did to each target and to check results after
//! a round-trip through disk.

use docx_rs::{Break, BreakType, DocumentChild, Docx, ParagraphChild, RunChild};
use serde::Serialize;

/// Counts of body-level content in a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub paragraphs: usize,
    pub tables: usize,
    pub pictures: usize,
    pub page_breaks: usize,
}

pub fn summarize_document(docx: &Docx) -> DocumentStats {
    let mut stats = DocumentStats::default();
    let page_break = Break::new(BreakType::Page);

    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(para) => {
                stats.paragraphs += 1;

                for para_child in &para.children {
                    if let ParagraphChild::Run(run) = para_child {
                        for run_child in &run.children {
                            match run_child {
                                RunChild::Drawing(_) => stats.pictures += 1,
                                RunChild::Break(br) if *br == page_break => {
                                    stats.page_breaks += 1
                                }
                                _ => {}
                            }
                        }
                    }
                }
            }
            DocumentChild::Table(_) => stats.tables += 1,
            _ => {}
        }
    }

    stats
}

/// Extract plain text from a paragraph's direct runs
pub fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();

    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(text_elem) = run_child {
                    text.push_str(&text_elem.text);
                }
            }
        }
    }

    text
}

/// Text of every body paragraph that has any, in document order
pub fn body_texts(docx: &Docx) -> Vec<String> {
    docx.document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect()
}
