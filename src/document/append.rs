//! Appending rendered pages and source documents to a target
//!
//! Every appended item lands at the end of the target body, in the order it
//! was supplied. Font normalization is not done here; callers run it once
//! after all content has been inserted.

use docx_rs::{BreakType, Docx, Paragraph, Pic, Run};
use tracing::debug;

use super::models::{AppendSettings, PageImage, RenderedPdf, SourceDocument};

/// Append every page of every PDF as a full-width picture
///
/// A page break follows each page except the last page of its own PDF, so
/// consecutive PDFs run into each other without a forced break.
pub fn append_rendered_pdfs(
    mut docx: Docx,
    pdfs: &[RenderedPdf],
    settings: &AppendSettings,
) -> Docx {
    for pdf in pdfs {
        let last_page = pdf.page_count().saturating_sub(1);

        for (page_index, page) in pdf.pages.iter().enumerate() {
            docx = docx.add_paragraph(picture_paragraph(page, settings));

            if page_index < last_page {
                docx = docx.add_paragraph(page_break_paragraph());
            }
        }

        debug!(
            "Appended {} pages from {}",
            pdf.page_count(),
            pdf.source.display()
        );
    }

    docx
}

/// Move the body elements of each source document to the end of the target
///
/// Only the body elements travel. Styles, numbering and relationship targets
/// that live in the source's other parts do not, so formatting or media that
/// depend on them may not resolve in the target.
pub fn append_source_documents(mut docx: Docx, sources: &[SourceDocument]) -> Docx {
    for source in sources {
        docx.document
            .children
            .extend(source.elements.iter().cloned());

        debug!(
            "Appended {} body elements from {}",
            source.elements.len(),
            source.source.display()
        );
    }

    docx
}

fn picture_paragraph(page: &PageImage, settings: &AppendSettings) -> Paragraph {
    let (width_emu, height_emu) = settings.image_extent(page);
    let pic = Pic::new(&page.png).size(width_emu, height_emu);
    Paragraph::new().add_run(Run::new().add_image(pic))
}

fn page_break_paragraph() -> Paragraph {
    Paragraph::new().add_run(Run::new().add_break(BreakType::Page))
}
