//! PDF page rasterization
//!
//! Pages are rendered at the renderer's default scale, one PDF point per
//! pixel, and PNG-encoded in memory. Rendering goes through the
//! [`PageRasterizer`] trait so the appender does not depend on a particular
//! PDF engine.

use image::{DynamicImage, ImageFormat, RgbaImage};
use once_cell::unsync::OnceCell;
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::document::{PageImage, RenderedPdf};
use crate::error::{AppendError, Result};

/// Renders every page of a PDF to an image
pub trait PageRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<RenderedPdf>;
}

/// Rasterize every PDF in order, stopping at the first one that fails
pub fn rasterize_all(
    rasterizer: &dyn PageRasterizer,
    pdf_paths: &[PathBuf],
) -> Result<Vec<RenderedPdf>> {
    pdf_paths
        .iter()
        .map(|path| rasterizer.rasterize(path))
        .collect()
}

/// Pdfium-backed rasterizer
///
/// The library binding is created on first use, so requests that never
/// render a PDF do not need libpdfium to be installed.
pub struct PdfiumRasterizer {
    library_dir: Option<PathBuf>,
    pdfium: OnceCell<Pdfium>,
}

impl PdfiumRasterizer {
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self {
            library_dir,
            pdfium: OnceCell::new(),
        }
    }

    fn pdfium(&self) -> std::result::Result<&Pdfium, PdfiumError> {
        self.pdfium
            .get_or_try_init(|| bind_pdfium(self.library_dir.as_deref()))
    }
}

/// Bind to libpdfium, trying the configured directory, then `./`, then system paths
fn bind_pdfium(library_dir: Option<&Path>) -> std::result::Result<Pdfium, PdfiumError> {
    if let Some(dir) = library_dir {
        if let Ok(bindings) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        {
            return Ok(Pdfium::new(bindings));
        }
        debug!("No Pdfium library in {}, falling back", dir.display());
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<RenderedPdf> {
        let pdf_error = |reason: String| AppendError::Pdf {
            path: pdf_path.to_path_buf(),
            reason,
        };

        let pdfium = self
            .pdfium()
            .map_err(|e| pdf_error(format!("failed to load the Pdfium library: {e:?}")))?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| pdf_error(format!("{e:?}")))?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(1.0);
        let mut pages = Vec::new();

        for (index, page) in document.pages().iter().enumerate() {
            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| pdf_error(format!("page {}: {e:?}", index + 1)))?;

            let width = bitmap.width() as u32;
            let height = bitmap.height() as u32;
            let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
                .ok_or_else(|| pdf_error(format!("page {} has no pixel data", index + 1)))?;

            let page_image = encode_png(DynamicImage::ImageRgba8(rgba))
                .map_err(|e| pdf_error(format!("page {}: {e}", index + 1)))?;
            debug!(
                "Rendered page {} of {} at {}x{}",
                index + 1,
                pdf_path.display(),
                width,
                height
            );
            pages.push(page_image);
        }

        info!("Rendered {} pages from {}", pages.len(), pdf_path.display());
        Ok(RenderedPdf {
            source: pdf_path.to_path_buf(),
            pages,
        })
    }
}

/// Encode an image as PNG, rejecting empty images
pub fn encode_png(image: DynamicImage) -> std::result::Result<PageImage, image::ImageError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(image::ImageError::Parameter(
            image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ),
        ));
    }

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(PageImage { png, width, height })
}
