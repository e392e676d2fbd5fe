//! Core data structures for append content
//!
//! This module defines the rendered pages, source documents and formatting
//! settings that flow from the renderers into the appender.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// English Metric Units per inch, the unit DOCX drawings are sized in
pub const EMU_PER_INCH: f32 = 914_400.0;

/// Widest page Word supports, in inches
pub const MAX_IMAGE_WIDTH_INCHES: f32 = 22.0;

/// A single rasterized PDF page, PNG-encoded
#[derive(Debug, Clone)]
pub struct PageImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// All pages of one PDF, in page order
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub source: PathBuf,
    pub pages: Vec<PageImage>,
}

impl RenderedPdf {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Top-level body elements taken from a source Word document
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub source: PathBuf,
    pub elements: Vec<docx_rs::DocumentChild>,
}

/// Font applied to every run during normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size_pt: f32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size_pt: f32) -> Self {
        Self {
            family: family.into(),
            size_pt,
        }
    }

    /// Size in half-points, as stored in `w:sz`
    pub fn half_points(&self) -> usize {
        (self.size_pt * 2.0).round().max(1.0) as usize
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("Times New Roman", 12.0)
    }
}

/// Settings that shape appended content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppendSettings {
    pub font: FontSpec,
    /// Width every inserted page image is scaled to
    pub image_width_inches: f32,
}

impl Default for AppendSettings {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            image_width_inches: 6.0,
        }
    }
}

impl AppendSettings {
    /// Drawing extent in EMU for a page image, keeping its aspect ratio
    ///
    /// The width is clamped to `0..=MAX_IMAGE_WIDTH_INCHES` and a very tall
    /// page saturates at `u32::MAX` rather than wrapping.
    pub fn image_extent(&self, page: &PageImage) -> (u32, u32) {
        let inches = if self.image_width_inches.is_finite() {
            self.image_width_inches.clamp(0.0, MAX_IMAGE_WIDTH_INCHES)
        } else {
            0.0
        };
        let width_emu = (inches * EMU_PER_INCH).round() as u64;
        if page.width == 0 {
            return (saturate(width_emu), 0);
        }
        let height_emu = width_emu * u64::from(page.height) / u64::from(page.width);
        (saturate(width_emu), saturate(height_emu))
    }
}

fn saturate(emu: u64) -> u32 {
    u32::try_from(emu).unwrap_or(u32::MAX)
}
