//! Request processing pipeline
//!
//! A request is validated, its sources are prepared once, and then one or two
//! passes run over the target archive. Each pass extracts its input archive
//! into a fresh scratch directory, appends to every `.docx` it finds, and packs
//! the tree into a new archive. A second pass consumes the first pass's output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

use crate::archive::{
    extract_archive, find_targets, has_suffix, list_files, pack_directory, scratch_dir,
    DOCX_SUFFIX, PDF_SUFFIX,
};
use crate::document::{
    append_rendered_pdfs, append_source_documents, normalize_document_fonts, open_target,
    read_source_document, save_docx, summarize_document, AppendSettings, DocumentStats,
    RenderedPdf, SourceDocument,
};
use crate::error::{AppendError, Result};
use crate::pdf::{rasterize_all, PageRasterizer};

/// File name of the archive a request produces
pub const OUTPUT_ARCHIVE_NAME: &str = "output.zip";

/// Which directly uploaded lists a request uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppendMode {
    Pdf,
    Word,
    Both,
}

impl AppendMode {
    pub const ALL: [AppendMode; 3] = [AppendMode::Pdf, AppendMode::Word, AppendMode::Both];

    /// Label shown in the form's mode selector
    pub fn label(self) -> &'static str {
        match self {
            AppendMode::Pdf => "PDF",
            AppendMode::Word => "Word Document",
            AppendMode::Both => "Both PDF and Word Document",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.label() == label.trim())
    }

    fn uses_pdfs(self) -> bool {
        matches!(self, AppendMode::Pdf | AppendMode::Both)
    }

    fn uses_documents(self) -> bool {
        matches!(self, AppendMode::Word | AppendMode::Both)
    }
}

impl fmt::Display for AppendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the content to append comes from
#[derive(Debug, Clone)]
pub enum AppendSources {
    /// Files uploaded one by one; `mode` picks which lists are used
    Direct {
        mode: AppendMode,
        pdfs: Vec<PathBuf>,
        documents: Vec<PathBuf>,
    },
    /// A ZIP whose members are classified by extension
    Archive(PathBuf),
}

/// Everything one request needs
#[derive(Debug, Clone)]
pub struct AppendRequest {
    pub target_archive: PathBuf,
    pub sources: AppendSources,
}

impl AppendRequest {
    /// Check that the user supplied the inputs the selected mode needs
    pub fn validate(&self) -> Result<()> {
        if !self.target_archive.is_file() {
            return Err(AppendError::validation(
                "Please upload a ZIP file containing Word documents.",
            ));
        }

        match &self.sources {
            AppendSources::Direct {
                mode,
                pdfs,
                documents,
            } => {
                if mode.uses_pdfs() && pdfs.is_empty() {
                    return Err(AppendError::validation(
                        "Please upload at least one PDF file to append.",
                    ));
                }
                if mode.uses_documents() && documents.is_empty() {
                    return Err(AppendError::validation(
                        "Please upload at least one Word document to append.",
                    ));
                }
            }
            AppendSources::Archive(path) => {
                if !path.is_file() {
                    return Err(AppendError::validation(
                        "Please upload a ZIP file of PDFs or Word documents to append.",
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Content appended to every target during one pass
#[derive(Debug, Clone, Default)]
pub struct AppendPlan {
    pub pdfs: Vec<RenderedPdf>,
    pub documents: Vec<SourceDocument>,
}

impl AppendPlan {
    /// Render and parse every source up front, failing before any target is touched
    pub fn prepare(
        rasterizer: &dyn PageRasterizer,
        pdf_paths: &[PathBuf],
        document_paths: &[PathBuf],
    ) -> Result<Self> {
        let pdfs = rasterize_all(rasterizer, pdf_paths)?;
        let documents = document_paths
            .iter()
            .map(|path| read_source_document(path))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { pdfs, documents })
    }

    pub fn is_empty(&self) -> bool {
        self.pdfs.is_empty() && self.documents.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.pdfs.iter().map(RenderedPdf::page_count).sum()
    }

    /// Append this plan to the document at `path` and save it in place
    pub fn apply_to(&self, path: &Path, settings: &AppendSettings) -> Result<TargetReport> {
        let loaded = open_target(path);
        let fresh = loaded.is_fresh();

        let mut docx = loaded.into_docx();
        docx = append_rendered_pdfs(docx, &self.pdfs, settings);
        docx = append_source_documents(docx, &self.documents);
        let normalized_runs = normalize_document_fonts(&mut docx.document, &settings.font);

        let stats = summarize_document(&docx);
        save_docx(docx, path)?;

        Ok(TargetReport {
            path: path.to_path_buf(),
            fresh,
            normalized_runs,
            stats,
        })
    }
}

/// What a pass did to a single target
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub path: PathBuf,
    /// The target was missing or unreadable and started out blank
    pub fresh: bool,
    pub normalized_runs: usize,
    pub stats: DocumentStats,
}

/// An archive produced by a pass
///
/// Holds only a path; the file lives in the request's work directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedArchive {
    path: PathBuf,
}

impl PackedArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Result of one extract, append, repack cycle
#[derive(Debug)]
pub struct PassReport {
    pub archive: PackedArchive,
    pub targets: Vec<TargetReport>,
    pub entries: Vec<String>,
}

/// Run one pass of `plan` over `input`, writing a new archive to `output`
pub fn run_pass(
    input: &PackedArchive,
    plan: &AppendPlan,
    settings: &AppendSettings,
    output: &Path,
) -> Result<PassReport> {
    let scratch = scratch_dir()?;
    extract_archive(input.path(), scratch.path())?;

    let mut targets = Vec::new();
    for relative in find_targets(scratch.path())? {
        let mut report = plan.apply_to(&scratch.path().join(&relative), settings)?;
        report.path = relative;
        info!(
            "Appended to {} ({} pictures, {} runs normalized{})",
            report.path.display(),
            report.stats.pictures,
            report.normalized_runs,
            if report.fresh { ", started blank" } else { "" }
        );
        targets.push(report);
    }

    let entries = pack_directory(scratch.path(), output)?;
    scratch.close()?;

    Ok(PassReport {
        archive: PackedArchive::new(output),
        targets,
        entries,
    })
}

/// Summary of a processed request
#[derive(Debug)]
pub struct ProcessSummary {
    pub output: PathBuf,
    pub passes: Vec<PassReport>,
}

impl ProcessSummary {
    /// Targets touched by the final pass
    pub fn processed_documents(&self) -> usize {
        self.passes.last().map_or(0, |pass| pass.targets.len())
    }
}

/// Source files found in an append archive, split by kind
#[derive(Debug, Default)]
struct ClassifiedSources {
    pdfs: Vec<PathBuf>,
    documents: Vec<PathBuf>,
}

fn classify_sources(root: &Path) -> Result<ClassifiedSources> {
    let mut classified = ClassifiedSources::default();

    for relative in list_files(root)? {
        if has_suffix(&relative, PDF_SUFFIX) {
            classified.pdfs.push(root.join(relative));
        } else if has_suffix(&relative, DOCX_SUFFIX) {
            classified.documents.push(root.join(relative));
        }
    }

    Ok(classified)
}

/// Process a request, leaving the final archive at `output`
///
/// Intermediate archives and scratch trees live in temporary directories that
/// are removed when this returns, on success or failure.
pub fn process(
    request: AppendRequest,
    rasterizer: &dyn PageRasterizer,
    settings: &AppendSettings,
    output: &Path,
) -> Result<ProcessSummary> {
    request.validate()?;

    let work = scratch_dir()?;
    let original = PackedArchive::new(&request.target_archive);

    let plans = match &request.sources {
        AppendSources::Direct {
            mode,
            pdfs,
            documents,
        } => {
            info!(
                "Processing {} with mode '{}'",
                request.target_archive.display(),
                mode
            );
            let pdfs: &[PathBuf] = if mode.uses_pdfs() { pdfs } else { &[] };
            let documents: &[PathBuf] = if mode.uses_documents() { documents } else { &[] };
            vec![AppendPlan::prepare(rasterizer, pdfs, documents)?]
        }
        AppendSources::Archive(sources_archive) => {
            info!(
                "Processing {} with sources from {}",
                request.target_archive.display(),
                sources_archive.display()
            );
            archive_plans(rasterizer, sources_archive)?
        }
    };

    let passes = run_passes(&original, &plans, settings, &work, output)?;
    work.close()?;

    Ok(ProcessSummary {
        output: output.to_path_buf(),
        passes,
    })
}

/// One plan per non-empty source kind, PDFs first
fn archive_plans(
    rasterizer: &dyn PageRasterizer,
    sources_archive: &Path,
) -> Result<Vec<AppendPlan>> {
    let sources = scratch_dir()?;
    extract_archive(sources_archive, sources.path())?;
    let classified = classify_sources(sources.path())?;

    if classified.pdfs.is_empty() && classified.documents.is_empty() {
        return Err(AppendError::validation(
            "The append archive contains no PDF files or Word documents.",
        ));
    }

    let mut plans = Vec::new();
    if !classified.pdfs.is_empty() {
        plans.push(AppendPlan::prepare(rasterizer, &classified.pdfs, &[])?);
    }
    if !classified.documents.is_empty() {
        plans.push(AppendPlan::prepare(rasterizer, &[], &classified.documents)?);
    }

    sources.close()?;
    Ok(plans)
}

/// Chain passes so each one consumes the previous pass's archive
fn run_passes(
    original: &PackedArchive,
    plans: &[AppendPlan],
    settings: &AppendSettings,
    work: &TempDir,
    output: &Path,
) -> Result<Vec<PassReport>> {
    let mut reports: Vec<PassReport> = Vec::with_capacity(plans.len());

    for (index, plan) in plans.iter().enumerate() {
        let is_last = index + 1 == plans.len();
        let destination = if is_last {
            output.to_path_buf()
        } else {
            work.path().join(format!("pass-{}.zip", index + 1))
        };
        let input = reports.last().map_or(original, |report| &report.archive);

        info!(
            "Pass {}: {} PDF pages, {} Word documents",
            index + 1,
            plan.page_count(),
            plan.documents.len()
        );
        let report = run_pass(input, plan, settings, &destination)?;
        reports.push(report);
    }

    Ok(reports)
}
