// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page extractor — opens a source document (promoting rasters to a
// one-page PDF), cuts page subsets into standalone PDFs, and names them
// after the page range they cover.

use docsplit_core::error::{DocsplitError, Result};
use docsplit_core::types::{PageGroupPrediction, SourceDocument};
use docsplit_core::{DocumentType, SplitConfig};
use tracing::{debug, info, instrument};

use crate::output::ExtractedDocument;
use crate::pdf::backend::{LopdfDocument, PageDocument};
use crate::pdf::promote::promote_raster;
use crate::split::{PageGroupReconciler, validate_groups};

/// Open or released. Released handles reject every operation.
enum HandleState<D> {
    Open(D),
    Closed,
}

/// Cuts groups of pages out of one source document.
///
/// All cutting goes through `&self`; the parsed source is never modified,
/// so cutting the same group twice yields byte-identical output.
pub struct PdfPageExtractor<D: PageDocument = LopdfDocument> {
    state: HandleState<D>,
    /// Original filename, kept for naming outputs.
    filename: String,
    /// Filename without extension.
    stem: String,
    /// Type of the original source before any promotion.
    source_type: DocumentType,
    config: SplitConfig,
}

impl PdfPageExtractor<LopdfDocument> {
    // -- Construction ---------------------------------------------------------

    /// Open a source with the default configuration.
    pub fn open(source: &SourceDocument) -> Result<Self> {
        Self::open_with_config(source, SplitConfig::default())
    }

    /// Open a source with an explicit configuration.
    pub fn open_with_config(source: &SourceDocument, config: SplitConfig) -> Result<Self> {
        Self::open_with_backend(source, config)
    }
}

impl<D: PageDocument> PdfPageExtractor<D> {
    /// Open a source on any [`PageDocument`] backend.
    ///
    /// PDFs are loaded directly. Raster images are wrapped as a one-page PDF
    /// first; the wrapper lives only as long as this handle.
    #[instrument(skip_all, fields(filename = source.filename(), bytes_len = source.bytes().len()))]
    pub fn open_with_backend(source: &SourceDocument, config: SplitConfig) -> Result<Self> {
        config.validate()?;

        // Content decides; a `.pdf` name on non-PDF bytes is still rejected.
        let source_type = DocumentType::sniff(source.bytes()).ok_or_else(|| {
            DocsplitError::UnsupportedFormat(format!(
                "{} is neither a PDF nor a recognised raster image",
                source.filename()
            ))
        })?;

        let document = if source_type.is_raster() {
            let promoted = promote_raster(source.bytes(), source.stem(), config.raster_dpi)?;
            D::load(&promoted, &config)?
        } else {
            D::load(source.bytes(), &config)?
        };

        info!(
            source_type = source_type.mime_type(),
            pages = document.page_count(),
            "Source opened"
        );

        Ok(Self {
            state: HandleState::Open(document),
            filename: source.filename().to_string(),
            stem: source.stem().to_string(),
            source_type,
            config,
        })
    }

    // -- Inspection -----------------------------------------------------------

    fn document(&self) -> Result<&D> {
        match &self.state {
            HandleState::Open(document) => Ok(document),
            HandleState::Closed => Err(DocsplitError::HandleClosed),
        }
    }

    /// Number of pages in the (possibly promoted) source.
    pub fn page_count(&self) -> Result<usize> {
        Ok(self.document()?.page_count())
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Type of the original source. Raster types mean the handle is working
    /// on a synthesised one-page PDF.
    pub fn source_type(&self) -> DocumentType {
        self.source_type
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, HandleState::Open(_))
    }

    /// Release the parsed document. Every later call fails with
    /// `HandleClosed`.
    pub fn close(&mut self) {
        if self.is_open() {
            debug!(filename = %self.filename, "Handle closed");
        }
        self.state = HandleState::Closed;
    }

    // -- Cutting ----------------------------------------------------------------

    /// Build a new PDF holding exactly `page_indexes`, in that order.
    #[instrument(skip(self), fields(filename = %self.filename))]
    pub fn cut_pages(&self, page_indexes: &[usize]) -> Result<Vec<u8>> {
        let document = self.document()?;
        if page_indexes.is_empty() {
            return Err(DocsplitError::EmptyPageGroup { position: 0 });
        }
        let page_count = document.page_count();
        if let Some(&index) = page_indexes.iter().find(|&&index| index >= page_count) {
            return Err(DocsplitError::PageIndexOutOfRange {
                index: index as i64,
                page_count,
            });
        }
        document.new_document_from_pages(page_indexes)
    }

    /// Cut every group, in order, naming each
    /// `{basename}_{first:03}-{last:03}{extension}` with 1-based page numbers
    /// taken from the first and last entries of the group.
    ///
    /// The first failing group aborts the batch; no partial output is
    /// returned.
    #[instrument(skip(self, groups), fields(groups = groups.len()))]
    pub fn extract_groups<G: AsRef<[usize]>>(
        &self,
        groups: &[G],
        basename: &str,
        extension: &str,
    ) -> Result<Vec<ExtractedDocument>> {
        self.document()?;
        if groups.is_empty() {
            return Err(DocsplitError::EmptyGroupList);
        }

        let mut extracted = Vec::with_capacity(groups.len());
        for (position, group) in groups.iter().enumerate() {
            let page_indexes = group.as_ref();
            let (Some(&first), Some(&last)) = (page_indexes.first(), page_indexes.last()) else {
                return Err(DocsplitError::EmptyPageGroup { position });
            };

            let bytes = self.cut_pages(page_indexes)?;
            let filename = group_filename(basename, first, last, extension);
            debug!(position, %filename, output_bytes = bytes.len(), "Group extracted");

            extracted.push(ExtractedDocument::new(filename, page_indexes.to_vec(), bytes));
        }

        info!(documents = extracted.len(), "Groups extracted");
        Ok(extracted)
    }

    /// Cut pre-resolved groups, named after the source file.
    pub fn extract_sub_documents<G: AsRef<[usize]>>(
        &self,
        groups: &[G],
    ) -> Result<Vec<ExtractedDocument>> {
        self.extract_groups(groups, &self.stem, &self.config.output_extension)
    }

    /// Cut invoice-style page groups.
    ///
    /// With `strict` the predictions are reconciled first; otherwise each
    /// prediction's pages are validated and cut as given.
    #[instrument(skip(self, predictions), fields(predictions = predictions.len()))]
    pub fn extract_invoices(
        &self,
        predictions: &[PageGroupPrediction],
        strict: bool,
    ) -> Result<Vec<ExtractedDocument>> {
        let page_count = self.page_count()?;
        if strict {
            let groups =
                PageGroupReconciler::from_config(&self.config).reconcile(predictions, page_count)?;
            self.extract_sub_documents(groups.as_slice())
        } else {
            let groups = validate_groups(predictions, page_count)?;
            self.extract_sub_documents(groups.as_slice())
        }
    }
}

/// `{basename}_{first+1:03}-{last+1:03}{extension}`.
pub fn group_filename(basename: &str, first: usize, last: usize, extension: &str) -> String {
    format!("{}_{:03}-{:03}{}", basename, first + 1, last + 1, extension)
}
