// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsplit-document — Document splitting for docsplit.
//
// Reconciles page-group predictions into clean page groups, cuts those groups
// out of a source PDF (or a raster promoted to a one-page PDF) as standalone
// documents, and crops detected polygon regions out of rasterized pages.

pub mod image;
pub mod integrity;
pub mod output;
pub mod pdf;
pub mod split;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export the primary structs so callers can use `docsplit_document::PdfPageExtractor` etc.
pub use image::{ImageRegionExtractor, NamingContext, RasterPage};
pub use output::{ExtractedDocument, ExtractedImage};
pub use pdf::{LopdfDocument, PageDocument, PdfPageExtractor, promote_raster};
pub use split::{PageGroupReconciler, reconcile, validate_groups};
