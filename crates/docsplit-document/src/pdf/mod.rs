// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page-level document backend, raster promotion, and the page
// extractor that cuts groups of pages into standalone PDFs.

pub mod backend;
pub mod extractor;
pub mod promote;

pub use backend::{LopdfDocument, PageDocument};
pub use extractor::{PdfPageExtractor, group_filename};
pub use promote::promote_raster;
