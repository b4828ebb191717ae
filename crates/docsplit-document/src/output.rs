// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction outputs. Each owns its bytes; nothing here borrows from the
// source document.

use std::path::{Path, PathBuf};

use docsplit_core::error::Result;
use docsplit_core::{ImageOutputFormat, SourceDocument};
use tracing::info;

use crate::integrity::hash_bytes;

/// A standalone PDF cut from a subset of the source pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    filename: String,
    page_indexes: Vec<usize>,
    bytes: Vec<u8>,
}

impl ExtractedDocument {
    pub(crate) fn new(filename: String, page_indexes: Vec<usize>, bytes: Vec<u8>) -> Self {
        Self {
            filename,
            page_indexes,
            bytes,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Source page indexes, in the order they appear in this document.
    pub fn page_indexes(&self) -> &[usize] {
        &self.page_indexes
    }

    /// Number of pages in the extracted document.
    pub fn page_count(&self) -> usize {
        self.page_indexes.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// SHA-256 of the document bytes as lowercase hex.
    pub fn sha256(&self) -> String {
        hash_bytes(&self.bytes)
    }

    /// Write the document into `dir` under its own filename.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        info!("Wrote extracted document to {}", path.display());
        Ok(path)
    }

    /// Turn the extracted document into a new source, e.g. to split it again.
    pub fn as_source(&self) -> SourceDocument {
        SourceDocument::new(self.filename.clone(), self.bytes.clone())
    }
}

/// An encoded crop of one region of a rasterized page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    filename: String,
    page_number: usize,
    element_index: usize,
    format: ImageOutputFormat,
    bytes: Vec<u8>,
}

impl ExtractedImage {
    pub(crate) fn new(
        filename: String,
        page_number: usize,
        element_index: usize,
        format: ImageOutputFormat,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename,
            page_number,
            element_index,
            format,
            bytes,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Position of the region within its page's region list.
    pub fn element_index(&self) -> usize {
        self.element_index
    }

    pub fn format(&self) -> ImageOutputFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write the image into `dir` under its own filename.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        info!("Wrote extracted image to {}", path.display());
        Ok(path)
    }

    pub fn as_source(&self) -> SourceDocument {
        SourceDocument::new(self.filename.clone(), self.bytes.clone())
    }
}
