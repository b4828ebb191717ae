// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: source documents and the model predictions that drive
// splitting and cropping.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DocsplitError, Result};
use crate::geometry::Quadrilateral;

/// Supported source document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    Png,
    Jpeg,
    Tiff,
    Webp,
    Bmp,
    Gif,
}

/// How far into the file a PDF header may start. Some producers prepend
/// junk before `%PDF-`.
const PDF_HEADER_WINDOW: usize = 1024;

impl DocumentType {
    /// MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Tiff => "image/tiff",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
            Self::Gif => "image/gif",
        }
    }

    /// Canonical file extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
        }
    }

    /// Infer document type from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "tif" | "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::Webp),
            "bmp" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Identify a document from its leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            Some(Self::Tiff)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else if bytes[..bytes.len().min(PDF_HEADER_WINDOW)]
            .windows(5)
            .any(|window| window == b"%PDF-")
        {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    /// Whether this is a single-frame raster image rather than a paginated
    /// document.
    pub fn is_raster(&self) -> bool {
        !matches!(self, Self::Pdf)
    }
}

/// The original document handed in by the caller. Read-only once built.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    filename: String,
    bytes: Vec<u8>,
    document_type: Option<DocumentType>,
}

impl SourceDocument {
    /// Wrap in-memory bytes. The type is sniffed from the content first and
    /// falls back to the filename extension.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let document_type = DocumentType::sniff(&bytes).or_else(|| {
            Path::new(&filename)
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(DocumentType::from_extension)
        });
        Self {
            filename,
            bytes,
            document_type,
        }
    }

    /// Read a document from the filesystem.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self::new(filename, bytes))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn document_type(&self) -> Option<DocumentType> {
        self.document_type
    }

    /// Filename without its final extension (`invoice.pdf` -> `invoice`).
    pub fn stem(&self) -> &str {
        file_stem(&self.filename)
    }
}

/// Strip the final extension from a filename. Leading-dot names such as
/// `.hidden` are returned whole.
pub fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => &filename[..dot],
        _ => filename,
    }
}

/// Raw page-group output from a splitting model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGroupPrediction {
    /// Zero-based page numbers. Signed because payloads are untrusted.
    pub page_indexes: Vec<i64>,
    /// Model confidence in [0, 1]; 0.0 when missing or unparseable.
    #[serde(default, deserialize_with = "lenient_confidence")]
    pub confidence: f64,
}

impl PageGroupPrediction {
    pub fn new(page_indexes: Vec<i64>, confidence: f64) -> Self {
        Self {
            page_indexes,
            confidence,
        }
    }
}

fn lenient_confidence<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| match value {
            serde_json::Value::Number(number) => number.as_f64(),
            serde_json::Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|confidence| confidence.is_finite())
        .unwrap_or(0.0))
}

/// A corrected page group: non-empty and disjoint from every other group of
/// the same reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledPageGroup {
    pub page_indexes: Vec<usize>,
}

impl ReconciledPageGroup {
    pub fn first(&self) -> Option<usize> {
        self.page_indexes.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.page_indexes.last().copied()
    }
}

impl AsRef<[usize]> for ReconciledPageGroup {
    fn as_ref(&self) -> &[usize] {
        &self.page_indexes
    }
}

/// Raw region output from a multi-region detection model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPrediction {
    /// Zero-based index of the page the region was detected on.
    pub page_number: usize,
    pub polygon: Quadrilateral,
}

impl RegionPrediction {
    /// Build from the `[[x, y]; 4]` shape used by prediction payloads.
    pub fn from_raw(page_number: usize, polygon: &[[f64; 2]]) -> Result<Self> {
        Ok(Self {
            page_number,
            polygon: Quadrilateral::from_raw_points(polygon)?,
        })
    }
}

/// Validate a raw index against the page count.
pub fn checked_page_index(index: i64, page_count: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&idx| idx < page_count)
        .ok_or(DocsplitError::PageIndexOutOfRange { index, page_count })
}
