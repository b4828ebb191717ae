// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for docsplit.

use thiserror::Error;

/// Top-level error type for all docsplit operations.
///
/// Every variant describes bad input or an unusable source document. Nothing
/// here is transient: retrying the same call with the same input fails the
/// same way.
#[derive(Debug, Error)]
pub enum DocsplitError {
    // -- Input shape --
    #[error("no predictions supplied")]
    EmptyInput,

    #[error("no page groups supplied")]
    EmptyGroupList,

    #[error("page group #{position} has no page indexes")]
    EmptyPageGroup { position: usize },

    #[error("page index {index} out of range (document has {page_count} pages)")]
    PageIndexOutOfRange { index: i64, page_count: usize },

    // -- Geometry --
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid region: computed crop is {width}x{height} pixels")]
    InvalidRegion { width: i64, height: i64 },

    // -- Documents --
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("document handle is closed")]
    HandleClosed,

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocsplitError {
    /// Whether the error was caused by the caller's input rather than by the
    /// environment (filesystem) or a backend library.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::EmptyGroupList
                | Self::EmptyPageGroup { .. }
                | Self::PageIndexOutOfRange { .. }
                | Self::InvalidGeometry(_)
                | Self::InvalidRegion { .. }
                | Self::UnsupportedFormat(_)
                | Self::HandleClosed
                | Self::InvalidConfig(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_carries_index() {
        let err = DocsplitError::PageIndexOutOfRange {
            index: 5,
            page_count: 3,
        };
        assert_eq!(
            err.to_string(),
            "page index 5 out of range (document has 3 pages)"
        );
    }

    #[test]
    fn input_errors_are_caller_errors() {
        assert!(DocsplitError::EmptyInput.is_caller_error());
        assert!(DocsplitError::HandleClosed.is_caller_error());
        assert!(
            DocsplitError::InvalidRegion {
                width: 0,
                height: 10
            }
            .is_caller_error()
        );
    }

    #[test]
    fn io_errors_are_not_caller_errors() {
        let err: DocsplitError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(!err.is_caller_error());
    }
}
