// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocsplitError, Result};

/// Encoding used for cropped image regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOutputFormat {
    Png,
    Jpeg,
}

impl ImageOutputFormat {
    /// File extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Settings shared by the splitting and cropping pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Predictions at or above this confidence are trusted as-is.
    pub confidence_threshold: f64,
    /// PDF header version written into extracted documents.
    pub pdf_version: String,
    /// Resolution assumed when a raster image is wrapped as a PDF page.
    pub raster_dpi: f32,
    /// Encoding for cropped regions.
    pub image_format: ImageOutputFormat,
    /// JPEG quality (1-100), used when `image_format` is `jpeg`.
    pub jpeg_quality: u8,
    /// Extension (with leading dot) for extracted documents.
    pub output_extension: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            pdf_version: "1.5".to_string(),
            raster_dpi: 150.0,
            image_format: ImageOutputFormat::Png,
            jpeg_quality: 90,
            output_extension: ".pdf".to_string(),
        }
    }
}

impl SplitConfig {
    /// Parse and validate a JSON configuration. Missing keys take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(DocsplitError::InvalidConfig(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if !(self.raster_dpi.is_finite() && self.raster_dpi > 0.0) {
            return Err(DocsplitError::InvalidConfig(format!(
                "raster_dpi must be positive, got {}",
                self.raster_dpi
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(DocsplitError::InvalidConfig(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if !self.output_extension.starts_with('.') {
            return Err(DocsplitError::InvalidConfig(format!(
                "output_extension must start with '.', got {:?}",
                self.output_extension
            )));
        }
        Ok(())
    }
}
