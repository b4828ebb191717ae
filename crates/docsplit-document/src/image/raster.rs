// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster page — a decoded page image plus the crop and encode steps the
// region extractor needs. Uses the `image` crate for codecs and `imageproc`
// rectangles for crop bounds.

use docsplit_core::ImageOutputFormat;
use docsplit_core::error::{DocsplitError, Result};
use image::{DynamicImage, ImageFormat};
use imageproc::rect::Rect;
use tracing::{debug, info, instrument};

/// A single rasterized page. Read-only once built.
#[derive(Debug, Clone)]
pub struct RasterPage {
    image: DynamicImage,
}

impl RasterPage {
    // -- Construction ---------------------------------------------------------

    /// Decode a page from encoded bytes (PNG, JPEG, TIFF, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data).map_err(|err| {
            DocsplitError::UnsupportedFormat(format!("failed to decode raster page: {}", err))
        })?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Raster page decoded from bytes"
        );
        Ok(Self { image })
    }

    /// Load a page image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let image = image::open(path.as_ref()).map_err(|err| {
            DocsplitError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = image.width(), height = image.height(), "Raster page loaded");
        Ok(Self { image })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    // -- Cropping -------------------------------------------------------------

    /// Copy out the pixels under `rect`. The rectangle must already lie
    /// within the page.
    pub fn crop(&self, rect: Rect) -> DynamicImage {
        self.image
            .crop_imm(rect.left() as u32, rect.top() as u32, rect.width(), rect.height())
    }
}

/// Encode an image in the requested output format.
pub fn encode(image: &DynamicImage, format: ImageOutputFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    match format {
        ImageOutputFormat::Png => encode_to_format(image, ImageFormat::Png),
        ImageOutputFormat::Jpeg => {
            let mut buffer = Vec::new();
            let rgb = image.to_rgb8();
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, jpeg_quality);
            rgb.write_with_encoder(encoder).map_err(|err| {
                DocsplitError::ImageError(format!("JPEG encoding failed: {}", err))
            })?;
            Ok(buffer)
        }
    }
}

fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        DocsplitError::ImageError(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}
