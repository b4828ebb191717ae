// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster promotion — wrap a single raster image as a one-page PDF using
// `printpdf` 0.8, so images go through the same page-cutting path as PDFs.
//
// The page is sized to the image at the configured DPI with no margins, so
// the page content is exactly the image.

use docsplit_core::error::{DocsplitError, Result};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

const MM_PER_INCH: f32 = 25.4;

/// Build a one-page PDF around `image_bytes`.
///
/// Fails with `UnsupportedFormat` when the bytes do not decode as an image.
#[instrument(skip(image_bytes), fields(bytes_len = image_bytes.len()))]
pub fn promote_raster(image_bytes: &[u8], title: &str, dpi: f32) -> Result<Vec<u8>> {
    let dynamic_image = ::image::load_from_memory(image_bytes).map_err(|err| {
        DocsplitError::UnsupportedFormat(format!("failed to decode raster source: {}", err))
    })?;

    let img_width = dynamic_image.width() as usize;
    let img_height = dynamic_image.height() as usize;
    if img_width == 0 || img_height == 0 {
        return Err(DocsplitError::UnsupportedFormat(
            "raster source has no pixels".to_string(),
        ));
    }

    info!(img_width, img_height, dpi, "Promoting raster to single-page PDF");

    // Convert to RGB8 for printpdf.
    let rgb_image = dynamic_image.to_rgb8();
    let raw = RawImage {
        pixels: RawImageData::U8(rgb_image.into_raw()),
        width: img_width,
        height: img_height,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };

    let mut doc = PdfDocument::new(title);
    let xobject_id = doc.add_image(&raw);

    let page_w = Mm(img_width as f32 / dpi * MM_PER_INCH);
    let page_h = Mm(img_height as f32 / dpi * MM_PER_INCH);

    let ops = vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(0.0)),
            translate_y: Some(Pt(0.0)),
            scale_x: Some(1.0),
            scale_y: Some(1.0),
            dpi: Some(dpi),
            rotate: None,
        },
    }];

    doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

    debug!(
        output_bytes = output.len(),
        warnings = warnings.len(),
        "Raster wrapped"
    );
    Ok(output)
}
