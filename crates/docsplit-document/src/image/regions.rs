// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image region extraction — crops each detected polygon's axis-aligned
// envelope out of a rasterized page.
//
// Relative coordinates are scaled to pixels by truncation toward zero, the
// same way for all four edges, so width and height stay consistent with the
// offsets. Polygons may be rotated; the crop is always their envelope.

use std::collections::HashMap;

use docsplit_core::error::{DocsplitError, Result};
use docsplit_core::types::{RegionPrediction, SourceDocument, file_stem};
use docsplit_core::{ImageOutputFormat, Quadrilateral, SplitConfig};
use imageproc::rect::Rect;
use tracing::{debug, info, instrument};

use crate::image::raster::{RasterPage, encode};
use crate::output::ExtractedImage;

/// Names cropped regions after the document they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    stem: String,
}

impl NamingContext {
    /// Derive the naming stem from a filename (`receipts.jpg` -> `receipts`).
    pub fn from_filename(filename: &str) -> Self {
        Self {
            stem: file_stem(filename).to_string(),
        }
    }

    pub fn from_source(source: &SourceDocument) -> Self {
        Self {
            stem: source.stem().to_string(),
        }
    }

    /// `{stem}_page{page_number}-{element_index}.{ext}`.
    pub fn filename(&self, page_number: usize, element_index: usize, format: ImageOutputFormat) -> String {
        format!(
            "{}_page{}-{}.{}",
            self.stem,
            page_number,
            element_index,
            format.extension()
        )
    }
}

/// Pixel rectangle under `polygon` on a `width` x `height` page, clamped to
/// the page.
///
/// Fails with `InvalidRegion` when the rectangle has no area.
pub fn pixel_rect(polygon: &Quadrilateral, width: u32, height: u32) -> Result<Rect> {
    let x = polygon.min_max_x();
    let y = polygon.min_max_y();

    let left = to_pixel(x.min, width);
    let right = to_pixel(x.max, width);
    let top = to_pixel(y.min, height);
    let bottom = to_pixel(y.max, height);

    let crop_width = right - left;
    let crop_height = bottom - top;
    if crop_width <= 0 || crop_height <= 0 {
        return Err(DocsplitError::InvalidRegion {
            width: crop_width,
            height: crop_height,
        });
    }

    Ok(Rect::at(left as i32, top as i32).of_size(crop_width as u32, crop_height as u32))
}

/// Scale a relative coordinate to a pixel position inside `0..=extent`.
fn to_pixel(relative: f64, extent: u32) -> i64 {
    let absolute = (relative * f64::from(extent)).trunc() as i64;
    absolute.clamp(0, i64::from(extent))
}

/// Crops polygons out of rasterized pages.
#[derive(Debug, Clone, Copy)]
pub struct ImageRegionExtractor {
    format: ImageOutputFormat,
    jpeg_quality: u8,
}

impl Default for ImageRegionExtractor {
    fn default() -> Self {
        Self::from_config(&SplitConfig::default())
    }
}

impl ImageRegionExtractor {
    pub fn new(format: ImageOutputFormat, jpeg_quality: u8) -> Self {
        Self {
            format,
            jpeg_quality,
        }
    }

    pub fn from_config(config: &SplitConfig) -> Self {
        Self::new(config.image_format, config.jpeg_quality)
    }

    /// Crop each polygon from `raster`, in order. The element index of each
    /// output is the polygon's position in `polygons`.
    ///
    /// The first degenerate polygon aborts the batch.
    #[instrument(skip(self, raster, polygons, naming), fields(polygons = polygons.len(), width = raster.width(), height = raster.height()))]
    pub fn extract_regions(
        &self,
        raster: &RasterPage,
        polygons: &[Quadrilateral],
        page_number: usize,
        naming: &NamingContext,
    ) -> Result<Vec<ExtractedImage>> {
        let mut extracted = Vec::with_capacity(polygons.len());
        for (element_index, polygon) in polygons.iter().enumerate() {
            extracted.push(self.extract_one(raster, polygon, page_number, element_index, naming)?);
        }
        info!(regions = extracted.len(), "Regions extracted");
        Ok(extracted)
    }

    /// Crop `{page_number, polygon}` predictions from a set of rasterized
    /// pages. `page_number` indexes into `pages`; element indexes count from
    /// zero on every page. Outputs follow prediction order.
    #[instrument(skip_all, fields(pages = pages.len(), predictions = predictions.len()))]
    pub fn extract_predictions(
        &self,
        pages: &[RasterPage],
        predictions: &[RegionPrediction],
        naming: &NamingContext,
    ) -> Result<Vec<ExtractedImage>> {
        if let Some(bad) = predictions.iter().find(|p| p.page_number >= pages.len()) {
            return Err(DocsplitError::PageIndexOutOfRange {
                index: bad.page_number as i64,
                page_count: pages.len(),
            });
        }

        let mut next_element: HashMap<usize, usize> = HashMap::new();
        let mut extracted = Vec::with_capacity(predictions.len());
        for prediction in predictions {
            let counter = next_element.entry(prediction.page_number).or_insert(0);
            let element_index = *counter;
            *counter += 1;

            extracted.push(self.extract_one(
                &pages[prediction.page_number],
                &prediction.polygon,
                prediction.page_number,
                element_index,
                naming,
            )?);
        }
        info!(regions = extracted.len(), "Predicted regions extracted");
        Ok(extracted)
    }

    fn extract_one(
        &self,
        raster: &RasterPage,
        polygon: &Quadrilateral,
        page_number: usize,
        element_index: usize,
        naming: &NamingContext,
    ) -> Result<ExtractedImage> {
        let rect = pixel_rect(polygon, raster.width(), raster.height())?;
        let cropped = raster.crop(rect);
        let bytes = encode(&cropped, self.format, self.jpeg_quality)?;
        let filename = naming.filename(page_number, element_index, self.format);

        debug!(
            element_index,
            x = rect.left(),
            y = rect.top(),
            width = rect.width(),
            height = rect.height(),
            %filename,
            "Region cropped"
        );
        Ok(ExtractedImage::new(
            filename,
            page_number,
            element_index,
            self.format,
            bytes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn quad(raw: [[f64; 2]; 4]) -> Quadrilateral {
        Quadrilateral::from_raw_points(&raw).unwrap()
    }

    fn square(min: f64, max: f64) -> Quadrilateral {
        quad([[min, min], [max, min], [max, max], [min, max]])
    }

    #[test]
    fn naming_matches_source_stem() {
        let source = SourceDocument::new("batch.03.png", Vec::new());
        assert_eq!(
            NamingContext::from_filename("batch.03.png"),
            NamingContext::from_source(&source)
        );
        assert_eq!(
            NamingContext::from_filename(".hidden").filename(0, 0, ImageOutputFormat::Png),
            ".hidden_page0-0.png"
        );
    }

    #[test]
    fn square_on_thousand_pixel_page() {
        let rect = pixel_rect(&square(0.1, 0.3), 1000, 1000).unwrap();
        assert_eq!((rect.left(), rect.top()), (100, 100));
        assert_eq!((rect.width(), rect.height()), (200, 200));
    }

    #[test]
    fn coordinates_truncate_toward_zero() {
        let rect = pixel_rect(&square(0.1234, 0.5678), 1000, 1000).unwrap();
        assert_eq!((rect.left(), rect.width()), (123, 444));
    }

    #[test]
    fn rotated_polygon_uses_envelope() {
        let diamond = quad([[0.5, 0.2], [0.7, 0.5], [0.5, 0.8], [0.3, 0.5]]);
        let rect = pixel_rect(&diamond, 100, 100).unwrap();
        assert_eq!((rect.left(), rect.top()), (30, 20));
        assert_eq!((rect.width(), rect.height()), (40, 60));
    }

    #[test]
    fn region_past_edge_is_clamped() {
        let rect = pixel_rect(&square(0.9, 1.2), 1000, 1000).unwrap();
        assert_eq!((rect.left(), rect.width()), (900, 100));
    }

    #[test]
    fn degenerate_region_rejected() {
        let flat = quad([[0.2, 0.1], [0.2, 0.1], [0.2, 0.5], [0.2, 0.5]]);
        let err = pixel_rect(&flat, 1000, 1000).unwrap_err();
        assert!(matches!(err, DocsplitError::InvalidRegion { width: 0, height: 400 }));

        let outside = square(1.5, 1.8);
        assert!(matches!(
            pixel_rect(&outside, 1000, 1000),
            Err(DocsplitError::InvalidRegion { .. })
        ));
    }

    /// The crop starts at the polygon's top-left pixel: paint the corners of
    /// the expected rectangle and look for them in the output.
    #[test]
    fn crop_contents_anchor_at_offset() {
        let mut canvas = RgbImage::from_pixel(1000, 1000, Rgb([255, 255, 255]));
        canvas.put_pixel(100, 100, Rgb([255, 0, 0]));
        canvas.put_pixel(299, 299, Rgb([0, 0, 255]));
        let page = RasterPage::from_dynamic(DynamicImage::ImageRgb8(canvas));

        let extractor = ImageRegionExtractor::default();
        let naming = NamingContext::from_filename("receipts.jpg");
        let images = extractor
            .extract_regions(&page, &[square(0.1, 0.3)], 0, &naming)
            .unwrap();

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].filename(), "receipts_page0-0.png");
        let crop = image::load_from_memory(images[0].bytes()).unwrap().to_rgb8();
        assert_eq!(crop.dimensions(), (200, 200));
        assert_eq!(crop.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(crop.get_pixel(199, 199), &Rgb([0, 0, 255]));
    }

    #[test]
    fn element_indexes_follow_input_order() {
        let page = RasterPage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(200, 100)));
        let extractor = ImageRegionExtractor::new(ImageOutputFormat::Jpeg, 85);
        let naming = NamingContext::from_filename("scan.png");
        let images = extractor
            .extract_regions(&page, &[square(0.0, 0.5), square(0.5, 1.0)], 3, &naming)
            .unwrap();

        let names: Vec<&str> = images.iter().map(|i| i.filename()).collect();
        assert_eq!(names, vec!["scan_page3-0.jpg", "scan_page3-1.jpg"]);
        assert!(images.iter().all(|i| i.page_number() == 3));
        assert!(images[1].bytes().starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn degenerate_polygon_aborts_batch() {
        let page = RasterPage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(100, 100)));
        let naming = NamingContext::from_filename("scan.png");
        let result = ImageRegionExtractor::default().extract_regions(
            &page,
            &[square(0.1, 0.2), square(0.4, 0.4)],
            0,
            &naming,
        );
        assert!(matches!(result, Err(DocsplitError::InvalidRegion { .. })));
    }

    #[test]
    fn predictions_count_elements_per_page() {
        let pages = vec![
            RasterPage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(100, 100))),
            RasterPage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(100, 100))),
        ];
        let predictions = vec![
            RegionPrediction { page_number: 0, polygon: square(0.0, 0.5) },
            RegionPrediction { page_number: 1, polygon: square(0.1, 0.4) },
            RegionPrediction { page_number: 0, polygon: square(0.5, 1.0) },
        ];
        let naming = NamingContext::from_filename("multi.pdf");
        let images = ImageRegionExtractor::default()
            .extract_predictions(&pages, &predictions, &naming)
            .unwrap();

        let ids: Vec<(usize, usize)> = images
            .iter()
            .map(|i| (i.page_number(), i.element_index()))
            .collect();
        assert_eq!(ids, vec![(0, 0), (1, 0), (0, 1)]);
        assert_eq!(images[2].filename(), "multi_page0-1.png");
    }

    #[test]
    fn prediction_for_missing_page_rejected() {
        let pages = vec![RasterPage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(10, 10)))];
        let predictions = vec![RegionPrediction { page_number: 2, polygon: square(0.0, 1.0) }];
        let err = ImageRegionExtractor::default()
            .extract_predictions(&pages, &predictions, &NamingContext::from_filename("x.png"))
            .unwrap_err();
        assert!(matches!(
            err,
            DocsplitError::PageIndexOutOfRange { index: 2, page_count: 1 }
        ));
    }

    #[test]
    fn written_images_land_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let page = RasterPage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(50, 50)));
        let images = ImageRegionExtractor::default()
            .extract_regions(&page, &[square(0.2, 0.6)], 1, &NamingContext::from_filename("r.png"))
            .unwrap();
        let path = images[0].write_to_dir(dir.path()).unwrap();
        let reloaded = RasterPage::open(&path).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (20, 20));
    }
}
