// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — rasterized pages and polygon region cropping.

pub mod raster;
pub mod regions;

pub use raster::RasterPage;
pub use regions::{ImageRegionExtractor, NamingContext, pixel_rect};
