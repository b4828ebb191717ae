// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsplit — Core types, geometry, and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod geometry;
pub mod types;

pub use config::{ImageOutputFormat, SplitConfig};
pub use error::{DocsplitError, Result};
pub use geometry::{MinMax, Point, Polygon, Quadrilateral};
pub use types::*;
