// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry — points, polygons, and quadrilaterals in relative page
// coordinates, plus the envelope/centroid reductions used for cropping.
//
// Bounding boxes are axis-aligned envelopes built from independent min/max
// reductions over each axis. A rotated quadrilateral's bounding box is its
// envelope, not its footprint.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{DocsplitError, Result};

/// A 2D point relative to the page dimensions (conventionally 0.0..=1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// A (min, max) pair over a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// Distance between the two extremes.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Whether `value` lies within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

// -- Reductions -----------------------------------------------------------------

/// Minimum and maximum X coordinate over a point set.
pub fn min_max_x(points: &[Point]) -> Result<MinMax> {
    min_max_by(points, "min/max X", |p| p.x)
}

/// Minimum and maximum Y coordinate over a point set.
pub fn min_max_y(points: &[Point]) -> Result<MinMax> {
    min_max_by(points, "min/max Y", |p| p.y)
}

fn min_max_by(points: &[Point], what: &str, axis: impl Fn(&Point) -> f64) -> Result<MinMax> {
    let mut iter = points.iter().map(axis);
    let first = iter
        .next()
        .ok_or_else(|| DocsplitError::InvalidGeometry(format!("{what} of an empty point set")))?;
    Ok(iter.fold(
        MinMax {
            min: first,
            max: first,
        },
        |acc, v| MinMax {
            min: acc.min.min(v),
            max: acc.max.max(v),
        },
    ))
}

/// Arithmetic mean of the vertices.
pub fn centroid(points: &[Point]) -> Result<Point> {
    if points.is_empty() {
        return Err(DocsplitError::InvalidGeometry(
            "centroid of an empty point set".into(),
        ));
    }
    let count = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Ok(Point::new(sum_x / count, sum_y / count))
}

/// Axis-aligned envelope of a point set.
pub fn bounding_box(points: &[Point]) -> Result<Quadrilateral> {
    let x = min_max_x(points)?;
    let y = min_max_y(points)?;
    Ok(Quadrilateral::from_min_max(x, y))
}

/// Axis-aligned envelope covering every point of every polygon.
pub fn bounding_box_of<'a, I>(polygons: I) -> Result<Quadrilateral>
where
    I: IntoIterator<Item = &'a [Point]>,
{
    let merged: Vec<Point> = polygons.into_iter().flatten().copied().collect();
    bounding_box(&merged)
}

// -- Polygon --------------------------------------------------------------------

/// An ordered sequence of points. The order defines the boundary walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Build a polygon from `[x, y]` pairs as they appear in a prediction
    /// payload.
    pub fn from_raw_points(raw: &[[f64; 2]]) -> Self {
        Self {
            points: raw.iter().copied().map(Point::from).collect(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn centroid(&self) -> Result<Point> {
        centroid(&self.points)
    }

    pub fn bounding_box(&self) -> Result<Quadrilateral> {
        bounding_box(&self.points)
    }

    /// Whether `point` falls inside the polygon's horizontal extent.
    ///
    /// An empty polygon contains nothing.
    pub fn is_point_in_x_band(&self, point: Point) -> bool {
        min_max_x(&self.points).is_ok_and(|band| band.contains(point.x))
    }

    /// Whether `point` falls inside the polygon's vertical extent, i.e. on
    /// the same line of the page.
    pub fn is_point_in_y_band(&self, point: Point) -> bool {
        min_max_y(&self.points).is_ok_and(|band| band.contains(point.y))
    }
}

impl AsRef<[Point]> for Polygon {
    fn as_ref(&self) -> &[Point] {
        &self.points
    }
}

impl From<Quadrilateral> for Polygon {
    fn from(quad: Quadrilateral) -> Self {
        Self::new(quad.corners.to_vec())
    }
}

// -- Quadrilateral ----------------------------------------------------------------

/// Exactly four corners: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quadrilateral {
    corners: [Point; 4],
}

impl Quadrilateral {
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            corners: [top_left, top_right, bottom_right, bottom_left],
        }
    }

    /// Build from `[x, y]` pairs; anything other than four points is rejected.
    pub fn from_raw_points(raw: &[[f64; 2]]) -> Result<Self> {
        let corners: [[f64; 2]; 4] = raw.try_into().map_err(|_| {
            DocsplitError::InvalidGeometry(format!(
                "a quadrilateral needs exactly 4 points, got {}",
                raw.len()
            ))
        })?;
        Ok(Self {
            corners: corners.map(Point::from),
        })
    }

    fn from_min_max(x: MinMax, y: MinMax) -> Self {
        Self::new(
            Point::new(x.min, y.min),
            Point::new(x.max, y.min),
            Point::new(x.max, y.max),
            Point::new(x.min, y.max),
        )
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }

    /// Corner by position; `None` outside 0..=3.
    pub fn corner(&self, index: usize) -> Option<Point> {
        self.corners.get(index).copied()
    }

    pub fn points(&self) -> &[Point] {
        &self.corners
    }

    pub fn min_max_x(&self) -> MinMax {
        // Four corners, never empty.
        fold_axis(&self.corners, |p| p.x)
    }

    pub fn min_max_y(&self) -> MinMax {
        fold_axis(&self.corners, |p| p.y)
    }

    /// Width of the axis-aligned envelope.
    pub fn width(&self) -> f64 {
        self.min_max_x().span()
    }

    /// Height of the axis-aligned envelope.
    pub fn height(&self) -> f64 {
        self.min_max_y().span()
    }

    pub fn centroid(&self) -> Point {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }

    /// Axis-aligned envelope of this quadrilateral.
    pub fn bounding_box(&self) -> Self {
        Self::from_min_max(self.min_max_x(), self.min_max_y())
    }
}

fn fold_axis(corners: &[Point; 4], axis: impl Fn(&Point) -> f64) -> MinMax {
    let first = axis(&corners[0]);
    corners[1..].iter().map(axis).fold(
        MinMax {
            min: first,
            max: first,
        },
        |acc, v| MinMax {
            min: acc.min.min(v),
            max: acc.max.max(v),
        },
    )
}

impl Index<usize> for Quadrilateral {
    type Output = Point;

    fn index(&self, index: usize) -> &Point {
        &self.corners[index]
    }
}

impl AsRef<[Point]> for Quadrilateral {
    fn as_ref(&self) -> &[Point] {
        &self.corners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.1, 0.1),
            Point::new(0.3, 0.1),
            Point::new(0.3, 0.3),
            Point::new(0.1, 0.3),
        ]
    }

    #[test]
    fn min_max_over_square() {
        let x = min_max_x(&square()).unwrap();
        let y = min_max_y(&square()).unwrap();
        assert_eq!(x, MinMax { min: 0.1, max: 0.3 });
        assert_eq!(y, MinMax { min: 0.1, max: 0.3 });
    }

    #[test]
    fn empty_point_set_is_invalid_geometry() {
        assert!(matches!(
            centroid(&[]),
            Err(DocsplitError::InvalidGeometry(_))
        ));
        assert!(matches!(
            bounding_box(&[]),
            Err(DocsplitError::InvalidGeometry(_))
        ));
        assert!(matches!(
            min_max_x(&[]),
            Err(DocsplitError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let c = centroid(&square()).unwrap();
        assert!(approx(c.x, 0.2) && approx(c.y, 0.2), "got {c:?}");
    }

    /// A diamond (square rotated 45 degrees) has the full envelope as its
    /// bounding box, not its own footprint.
    #[test]
    fn rotated_quad_bounding_box_is_envelope() {
        let diamond = [
            Point::new(0.5, 0.0),
            Point::new(1.0, 0.5),
            Point::new(0.5, 1.0),
            Point::new(0.0, 0.5),
        ];
        let bbox = bounding_box(&diamond).unwrap();
        assert_eq!(bbox.top_left(), Point::new(0.0, 0.0));
        assert_eq!(bbox.top_right(), Point::new(1.0, 0.0));
        assert_eq!(bbox.bottom_right(), Point::new(1.0, 1.0));
        assert_eq!(bbox.bottom_left(), Point::new(0.0, 1.0));
    }

    #[test]
    fn quadrilateral_requires_four_points() {
        let three = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        let err = Quadrilateral::from_raw_points(&three).unwrap_err();
        assert!(matches!(err, DocsplitError::InvalidGeometry(_)));

        let four = [[0.1, 0.1], [0.3, 0.1], [0.3, 0.3], [0.1, 0.3]];
        let quad = Quadrilateral::from_raw_points(&four).unwrap();
        assert_eq!(quad[2], Point::new(0.3, 0.3));
        assert!(quad.corner(4).is_none());
    }

    #[test]
    fn quadrilateral_envelope_dimensions() {
        let quad = Quadrilateral::from_raw_points(&[[0.1, 0.2], [0.4, 0.25], [0.35, 0.6], [0.05, 0.5]])
            .unwrap();
        assert!(approx(quad.width(), 0.35));
        assert!(approx(quad.height(), 0.4));
    }

    #[test]
    fn band_membership() {
        let poly = Polygon::from_raw_points(&[[0.1, 0.4], [0.6, 0.4], [0.6, 0.5], [0.1, 0.5]]);
        assert!(poly.is_point_in_y_band(Point::new(0.9, 0.45)));
        assert!(!poly.is_point_in_y_band(Point::new(0.2, 0.55)));
        assert!(poly.is_point_in_x_band(Point::new(0.3, 0.0)));
        assert!(!Polygon::default().is_point_in_x_band(Point::new(0.0, 0.0)));
    }

    #[test]
    fn bounding_box_of_several_polygons() {
        let a = Polygon::from_raw_points(&[[0.1, 0.1], [0.2, 0.2]]);
        let b = Polygon::from_raw_points(&[[0.5, 0.05], [0.7, 0.3]]);
        let merged = bounding_box_of([a.points(), b.points()]).unwrap();
        assert_eq!(merged.top_left(), Point::new(0.1, 0.05));
        assert_eq!(merged.bottom_right(), Point::new(0.7, 0.3));
    }

    #[test]
    fn derived_operations_do_not_reorder_polygon() {
        let poly = Polygon::new(square());
        let _ = poly.centroid().unwrap();
        let _ = poly.bounding_box().unwrap();
        assert_eq!(poly.points(), square().as_slice());
    }
}
