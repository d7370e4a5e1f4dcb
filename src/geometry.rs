//! Planar geometry helpers shared by the landmark feature extractor.
//!
//! Every division performed on landmark coordinates goes through this
//! module. A zero denominator or a non-finite quotient is reported as
//! [`Error::DegenerateGeometry`] so that no NaN or infinity can reach the
//! persistent classifier state.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A 2-D point in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2 {
    /// Horizontal coordinate (pixels, grows right)
    pub x: f64,
    /// Vertical coordinate (pixels, grows down)
    pub y: f64,
}

impl Point2 {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// True when both coordinates are finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2> for [f64; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Divide `numerator` by `denominator`, rejecting zero denominators and non-finite results
///
/// # Errors
///
/// Returns [`Error::DegenerateGeometry`] naming `what` when the quotient is undefined.
pub fn checked_div(numerator: f64, denominator: f64, what: &str) -> Result<f64> {
    if denominator == 0.0 {
        return Err(Error::DegenerateGeometry(format!("{what}: division by zero")));
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() {
        Ok(quotient)
    } else {
        Err(Error::DegenerateGeometry(format!("{what}: non-finite result {quotient}")))
    }
}

/// Sign of `value` computed as `value / |value|`
///
/// # Errors
///
/// Returns [`Error::DegenerateGeometry`] when `value` is zero or not finite.
pub fn unit_sign(value: f64, what: &str) -> Result<f64> {
    checked_div(value, value.abs(), what)
}

/// Point at arc length `length` along the segment `from -> to` of total length `total`
///
/// # Errors
///
/// Returns [`Error::DegenerateGeometry`] when `total` is zero.
pub fn point_along(from: Point2, to: Point2, length: f64, total: f64) -> Result<Point2> {
    let t = checked_div(length, total, "segment interpolation")?;
    Ok(Point2::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t))
}

/// Parametric intersection test of segments `p0-p1` and `p2-p3`
///
/// Returns true when both segment parameters lie in `[0, 1]`.
///
/// # Errors
///
/// Returns [`Error::DegenerateGeometry`] when the segments are parallel or
/// collinear (zero determinant).
pub fn segments_cross(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> Result<bool> {
    let s1 = p1 - p0;
    let s2 = p3 - p2;
    let denom = -s2.x * s1.y + s1.x * s2.y;

    let s = checked_div(-s1.y * (p0.x - p2.x) + s1.x * (p0.y - p2.y), denom, "segment intersection")?;
    let t = checked_div(s2.x * (p0.y - p2.y) - s2.y * (p0.x - p2.x), denom, "segment intersection")?;

    Ok((0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t))
}
