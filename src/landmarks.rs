//! Named facial landmarks and the geometric features derived from them.
//!
//! The landmark regressor itself is external; it hands over either the nine
//! points the classifiers need or a full 68-point iBUG shape from which they
//! are picked. Feature extraction is pure: the same landmark set always
//! yields bit-identical results.

use crate::{
    constants::{
        EYEBROW_LEFT_INDEX, EYEBROW_RIGHT_INDEX, HEAD_SIZE_SCALE, LEFT_SIDE_INDEX, MOUTH_DOWN_INDEX,
        MOUTH_LEFT_INDEX, MOUTH_RIGHT_INDEX, MOUTH_UP_INDEX, NOSE_INDEX, NUM_FACIAL_LANDMARKS,
        RIGHT_SIDE_INDEX,
    },
    geometry::{checked_div, point_along, segments_cross, unit_sign, Point2},
    utils::safe_cast::f64_to_i32,
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// The nine landmarks of one detected face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    /// Nose tip
    pub nose: Point2,
    /// Jaw point on the subject's right (image left)
    pub right_side: Point2,
    /// Jaw point on the subject's left (image right)
    pub left_side: Point2,
    /// Inner end of the right eyebrow
    pub eyebrow_right: Point2,
    /// Inner end of the left eyebrow
    pub eyebrow_left: Point2,
    /// Top of the upper lip
    pub mouth_up: Point2,
    /// Bottom of the lower lip
    pub mouth_down: Point2,
    /// Right mouth corner
    pub mouth_right: Point2,
    /// Left mouth corner
    pub mouth_left: Point2,
}

/// Head orientation angles of one face
///
/// The ratios are rescaled by `180/π` without any trigonometry; the
/// thresholds downstream are calibrated against these values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeFeatures {
    /// Positive when looking left
    pub east_west: f64,
    /// Positive when looking up
    pub south_north: f64,
}

impl GazeFeatures {
    /// Build from raw ratios
    #[must_use]
    pub fn from_ratios(east_west_ratio: f64, south_north_ratio: f64) -> Self {
        Self {
            east_west: east_west_ratio.to_degrees(),
            south_north: south_north_ratio.to_degrees(),
        }
    }
}

impl LandmarkSet {
    /// Pick the nine named points out of a 68-point shape
    ///
    /// # Errors
    ///
    /// Returns an error if the shape has fewer than 68 points.
    pub fn from_shape(shape: &[Point2]) -> Result<Self> {
        if shape.len() < NUM_FACIAL_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Expected {NUM_FACIAL_LANDMARKS} landmarks, got {}",
                shape.len()
            )));
        }

        Ok(Self {
            nose: shape[NOSE_INDEX],
            right_side: shape[RIGHT_SIDE_INDEX],
            left_side: shape[LEFT_SIDE_INDEX],
            eyebrow_right: shape[EYEBROW_RIGHT_INDEX],
            eyebrow_left: shape[EYEBROW_LEFT_INDEX],
            mouth_up: shape[MOUTH_UP_INDEX],
            mouth_down: shape[MOUTH_DOWN_INDEX],
            mouth_right: shape[MOUTH_RIGHT_INDEX],
            mouth_left: shape[MOUTH_LEFT_INDEX],
        })
    }

    fn points(&self) -> [Point2; 9] {
        [
            self.nose,
            self.right_side,
            self.left_side,
            self.eyebrow_right,
            self.eyebrow_left,
            self.mouth_up,
            self.mouth_down,
            self.mouth_right,
            self.mouth_left,
        ]
    }

    /// Check that every coordinate is finite
    ///
    /// # Errors
    ///
    /// Returns an error naming the first non-finite point.
    pub fn validate(&self) -> Result<()> {
        match self.points().iter().position(|p| !p.is_finite()) {
            Some(idx) => Err(Error::InvalidInput(format!("Landmark {idx} has a non-finite coordinate"))),
            None => Ok(()),
        }
    }

    /// Integer head size: `vertical * horizontal / 1000`
    ///
    /// The "up" reference point is the coordinate sum of both eyebrow points.
    ///
    /// # Errors
    ///
    /// Returns an error if the landmarks contain non-finite coordinates.
    pub fn head_size(&self) -> Result<i32> {
        let up = self.eyebrow_right + self.eyebrow_left;
        let horizontal = self.right_side.distance(&self.left_side);
        let vertical = self.right_side.distance(&up);
        f64_to_i32((vertical * horizontal) / HEAD_SIZE_SCALE)
    }

    /// East-west and south-north head angles
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateGeometry`] when the face sides coincide, the
    /// nose sits on a face side, or the nose lies exactly on the side-to-side
    /// line (the vertical sign is undefined there).
    pub fn gaze(&self) -> Result<GazeFeatures> {
        let nose = self.nose;
        let right = self.right_side;
        let left = self.left_side;

        let hor_right = right.distance(&nose);
        let hor_left = left.distance(&nose);
        let horizontal = right.distance(&left);

        let east_west = checked_div(hor_right - hor_left, horizontal, "east-west ratio")?;

        // Foot of the nose on the right->left segment, split in proportion
        let l = checked_div(hor_right * horizontal, hor_right + hor_left, "nose projection")?;
        let foot = point_along(right, left, l, horizontal)?;

        let sh = unit_sign(foot.y - nose.y, "south-north sign")?;
        let h = nose.distance(&foot);
        let south_north = checked_div(sh * h, hor_right, "south-north ratio")?;

        Ok(GazeFeatures::from_ratios(east_west, south_north))
    }

    /// Whether the mouth corner line crosses the lip line
    ///
    /// A closed, neutral mouth crosses; a stretched smile pulls the corners
    /// above the lip line so the segments no longer meet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateGeometry`] for parallel or collinear segments.
    pub fn mouth_crossed(&self) -> Result<bool> {
        segments_cross(self.mouth_left, self.mouth_right, self.mouth_up, self.mouth_down)
    }
}
