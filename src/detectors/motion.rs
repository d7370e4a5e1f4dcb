//! Ambient motion from sparse optical flow.
//!
//! Corner detection and pyramidal tracking are external; this module only
//! keeps the tracked point set between frames and turns the per-point
//! displacement into a dead-band motion event.

use crate::{events::Event, geometry::Point2, utils::safe_cast::f64_to_i64, Error, Result};
use log::debug;

/// Sparse optical-flow collaborator for the current frame
pub trait FlowSource {
    /// Salient points of the current frame, used to (re)seed tracking
    ///
    /// # Errors
    ///
    /// Returns an error if feature extraction fails.
    fn detect_features(&mut self) -> Result<Vec<Point2>>;

    /// Positions of `points` (from the previous frame) in the current frame
    ///
    /// # Errors
    ///
    /// Returns an error if tracking fails.
    fn track(&mut self, points: &[Point2]) -> Result<Vec<Point2>>;
}

/// Point bookkeeping of the aggregator
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MotionState {
    /// No usable point set; the next frame seeds one
    #[default]
    NeedsSeed,
    /// Points detected in the previous frame
    Tracking {
        /// Points to track into the next frame
        points: Vec<Point2>,
    },
}

/// Sum of absolute per-axis displacement over matched points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Displacement {
    pub x_sum: f64,
    pub y_sum: f64,
}

impl Displacement {
    /// Aggregate matched `(previous, current)` pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Point2, Point2)>,
    {
        pairs.into_iter().fold(Self::default(), |acc, (prev, curr)| Self {
            x_sum: acc.x_sum + (curr.x - prev.x).abs(),
            y_sum: acc.y_sum + (curr.y - prev.y).abs(),
        })
    }

    /// `x_sum + y_sum`
    #[must_use]
    pub fn total(&self) -> f64 {
        self.x_sum + self.y_sum
    }
}

/// Dead-band motion detector over tracked feature points
#[derive(Debug, Clone)]
pub struct MotionAggregator {
    threshold: f64,
    bias: f64,
    state: MotionState,
}

impl MotionAggregator {
    /// Create an aggregator that starts by seeding
    ///
    /// # Panics
    ///
    /// Panics if `threshold` or `bias` is not finite
    #[must_use]
    pub fn new(threshold: f64, bias: f64) -> Self {
        assert!(threshold.is_finite(), "Motion threshold must be finite");
        assert!(bias.is_finite(), "Motion bias must be finite");
        Self {
            threshold,
            bias,
            state: MotionState::NeedsSeed,
        }
    }

    /// Current point bookkeeping
    #[must_use]
    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// True when the next step seeds instead of measuring
    #[must_use]
    pub fn needs_seed(&self) -> bool {
        matches!(self.state, MotionState::NeedsSeed)
    }

    /// Points carried into the next frame
    #[must_use]
    pub fn tracked_points(&self) -> &[Point2] {
        match &self.state {
            MotionState::NeedsSeed => &[],
            MotionState::Tracking { points } => points,
        }
    }

    /// Drop the tracked points; the next step reseeds
    pub fn request_reinit(&mut self) {
        if !self.needs_seed() {
            debug!("Motion tracking reinitialisation requested");
        }
        self.state = MotionState::NeedsSeed;
    }

    /// Process one frame through the flow collaborator
    ///
    /// Seeds when needed; otherwise tracks the previous points, measures the
    /// displacement, reseeds from the current frame and evaluates.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error, or an error if the magnitude is not
    /// representable; either way the aggregator is left needing a seed.
    pub fn step<F>(&mut self, flow: &mut F) -> Result<Option<Event>>
    where
        F: FlowSource + ?Sized,
    {
        match std::mem::take(&mut self.state) {
            MotionState::NeedsSeed => {
                let points = flow.detect_features()?;
                debug!("Seeded motion tracking with {} points", points.len());
                self.state = MotionState::Tracking { points };
                Ok(None)
            }
            MotionState::Tracking { points } if points.is_empty() => {
                self.state = MotionState::Tracking {
                    points: flow.detect_features()?,
                };
                Ok(None)
            }
            MotionState::Tracking { points } => {
                let tracked = flow.track(&points)?;
                if tracked.len() != points.len() {
                    debug!("Tracked {} of {} points", tracked.len(), points.len());
                }
                let displacement = Displacement::from_pairs(points.into_iter().zip(tracked));
                let event = self.evaluate(displacement)?;
                self.state = MotionState::Tracking {
                    points: flow.detect_features()?,
                };
                Ok(event)
            }
        }
    }

    /// Apply the dead band to an aggregated displacement
    ///
    /// # Errors
    ///
    /// Returns an error if the magnitude is not representable.
    pub fn evaluate(&self, displacement: Displacement) -> Result<Option<Event>> {
        let total = displacement.total();
        if total > self.threshold {
            let magnitude = f64_to_i64(total - self.bias)
                .map_err(|e| Error::FlowError(format!("Motion magnitude out of range: {e}")))?;
            Ok(Some(Event::Motion { magnitude }))
        } else {
            Ok(None)
        }
    }
}
