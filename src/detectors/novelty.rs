use super::gaze::LookDirections;
use crate::{
    constants::{DEFAULT_INITIAL_EMA, NOVELTY_CHANNELS},
    events::Event,
    utils::safe_cast::count_to_f64,
};

/// Behavioral features of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoveltyInput {
    /// Directional booleans of the face classified last
    pub look: LookDirections,
    /// Contact flag of the face classified last
    pub contact: bool,
    /// Faces detected in the frame
    pub face_count: usize,
}

impl NoveltyInput {
    /// Input of a frame without faces
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Feature vector `[right, left, up, down, contact, face_count]`
    #[must_use]
    pub fn to_vector(&self) -> [f64; NOVELTY_CHANNELS] {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        [
            flag(self.look.right),
            flag(self.look.left),
            flag(self.look.up),
            flag(self.look.down),
            flag(self.contact),
            count_to_f64(self.face_count),
        ]
    }
}

/// Smoothed feature vector and the stability counter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoveltyState {
    pub ema: [f64; NOVELTY_CHANNELS],
    /// Frames since the last novelty, starting at 1
    pub frames_since_last_novelty: u32,
}

impl Default for NoveltyState {
    fn default() -> Self {
        Self::with_ema(DEFAULT_INITIAL_EMA)
    }
}

impl NoveltyState {
    /// Start from an explicit EMA vector
    #[must_use]
    pub const fn with_ema(ema: [f64; NOVELTY_CHANNELS]) -> Self {
        Self {
            ema,
            frames_since_last_novelty: 1,
        }
    }
}

/// Result of one novelty update
#[derive(Debug, Clone, PartialEq)]
pub struct NoveltyOutcome {
    /// Symmetric chi-square distance between consecutive EMA vectors
    pub distance: f64,
    /// Published when the distance exceeds the threshold
    pub event: Option<Event>,
}

/// Multi-channel EMA anomaly detector
#[derive(Debug, Clone)]
pub struct NoveltyDetector {
    mu: f64,
    epsilon: f64,
    threshold: f64,
}

impl NoveltyDetector {
    /// Create a detector
    ///
    /// # Panics
    ///
    /// Panics if `mu` is not in (0, 1] or `epsilon` is not positive
    #[must_use]
    pub fn new(mu: f64, epsilon: f64, threshold: f64) -> Self {
        assert!(mu > 0.0 && mu <= 1.0, "Mu must be in (0, 1]");
        assert!(epsilon > 0.0, "Epsilon must be positive");
        Self { mu, epsilon, threshold }
    }

    /// Blend `input` into the EMA and score the jump
    ///
    /// The score is `distance * sqrt(frames_since_last_novelty)`, so a shift
    /// after a long calm period reports larger than the same shift shortly
    /// after the previous one.
    #[must_use]
    pub fn update(&self, state: NoveltyState, input: &NoveltyInput) -> (NoveltyState, NoveltyOutcome) {
        let x = input.to_vector();
        let previous = state.ema;
        let mut ema = previous;
        for (value, sample) in ema.iter_mut().zip(x) {
            *value = self.mu * sample + (1.0 - self.mu) * *value;
        }

        let distance: f64 = ema
            .iter()
            .zip(previous)
            .map(|(&now, before)| 2.0 * (now - before).powi(2) / (self.epsilon + (now + before).powi(2)))
            .sum();

        if distance > self.threshold {
            let score = distance * f64::from(state.frames_since_last_novelty).sqrt();
            let next = NoveltyState {
                ema,
                frames_since_last_novelty: 1,
            };
            (
                next,
                NoveltyOutcome {
                    distance,
                    event: Some(Event::Novelty { score }),
                },
            )
        } else {
            let next = NoveltyState {
                ema,
                frames_since_last_novelty: state.frames_since_last_novelty.saturating_add(1),
            };
            (next, NoveltyOutcome { distance, event: None })
        }
    }
}
