//! Per-signal detectors.
//!
//! Each detector pairs a small parameter struct with an explicit state value.
//! The hysteresis and EMA detectors are pure: `update` takes the previous
//! state and returns the next one together with anything to publish, so the
//! frame orchestrator owns the single shared instance of every state.

/// Debounced gaze direction classifier
pub mod gaze;

/// Debounced smile classifier
pub mod smile;

/// Dead-band head size change detector
pub mod size;

/// EMA-based behavioral novelty detector
pub mod novelty;

/// Optical-flow displacement aggregator
pub mod motion;

pub use gaze::{GazeClassifier, GazeOutcome, GazeState, LookDirections};
pub use motion::{Displacement, FlowSource, MotionAggregator, MotionState};
pub use novelty::{NoveltyDetector, NoveltyInput, NoveltyOutcome, NoveltyState};
pub use size::{SizeDetector, SizeState};
pub use smile::SmileClassifier;
