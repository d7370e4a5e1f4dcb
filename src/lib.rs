//! Engagement vision library for child-robot interaction sessions.
//!
//! Turns per-frame facial landmarks and sparse optical flow into discrete
//! social-signal events:
//! - gaze direction (right, left, up, down) held for several frames
//! - smiles held while facing the camera
//! - head size changes beyond a dead band
//! - novelty in the smoothed behavioral feature vector
//! - ambient motion from tracked feature points
//!
//! Face detection, landmark regression and optical flow are external; their
//! output is recorded as JSON Lines and replayed through the
//! [`pipeline::FramePipeline`].
//!
//! # Examples
//!
//! ## Classifying frames
//!
//! ```
//! use engagement_vision::{
//!     config::Config,
//!     geometry::Point2,
//!     landmarks::LandmarkSet,
//!     pipeline::{FrameInput, FramePipeline},
//! };
//!
//! let face = LandmarkSet {
//!     nose: Point2::new(20.0, 0.05),
//!     right_side: Point2::new(0.0, 0.0),
//!     left_side: Point2::new(100.0, 0.0),
//!     eyebrow_right: Point2::new(45.0, -40.0),
//!     eyebrow_left: Point2::new(55.0, -40.0),
//!     mouth_up: Point2::new(50.0, 25.0),
//!     mouth_down: Point2::new(50.0, 35.0),
//!     mouth_right: Point2::new(40.0, 30.0),
//!     mouth_left: Point2::new(60.0, 30.0),
//! };
//!
//! let mut pipeline = FramePipeline::new(&Config::default());
//! let mut topics = Vec::new();
//! for _ in 0..6 {
//!     let report = pipeline.process(&FrameInput::new(vec![face]), None);
//!     topics.extend(report.events.iter().map(|e| e.topic()));
//! }
//!
//! // Head size on the first frame, the held gaze on the sixth
//! assert_eq!(topics, ["sizeHead", "lookAt"]);
//! ```
//!
//! ## Replaying a recording
//!
//! ```no_run
//! use engagement_vision::{app::VisionApp, config::Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file("engagement.yaml")?;
//! let summary = VisionApp::from_config(&config)?.run()?;
//! println!("{} frames, {} events", summary.frames, summary.events_published);
//! # Ok(())
//! # }
//! ```

/// Planar points and guarded division
pub mod geometry;

/// Named facial landmarks and derived features
pub mod landmarks;

/// Per-signal detectors
pub mod detectors;

/// Published events
pub mod events;

/// Frame orchestrator
pub mod pipeline;

/// Event sinks and control signals
pub mod transport;

/// Recorded observation streams
pub mod replay;

/// Utility functions for numeric conversions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
