//! Discrete events published by the pipeline.

use crate::constants::{TOPIC_LOOK_AT, TOPIC_MOVEMENT, TOPIC_NOVELTY, TOPIC_SIZE_HEAD, TOPIC_SMILE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gaze direction relative to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Subject looks to their right
    Right,
    /// Subject looks to their left
    Left,
    /// Subject looks up
    Up,
    /// Subject looks down
    Down,
}

impl Direction {
    /// Evaluation order used by the gaze classifier
    pub const ALL: [Self; 4] = [Self::Right, Self::Left, Self::Up, Self::Down];

    /// Wire label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classification outcome, emitted once and never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// A gaze direction was held long enough
    Gaze {
        /// Direction held
        direction: Direction,
    },
    /// A smile was held long enough while facing the camera
    Smile,
    /// Head size moved outside the dead band
    Size {
        /// New head size
        value: i32,
    },
    /// The behavioral feature EMA jumped
    Novelty {
        /// Distance scaled by the square root of the frames since the last novelty
        score: f64,
    },
    /// Aggregate optical-flow displacement exceeded the threshold
    Motion {
        /// Bias-subtracted displacement
        magnitude: i64,
    },
}

impl Event {
    /// Topic the event is published under
    #[must_use]
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::Gaze { .. } => TOPIC_LOOK_AT,
            Self::Smile => TOPIC_SMILE,
            Self::Size { .. } => TOPIC_SIZE_HEAD,
            Self::Novelty { .. } => TOPIC_NOVELTY,
            Self::Motion { .. } => TOPIC_MOVEMENT,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gaze { direction } => write!(f, "{}: {direction}", self.topic()),
            Self::Smile => write!(f, "{}", self.topic()),
            Self::Size { value } => write!(f, "{}: {value}", self.topic()),
            Self::Novelty { score } => write!(f, "{}: {score:.4}", self.topic()),
            Self::Motion { magnitude } => write!(f, "{}: {magnitude}", self.topic()),
        }
    }
}

/// An event stamped with the frame it was produced on, as written to sinks
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord<'a> {
    /// Zero-based frame index
    pub frame: u64,
    /// Topic name
    pub topic: &'static str,
    /// Event payload
    #[serde(flatten)]
    pub event: &'a Event,
}

impl<'a> EventRecord<'a> {
    /// Wrap an event for output
    #[must_use]
    pub fn new(frame: u64, event: &'a Event) -> Self {
        Self {
            frame,
            topic: event.topic(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        assert_eq!(Event::Gaze { direction: Direction::Up }.topic(), "lookAt");
        assert_eq!(Event::Smile.topic(), "smile");
        assert_eq!(Event::Size { value: 3 }.topic(), "sizeHead");
        assert_eq!(Event::Novelty { score: 1.0 }.topic(), "novelty");
        assert_eq!(Event::Motion { magnitude: 1 }.topic(), "movement");
    }

    #[test]
    fn test_display() {
        assert_eq!(Event::Gaze { direction: Direction::Right }.to_string(), "lookAt: right");
        assert_eq!(Event::Size { value: 110 }.to_string(), "sizeHead: 110");
        assert_eq!(Event::Smile.to_string(), "smile");
    }

    #[test]
    fn test_record_serialization() {
        let event = Event::Gaze { direction: Direction::Left };
        let json = serde_json::to_value(EventRecord::new(7, &event)).unwrap();
        assert_eq!(json["frame"], 7);
        assert_eq!(json["topic"], "lookAt");
        assert_eq!(json["kind"], "gaze");
        assert_eq!(json["direction"], "left");

        let json = serde_json::to_value(EventRecord::new(0, &Event::Smile)).unwrap();
        assert_eq!(json["kind"], "smile");
    }
}
