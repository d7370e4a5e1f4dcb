//! Recorded observation streams.
//!
//! Face detection, landmark regression and optical flow run upstream; their
//! per-frame output is recorded as JSON Lines and replayed here. Each line
//! is either a frame or a control signal:
//!
//! ```text
//! {"type":"frame","faces":[{"shape":[[x,y],...]}],"flow":{"features":[[x,y]],"tracked":[[x,y]]}}
//! {"type":"frame","faces":[{"landmarks":{"nose":[x,y],...}}]}
//! {"type":"control","signal":"stop"}
//! ```

use crate::{
    detectors::FlowSource, geometry::Point2, landmarks::LandmarkSet, pipeline::FrameInput,
    transport::ControlSignal, Error, Result,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// One line of the observation stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    /// Detector output for one captured frame
    Frame(FrameRecord),
    /// Control signal delivered between frames
    Control {
        /// The signal
        signal: ControlSignal,
    },
}

/// Detector output for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default)]
    pub faces: Vec<FaceRecord>,
    /// Optical flow of this frame; absent when no flow was recorded
    #[serde(default)]
    pub flow: Option<FlowRecord>,
}

/// Landmarks of one detected face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FaceRecord {
    /// Full 68-point shape
    Shape { shape: Vec<Point2> },
    /// The nine named points
    Landmarks { landmarks: LandmarkSet },
}

impl FaceRecord {
    /// Resolve to the nine named points
    ///
    /// # Errors
    ///
    /// Returns an error if a shape has fewer than 68 points.
    pub fn landmarks(&self) -> Result<LandmarkSet> {
        match self {
            Self::Shape { shape } => LandmarkSet::from_shape(shape),
            Self::Landmarks { landmarks } => Ok(*landmarks),
        }
    }
}

impl FrameRecord {
    /// Pipeline input for this frame
    ///
    /// Faces without usable landmarks are dropped but still counted.
    #[must_use]
    pub fn to_input(&self) -> FrameInput {
        let faces = self
            .faces
            .iter()
            .enumerate()
            .filter_map(|(idx, face)| match face.landmarks() {
                Ok(set) => Some(set),
                Err(e) => {
                    warn!("Dropping face {idx}: {e}");
                    None
                }
            })
            .collect();

        FrameInput {
            faces,
            face_count: self.faces.len(),
        }
    }
}

/// Recorded sparse optical flow of one frame
///
/// `features` are the salient points of this frame; `tracked` are the
/// positions of the previous frame's points in this frame, in the same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    #[serde(default)]
    pub features: Vec<Point2>,
    #[serde(default)]
    pub tracked: Vec<Point2>,
}

impl FlowSource for FlowRecord {
    fn detect_features(&mut self) -> Result<Vec<Point2>> {
        Ok(self.features.clone())
    }

    fn track(&mut self, points: &[Point2]) -> Result<Vec<Point2>> {
        if self.tracked.len() > points.len() {
            return Err(Error::FlowError(format!(
                "{} tracked points recorded for {} previous points",
                self.tracked.len(),
                points.len()
            )));
        }
        Ok(self.tracked.clone())
    }
}

/// Line-by-line reader of an observation stream
pub struct ReplayReader<R> {
    reader: R,
    line: usize,
    buffer: Vec<u8>,
}

impl ReplayReader<BufReader<File>> {
    /// Open a recorded stream
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputUnavailable`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::InputUnavailable(format!("Cannot open {}: {e}", path.display())))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplayReader<R> {
    /// Read records from an already open stream
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buffer: Vec::new(),
        }
    }

    /// Lines consumed so far
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Next record, or `None` at end of stream
    ///
    /// Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Replay`] with the line number for malformed records,
    /// including lines that are not valid UTF-8.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            self.buffer.clear();
            let read = self.reader.read_until(b'\n', &mut self.buffer)?;
            if read == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = std::str::from_utf8(&self.buffer)
                .map_err(|e| Error::Replay {
                    line: self.line,
                    message: e.to_string(),
                })?
                .trim();
            if text.is_empty() {
                continue;
            }

            return serde_json::from_str(text).map(Some).map_err(|e| Error::Replay {
                line: self.line,
                message: e.to_string(),
            });
        }
    }
}

impl<R: BufRead> Iterator for ReplayReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
