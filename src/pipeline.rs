//! Frame orchestrator.
//!
//! Owns the single instance of every detector state and sequences the
//! detectors once per frame: motion first, then gaze, size and smile for
//! each face in landmark order, then novelty. All faces of a frame share
//! the same counters; the face classified last feeds the novelty vector.

use crate::{
    config::{Config, NoveltyCadence},
    detectors::{
        FlowSource, GazeClassifier, GazeState, MotionAggregator, NoveltyDetector, NoveltyInput, NoveltyState,
        SizeDetector, SizeState, SmileClassifier,
    },
    events::Event,
    landmarks::LandmarkSet,
};
use log::{debug, warn};

/// Faces observed in one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Landmark sets in detector order
    pub faces: Vec<LandmarkSet>,
    /// Faces reported by the detector, including any without usable landmarks
    pub face_count: usize,
}

impl FrameInput {
    /// Input whose face count equals the number of landmark sets
    #[must_use]
    pub fn new(faces: Vec<LandmarkSet>) -> Self {
        let face_count = faces.len();
        Self { faces, face_count }
    }

    /// A frame without faces
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Everything one frame produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Zero-based frame index
    pub frame: u64,
    /// Events in production order
    pub events: Vec<Event>,
    /// Faces that were looking at the camera
    pub contacts: Vec<LandmarkSet>,
    /// Distance of the last novelty update
    pub novelty_distance: f64,
}

/// Stateful per-frame classifier
pub struct FramePipeline {
    gaze: GazeClassifier,
    smile: SmileClassifier,
    size: SizeDetector,
    novelty: NoveltyDetector,
    motion: Option<MotionAggregator>,
    cadence: NoveltyCadence,
    waiting_state: String,
    gaze_state: GazeState,
    size_state: SizeState,
    novelty_state: NoveltyState,
    external_state: String,
    frame_index: u64,
}

impl FramePipeline {
    /// Build detectors and initial states from configuration
    ///
    /// # Panics
    ///
    /// Panics on parameters that [`Config::validate`] rejects
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let motion = config
            .motion
            .enabled
            .then(|| MotionAggregator::new(config.motion.threshold, config.motion.bias));

        Self {
            gaze: GazeClassifier::new(config.gaze.angle_threshold, config.gaze.debounce_frames),
            smile: SmileClassifier::new(config.smile.debounce_frames),
            size: SizeDetector::new(config.size.dead_band),
            novelty: NoveltyDetector::new(config.novelty.mu, config.novelty.epsilon, config.novelty.threshold),
            motion,
            cadence: config.novelty.cadence,
            waiting_state: config.motion.waiting_state.clone(),
            gaze_state: GazeState::default(),
            size_state: SizeState::default(),
            novelty_state: NoveltyState::with_ema(config.novelty.initial_ema),
            external_state: String::new(),
            frame_index: 0,
        }
    }

    /// Record the external activity state
    ///
    /// Motion tracking is suspended and reseeded while it equals the waiting state.
    pub fn set_external_state(&mut self, state: &str) {
        debug!("External state changed to {state:?}");
        self.external_state = state.to_string();
    }

    /// Whether motion tracking is currently suspended
    #[must_use]
    pub fn motion_suspended(&self) -> bool {
        self.external_state == self.waiting_state
    }

    /// Shared gaze and smile counters
    #[must_use]
    pub fn gaze_state(&self) -> &GazeState {
        &self.gaze_state
    }

    /// Last published head size
    #[must_use]
    pub fn size_state(&self) -> &SizeState {
        &self.size_state
    }

    /// EMA vector and stability counter
    #[must_use]
    pub fn novelty_state(&self) -> &NoveltyState {
        &self.novelty_state
    }

    /// Motion aggregator, if enabled
    #[must_use]
    pub fn motion(&self) -> Option<&MotionAggregator> {
        self.motion.as_ref()
    }

    /// Frames processed so far
    #[must_use]
    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    /// Process one frame
    ///
    /// `flow` is the optical-flow collaborator for this frame; without one
    /// the motion aggregator is left untouched.
    pub fn process(&mut self, input: &FrameInput, flow: Option<&mut dyn FlowSource>) -> FrameReport {
        let mut report = FrameReport {
            frame: self.frame_index,
            ..FrameReport::default()
        };
        self.frame_index += 1;

        self.step_motion(flow, &mut report);

        let face_count = input.face_count.max(input.faces.len());
        let mut last_input = (face_count > 0).then(|| NoveltyInput {
            face_count,
            ..NoveltyInput::default()
        });

        for (idx, face) in input.faces.iter().enumerate() {
            let novelty_input = self.classify_face(idx, face, face_count, &mut report);
            if self.cadence == NoveltyCadence::PerFace {
                self.step_novelty(&novelty_input, &mut report);
            }
            last_input = Some(novelty_input);
        }

        match self.cadence {
            NoveltyCadence::PerFrame => {
                let novelty_input = last_input.unwrap_or_else(NoveltyInput::empty);
                self.step_novelty(&novelty_input, &mut report);
            }
            NoveltyCadence::PerFace if input.faces.is_empty() => {
                let novelty_input = last_input.unwrap_or_else(NoveltyInput::empty);
                self.step_novelty(&novelty_input, &mut report);
            }
            NoveltyCadence::PerFace => {}
        }

        report
    }

    fn step_motion(&mut self, flow: Option<&mut dyn FlowSource>, report: &mut FrameReport) {
        let suspended = self.motion_suspended();
        let Some(motion) = self.motion.as_mut() else {
            return;
        };

        if suspended {
            motion.request_reinit();
            return;
        }

        let Some(flow) = flow else {
            return;
        };

        match motion.step(flow) {
            Ok(Some(event)) => report.events.push(event),
            Ok(None) => {}
            Err(e) => warn!("Motion step failed, reseeding next frame: {e}"),
        }
    }

    fn classify_face(
        &mut self,
        idx: usize,
        face: &LandmarkSet,
        face_count: usize,
        report: &mut FrameReport,
    ) -> NoveltyInput {
        if let Err(e) = face.validate() {
            warn!("Face {idx}: {e}");
            let (state, _) = self.gaze.skip(self.gaze_state);
            self.gaze_state = state;
            return NoveltyInput {
                face_count,
                ..NoveltyInput::default()
            };
        }

        let gaze = face.gaze();
        let (state, outcome) = match &gaze {
            Ok(features) => self.gaze.update(self.gaze_state, features),
            Err(e) => {
                debug!("Face {idx}: skipping directional signals: {e}");
                self.gaze.skip(self.gaze_state)
            }
        };
        self.gaze_state = state;
        report.events.extend(outcome.events());
        if gaze.is_ok() && self.gaze_state.contact {
            report.contacts.push(*face);
        }

        match face.head_size() {
            Ok(size) => {
                let (state, event) = self.size.update(self.size_state, size);
                self.size_state = state;
                report.events.extend(event);
            }
            Err(e) => debug!("Face {idx}: no head size: {e}"),
        }

        if gaze.is_ok() {
            match face.mouth_crossed() {
                Ok(crossed) => {
                    let (state, event) = self.smile.update(self.gaze_state, crossed);
                    self.gaze_state = state;
                    report.events.extend(event);
                }
                Err(e) => debug!("Face {idx}: skipping mouth signal: {e}"),
            }
        }

        NoveltyInput {
            look: outcome.look,
            contact: self.gaze_state.contact,
            face_count,
        }
    }

    fn step_novelty(&mut self, input: &NoveltyInput, report: &mut FrameReport) {
        let (state, outcome) = self.novelty.update(self.novelty_state, input);
        self.novelty_state = state;
        report.novelty_distance = outcome.distance;
        report.events.extend(outcome.event);
    }
}
