//! Property tests for feature extraction and detector state

use engagement_vision::{
    config::Config,
    detectors::{NoveltyDetector, NoveltyInput, NoveltyState, SizeDetector, SizeState},
    geometry::Point2,
    landmarks::LandmarkSet,
    pipeline::{FrameInput, FramePipeline},
};
use proptest::prelude::*;

fn coordinate() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -2000.0..2000.0_f64,
        1 => Just(0.0),
        1 => Just(100.0),
    ]
}

fn point() -> impl Strategy<Value = Point2> {
    (coordinate(), coordinate()).prop_map(|(x, y)| Point2::new(x, y))
}

prop_compose! {
    fn landmark_set()(points in prop::array::uniform9(point())) -> LandmarkSet {
        LandmarkSet {
            nose: points[0],
            right_side: points[1],
            left_side: points[2],
            eyebrow_right: points[3],
            eyebrow_left: points[4],
            mouth_up: points[5],
            mouth_down: points[6],
            mouth_right: points[7],
            mouth_left: points[8],
        }
    }
}

proptest! {
    #[test]
    fn prop_gaze_is_finite_or_degenerate(face in landmark_set()) {
        match face.gaze() {
            Ok(gaze) => {
                prop_assert!(gaze.east_west.is_finite());
                prop_assert!(gaze.south_north.is_finite());
            }
            Err(e) => prop_assert!(e.is_degenerate()),
        }
    }

    #[test]
    fn prop_extraction_is_repeatable(face in landmark_set()) {
        let first = face.gaze().ok().map(|g| (g.east_west.to_bits(), g.south_north.to_bits()));
        let second = face.gaze().ok().map(|g| (g.east_west.to_bits(), g.south_north.to_bits()));
        prop_assert_eq!(first, second);
        prop_assert_eq!(face.head_size().ok(), face.head_size().ok());
        prop_assert_eq!(face.mouth_crossed().ok(), face.mouth_crossed().ok());
    }

    #[test]
    fn prop_pipeline_state_stays_finite(frames in prop::collection::vec(prop::collection::vec(landmark_set(), 0..4), 1..20)) {
        let mut pipeline = FramePipeline::new(&Config::default());
        for faces in frames {
            let report = pipeline.process(&FrameInput::new(faces), None);
            prop_assert!(report.novelty_distance.is_finite());
        }
        prop_assert!(pipeline.novelty_state().ema.iter().all(|v| v.is_finite()));
        prop_assert!(pipeline.gaze_state().right <= 5);
        prop_assert!(pipeline.gaze_state().smile_counter <= 5);
    }

    #[test]
    fn prop_size_reference_tracks_last_emitted(sizes in prop::collection::vec(-500..500_i32, 1..50)) {
        let detector = SizeDetector::new(5);
        let mut state = SizeState::default();
        let mut last_emitted = 0;
        for size in sizes {
            let (next, event) = detector.update(state, size);
            if event.is_some() {
                prop_assert!((size - last_emitted).abs() > 5);
                last_emitted = size;
            }
            prop_assert_eq!(next.previous_size, last_emitted);
            state = next;
        }
    }

    #[test]
    fn prop_novelty_ema_stays_between_inputs(faces in prop::collection::vec(0..10_usize, 1..100)) {
        let detector = NoveltyDetector::new(0.1, 1e-8, 1.0);
        let mut state = NoveltyState::with_ema([0.0; 6]);
        for face_count in faces {
            let input = NoveltyInput { face_count, ..NoveltyInput::default() };
            let (next, outcome) = detector.update(state, &input);
            prop_assert!(outcome.distance >= 0.0);
            prop_assert!(next.ema[5] >= 0.0 && next.ema[5] <= 9.0);
            state = next;
        }
    }
}
