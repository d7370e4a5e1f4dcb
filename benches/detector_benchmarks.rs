//! Benchmarks for feature extraction and the individual detectors

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use engagement_vision::{
    detectors::{
        Displacement, GazeClassifier, GazeState, MotionAggregator, NoveltyDetector, NoveltyInput, NoveltyState,
    },
    geometry::Point2,
    landmarks::LandmarkSet,
};
use rand::Rng;

fn jittered_face(rng: &mut impl Rng) -> LandmarkSet {
    let mut jitter = |x: f64, y: f64| Point2::new(x + rng.gen_range(-2.0..2.0), y + rng.gen_range(-2.0..2.0));
    LandmarkSet {
        nose: jitter(50.0, 5.0),
        right_side: jitter(0.0, 0.0),
        left_side: jitter(100.0, 0.0),
        eyebrow_right: jitter(45.0, -40.0),
        eyebrow_left: jitter(55.0, -40.0),
        mouth_up: jitter(50.0, 25.0),
        mouth_down: jitter(50.0, 35.0),
        mouth_right: jitter(40.0, 30.0),
        mouth_left: jitter(60.0, 30.0),
    }
}

fn bench_feature_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("features");
    let mut rng = rand::thread_rng();
    let faces: Vec<LandmarkSet> = (0..100).map(|_| jittered_face(&mut rng)).collect();

    group.bench_function("gaze", |b| {
        b.iter(|| {
            for face in &faces {
                let _ = black_box(face.gaze());
            }
        });
    });
    group.bench_function("head_size", |b| {
        b.iter(|| {
            for face in &faces {
                let _ = black_box(face.head_size());
            }
        });
    });
    group.bench_function("mouth_crossed", |b| {
        b.iter(|| {
            for face in &faces {
                let _ = black_box(face.mouth_crossed());
            }
        });
    });

    group.finish();
}

fn bench_detectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("detectors");
    let mut rng = rand::thread_rng();

    let gazes: Vec<_> = (0..100).filter_map(|_| jittered_face(&mut rng).gaze().ok()).collect();
    let classifier = GazeClassifier::new(0.3, 5);
    group.bench_function("gaze_sequence_100", |b| {
        b.iter(|| {
            let mut state = GazeState::default();
            for gaze in &gazes {
                state = classifier.update(state, black_box(gaze)).0;
            }
            black_box(state)
        });
    });

    let novelty = NoveltyDetector::new(0.1, 1e-8, 1.0);
    for faces in [0_usize, 1, 5] {
        let input = NoveltyInput {
            face_count: faces,
            contact: faces > 0,
            ..NoveltyInput::default()
        };
        group.bench_with_input(BenchmarkId::new("novelty_update", faces), &input, |b, input| {
            let state = NoveltyState::default();
            b.iter(|| black_box(novelty.update(black_box(state), input)));
        });
    }

    let motion = MotionAggregator::new(778_000.0, 830_000.0);
    let pairs: Vec<(Point2, Point2)> = (0..100)
        .map(|_| {
            let p = Point2::new(rng.gen_range(0.0..640.0), rng.gen_range(0.0..480.0));
            (p, p + Point2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0)))
        })
        .collect();
    group.bench_function("motion_evaluate_100_points", |b| {
        b.iter(|| {
            let displacement = Displacement::from_pairs(black_box(&pairs).iter().copied());
            black_box(motion.evaluate(displacement))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_feature_extraction, bench_detectors);
criterion_main!(benches);
