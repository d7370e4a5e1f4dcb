//! Constants used throughout the application

/// Number of facial landmarks for full face
pub const NUM_FACIAL_LANDMARKS: usize = 68;

/// iBUG-68 indices of the nine landmarks the classifiers read
pub const NOSE_INDEX: usize = 30;
pub const RIGHT_SIDE_INDEX: usize = 2;
pub const LEFT_SIDE_INDEX: usize = 14;
pub const EYEBROW_RIGHT_INDEX: usize = 21;
pub const EYEBROW_LEFT_INDEX: usize = 22;
pub const MOUTH_UP_INDEX: usize = 51;
pub const MOUTH_DOWN_INDEX: usize = 57;
pub const MOUTH_RIGHT_INDEX: usize = 48;
pub const MOUTH_LEFT_INDEX: usize = 54;

/// Divisor applied to `vertical * horizontal` to get the integer head size
pub const HEAD_SIZE_SCALE: f64 = 1000.0;

/// Gaze angle (rescaled degrees) beyond which a direction is considered held
pub const DEFAULT_GAZE_THRESHOLD: f64 = 0.3;

/// Consecutive frames a condition must hold; the event fires when the counter exceeds this
pub const DEFAULT_DEBOUNCE_FRAMES: u32 = 5;

/// Head size change required before a size event is published
pub const DEFAULT_SIZE_DEAD_BAND: i32 = 5;

/// Novelty detector defaults
pub const NOVELTY_CHANNELS: usize = 6;
pub const DEFAULT_NOVELTY_MU: f64 = 0.1;
pub const DEFAULT_NOVELTY_EPSILON: f64 = 1e-8;
pub const DEFAULT_NOVELTY_THRESHOLD: f64 = 1.0;
pub const DEFAULT_INITIAL_EMA: [f64; NOVELTY_CHANNELS] = [1.0; NOVELTY_CHANNELS];

/// Motion aggregator defaults, calibrated for 100 tracked corners at 640x360
pub const DEFAULT_MOTION_THRESHOLD: f64 = 778_000.0;
pub const DEFAULT_MOTION_BIAS: f64 = 830_000.0;

/// External activity state during which motion tracking is suspended
pub const WAITING_STATE: &str = "WAITING_FOR_FEEDBACK";

/// Topic names events are published under
pub const TOPIC_LOOK_AT: &str = "lookAt";
pub const TOPIC_SMILE: &str = "smile";
pub const TOPIC_SIZE_HEAD: &str = "sizeHead";
pub const TOPIC_NOVELTY: &str = "novelty";
pub const TOPIC_MOVEMENT: &str = "movement";
