use crate::{
    events::{Direction, Event},
    landmarks::GazeFeatures,
};

/// Per-frame directional booleans of one face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LookDirections {
    pub right: bool,
    pub left: bool,
    pub up: bool,
    pub down: bool,
}

impl LookDirections {
    /// Threshold the gaze angles
    #[must_use]
    pub fn from_features(gaze: &GazeFeatures, threshold: f64) -> Self {
        Self {
            right: gaze.east_west < -threshold,
            left: gaze.east_west > threshold,
            up: gaze.south_north > threshold,
            down: gaze.south_north < -threshold,
        }
    }

    /// Whether `direction` holds this frame
    #[must_use]
    pub const fn get(&self, direction: Direction) -> bool {
        match direction {
            Direction::Right => self.right,
            Direction::Left => self.left,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    /// True when any direction holds
    #[must_use]
    pub const fn any(&self) -> bool {
        self.right || self.left || self.up || self.down
    }
}

/// Debounce counters shared by every face of the process
///
/// `smile_counter` and `contact` live here because the gaze classifier
/// resets the former and produces the latter for the smile classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GazeState {
    pub right: u32,
    pub left: u32,
    pub up: u32,
    pub down: u32,
    pub smile_counter: u32,
    /// True unless a directional event fired for the face classified last
    pub contact: bool,
}

impl Default for GazeState {
    fn default() -> Self {
        Self {
            right: 0,
            left: 0,
            up: 0,
            down: 0,
            smile_counter: 0,
            contact: true,
        }
    }
}

impl GazeState {
    /// Current count for `direction`
    #[must_use]
    pub const fn counter(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Right => self.right,
            Direction::Left => self.left,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    fn counter_mut(&mut self, direction: Direction) -> &mut u32 {
        match direction {
            Direction::Right => &mut self.right,
            Direction::Left => &mut self.left,
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }
}

/// Result of classifying one face
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GazeOutcome {
    /// Directional booleans fed to the novelty detector
    pub look: LookDirections,
    /// Directions whose counter fired this frame, in evaluation order
    pub fired: Vec<Direction>,
}

impl GazeOutcome {
    /// Fired directions as events
    pub fn events(&self) -> impl Iterator<Item = Event> + '_ {
        self.fired.iter().map(|&direction| Event::Gaze { direction })
    }
}

/// Hysteresis classifier turning gaze angles into directional events
#[derive(Debug, Clone)]
pub struct GazeClassifier {
    threshold: f64,
    debounce_frames: u32,
}

impl GazeClassifier {
    /// Create a classifier
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is negative or not finite
    #[must_use]
    pub fn new(threshold: f64, debounce_frames: u32) -> Self {
        assert!(
            threshold.is_finite() && threshold >= 0.0,
            "Gaze threshold must be non-negative, got {threshold}"
        );
        Self {
            threshold,
            debounce_frames,
        }
    }

    /// Advance the shared counters with one face's gaze angles
    ///
    /// Each held direction clears the smile counter and increments its own
    /// counter; a counter exceeding the debounce length fires, resets and
    /// clears `contact`. Counters of directions not held are left untouched.
    #[must_use]
    pub fn update(&self, mut state: GazeState, gaze: &GazeFeatures) -> (GazeState, GazeOutcome) {
        let look = LookDirections::from_features(gaze, self.threshold);
        let mut fired = Vec::new();

        state.contact = true;
        for direction in Direction::ALL {
            if !look.get(direction) {
                continue;
            }
            state.smile_counter = 0;
            let counter = state.counter_mut(direction);
            *counter += 1;
            if *counter > self.debounce_frames {
                *counter = 0;
                state.contact = false;
                fired.push(direction);
            }
        }

        (state, GazeOutcome { look, fired })
    }

    /// Transition for a face whose gaze angles are undefined
    ///
    /// No direction is held and contact cannot be asserted; counters are kept.
    #[must_use]
    pub fn skip(&self, mut state: GazeState) -> (GazeState, GazeOutcome) {
        state.contact = false;
        (state, GazeOutcome::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angles(east_west: f64, south_north: f64) -> GazeFeatures {
        GazeFeatures {
            east_west,
            south_north,
        }
    }

    #[test]
    fn test_look_directions() {
        let look = LookDirections::from_features(&angles(-5.0, 0.0), 0.3);
        assert!(look.right && !look.left && !look.up && !look.down);

        let look = LookDirections::from_features(&angles(0.31, 0.31), 0.3);
        assert!(look.left && look.up);

        // Strict comparison at the threshold
        let look = LookDirections::from_features(&angles(0.3, -0.3), 0.3);
        assert!(!look.any());
    }

    #[test]
    fn test_fires_on_sixth_frame() {
        let classifier = GazeClassifier::new(0.3, 5);
        let mut state = GazeState::default();

        for frame in 1..=6 {
            let (next, outcome) = classifier.update(state, &angles(-20.0, 0.0));
            state = next;
            if frame < 6 {
                assert!(outcome.fired.is_empty());
                assert_eq!(state.right, frame);
                assert!(state.contact);
            } else {
                assert_eq!(outcome.fired, vec![Direction::Right]);
                assert_eq!(state.right, 0);
                assert!(!state.contact);
            }
        }
    }

    #[test]
    fn test_counters_persist_when_not_held() {
        let classifier = GazeClassifier::new(0.3, 5);
        let (state, _) = classifier.update(GazeState::default(), &angles(0.0, 20.0));
        let (state, _) = classifier.update(state, &angles(0.0, 20.0));
        let (state, outcome) = classifier.update(state, &angles(0.0, 0.0));

        assert_eq!(state.up, 2);
        assert!(outcome.fired.is_empty());
        assert!(state.contact);
    }

    #[test]
    fn test_increment_resets_smile_counter() {
        let classifier = GazeClassifier::new(0.3, 5);
        let state = GazeState {
            smile_counter: 4,
            ..GazeState::default()
        };
        let (state, _) = classifier.update(state, &angles(0.0, -20.0));
        assert_eq!(state.smile_counter, 0);
        assert_eq!(state.down, 1);
    }

    #[test]
    fn test_two_directions_fire_together() {
        let classifier = GazeClassifier::new(0.3, 0);
        let (_, outcome) = classifier.update(GazeState::default(), &angles(20.0, 20.0));
        assert_eq!(outcome.fired, vec![Direction::Left, Direction::Up]);
        assert_eq!(outcome.events().count(), 2);
    }

    #[test]
    fn test_skip_keeps_counters() {
        let classifier = GazeClassifier::new(0.3, 5);
        let (state, _) = classifier.update(GazeState::default(), &angles(-20.0, 0.0));
        let (state, outcome) = classifier.skip(state);
        assert_eq!(state.right, 1);
        assert!(!state.contact);
        assert!(!outcome.look.any());
    }

    #[test]
    #[should_panic(expected = "Gaze threshold must be non-negative")]
    fn test_negative_threshold() {
        let _ = GazeClassifier::new(-1.0, 5);
    }
}
