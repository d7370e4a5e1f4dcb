use super::gaze::GazeState;
use crate::events::Event;

/// Hysteresis classifier for smiles
///
/// Counts frames where the mouth corner line no longer crosses the lip line
/// while the face is in contact. Any gaze counter increment clears the count,
/// so smiles and directional gaze never accumulate together.
#[derive(Debug, Clone)]
pub struct SmileClassifier {
    debounce_frames: u32,
}

impl SmileClassifier {
    /// Create a classifier that fires when the count exceeds `debounce_frames`
    #[must_use]
    pub const fn new(debounce_frames: u32) -> Self {
        Self { debounce_frames }
    }

    /// Advance the smile counter with one face's mouth crossing result
    #[must_use]
    pub fn update(&self, mut state: GazeState, mouth_crossed: bool) -> (GazeState, Option<Event>) {
        if mouth_crossed || !state.contact {
            return (state, None);
        }

        state.smile_counter += 1;
        if state.smile_counter > self.debounce_frames {
            state.smile_counter = 0;
            return (state, Some(Event::Smile));
        }
        (state, None)
    }
}
