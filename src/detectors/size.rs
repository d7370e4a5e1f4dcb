use crate::events::Event;

/// Last published head size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeState {
    pub previous_size: i32,
}

/// Dead-band change detector for head size
#[derive(Debug, Clone)]
pub struct SizeDetector {
    dead_band: i32,
}

impl SizeDetector {
    /// Create a detector publishing changes strictly larger than `dead_band`
    ///
    /// # Panics
    ///
    /// Panics if `dead_band` is negative
    #[must_use]
    pub fn new(dead_band: i32) -> Self {
        assert!(dead_band >= 0, "Dead band must be non-negative, got {dead_band}");
        Self { dead_band }
    }

    /// Compare `size` against the last published size
    ///
    /// The reference only moves when an event is published, so slow drift
    /// accumulates until it crosses the dead band.
    #[must_use]
    pub fn update(&self, state: SizeState, size: i32) -> (SizeState, Option<Event>) {
        if state.previous_size.abs_diff(size) > self.dead_band.unsigned_abs() {
            (SizeState { previous_size: size }, Some(Event::Size { value: size }))
        } else {
            (state, None)
        }
    }
}
