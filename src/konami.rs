use winit::keyboard::KeyCode;

const SEQUENCE: [KeyCode; 10] = [
    KeyCode::ArrowUp,
    KeyCode::ArrowUp,
    KeyCode::ArrowDown,
    KeyCode::ArrowDown,
    KeyCode::ArrowLeft,
    KeyCode::ArrowRight,
    KeyCode::ArrowLeft,
    KeyCode::ArrowRight,
    KeyCode::KeyB,
    KeyCode::KeyA,
];

/// Tracks progress through the Konami sequence across key presses.
#[derive(Default)]
pub struct KonamiTracker {
    index: usize,
}

impl KonamiTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one key press; returns true when the press completes the
    /// sequence (the tracker then rearms from the start).
    pub fn observe(&mut self, key: KeyCode) -> bool {
        if key == SEQUENCE[self.index] {
            self.index += 1;
            if self.index == SEQUENCE.len() {
                self.index = 0;
                return true;
            }
        } else {
            // A mismatch that is itself the first element starts a new run.
            self.index = usize::from(key == SEQUENCE[0]);
        }

        false
    }
}
