use std::time::{Duration, Instant};

use crate::config::GestureConfig;

/// Discrete swipe command emitted by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug)]
enum GestureState {
    /// No active touch
    Idle,
    /// A touch is down; start point is fixed, last point follows moves
    Tracking {
        start: (f32, f32),
        started_at: Instant,
        last: (f32, f32),
    },
}

/// Turns raw pointer motion into swipe commands.
///
/// Exactly one command (or none) per complete touch gesture. Coordinates
/// are in backend units (terminal cells, pixels); y grows downward, so a
/// positive dy is a downward swipe. Timestamps are passed in explicitly,
/// which keeps classification deterministic under test.
#[derive(Debug)]
pub struct GestureClassifier {
    config: GestureConfig,
    state: GestureState,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::Idle,
        }
    }

    /// Begin tracking a touch. A second touch while one is active is
    /// ignored until the current gesture resolves.
    pub fn touch_start(&mut self, x: f32, y: f32, at: Instant) {
        if matches!(self.state, GestureState::Tracking { .. }) {
            return;
        }
        self.state = GestureState::Tracking {
            start: (x, y),
            started_at: at,
            last: (x, y),
        };
    }

    /// Update the latest touch position while tracking
    pub fn touch_move(&mut self, x: f32, y: f32) {
        if let GestureState::Tracking { ref mut last, .. } = self.state {
            *last = (x, y);
        }
    }

    /// Finish the gesture and classify it.
    ///
    /// Gestures that are too short or too slow are discarded. Ties on the
    /// dominant axis go to horizontal.
    pub fn touch_end(&mut self, at: Instant) -> Option<SwipeDirection> {
        let GestureState::Tracking {
            start,
            started_at,
            last,
        } = std::mem::replace(&mut self.state, GestureState::Idle)
        else {
            return None;
        };

        let dx = last.0 - start.0;
        let dy = last.1 - start.1;
        let elapsed = at.saturating_duration_since(started_at);

        if dx.abs().max(dy.abs()) < self.config.min_distance {
            tracing::trace!("Gesture below distance threshold, discarded");
            return None;
        }
        if elapsed > Duration::from_millis(self.config.max_duration_ms) {
            tracing::trace!("Gesture exceeded duration threshold, discarded");
            return None;
        }

        let direction = if dx.abs() >= dy.abs() {
            if dx > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            }
        } else if dy > 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        };

        Some(direction)
    }
}
