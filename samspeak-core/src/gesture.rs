//! Touch gestures on the controller: tap, swipe between pages, long press

use crate::layout::Layout;
use std::time::Duration;

/// Horizontal travel (px) at or above which a touch is never a tap.
pub const SWIPE_THRESHOLD_PX: f32 = 55.0;

/// Touches shorter than this with little travel are taps.
pub const MAX_TAP_DURATION: Duration = Duration::from_millis(150);

/// Holding a pad this long opens the editor for it.
pub const LONG_PRESS: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Tap,
    /// Finger moved left: go to the next page.
    SwipeNext,
    /// Finger moved right (or stayed still for too long): go back.
    SwipePrevious,
}

impl Gesture {
    pub fn classify(start_x: f32, end_x: f32, duration: Duration) -> Self {
        let diff = start_x - end_x;
        if duration < MAX_TAP_DURATION && diff.abs() < SWIPE_THRESHOLD_PX {
            Gesture::Tap
        } else if diff > 0.0 {
            Gesture::SwipeNext
        } else {
            Gesture::SwipePrevious
        }
    }
}

/// Positions recorded between touch start and touch end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchTrack {
    start_x: f32,
    end_x: f32,
}

impl TouchTrack {
    pub fn start(x: f32) -> Self {
        Self { start_x: x, end_x: x }
    }

    pub fn move_to(&mut self, x: f32) {
        self.end_x = x;
    }

    pub fn finish(self, duration: Duration) -> Gesture {
        Gesture::classify(self.start_x, self.end_x, duration)
    }
}

/// Current page of the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pager {
    current: usize,
}

impl Pager {
    pub fn current(&self) -> usize {
        self.current
    }

    /// Apply a swipe. Taps leave the page alone.
    pub fn apply(&mut self, gesture: Gesture, layout: &Layout) -> usize {
        match gesture {
            Gesture::Tap => {}
            Gesture::SwipeNext => {
                self.current = (self.current + 1).min(layout.total_pages.saturating_sub(1));
            }
            Gesture::SwipePrevious => {
                self.current = self.current.saturating_sub(1);
            }
        }
        self.current
    }

    /// Jump to a page dot.
    pub fn goto(&mut self, page: usize, layout: &Layout) -> usize {
        self.current = layout.clamp_page(page);
        self.current
    }
}
