use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Fixed-rate frame clock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Blank plot, no frame shown yet.
    Initialized,
    /// Frame `n` is on screen.
    Frame(usize),
}

/// Steps through `0..frame_count` once, one frame per `interval`, and stops
/// after the last frame.
#[derive(Debug, Clone)]
pub struct Animator {
    frame_count: usize,
    interval: Duration,
    phase: Phase,
    last_tick: Option<Instant>,
}

impl Animator {
    pub fn new(frame_count: usize, interval: Duration) -> Self {
        Animator {
            frame_count,
            interval,
            phase: Phase::Initialized,
            last_tick: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn next_index(&self) -> usize {
        match self.phase {
            Phase::Initialized => 0,
            Phase::Frame(n) => n + 1,
        }
    }

    /// True once the last frame has been shown (or there are no frames).
    pub fn is_finished(&self) -> bool {
        self.next_index() >= self.frame_count
    }

    /// Advance if a tick is due. The first call fires frame 0 immediately.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        if self.is_finished() {
            return None;
        }
        if let Some(last) = self.last_tick {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        let index = self.next_index();
        self.phase = Phase::Frame(index);
        self.last_tick = Some(now);
        Some(index)
    }

    /// How long until the next tick is due, `None` when finished.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        if self.is_finished() {
            return None;
        }
        Some(match self.last_tick {
            None => Duration::ZERO,
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
        })
    }
}
