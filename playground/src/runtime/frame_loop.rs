use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Identifies one scheduled render loop. Tokens are never reused, so a
/// callback holding a cancelled token can always tell it is stale.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FrameToken {
    id: u64,
}

impl FrameToken {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    live: Vec<FrameToken>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken { id: self.next_id };
        self.live.push(token);
        token
    }

    /// Returns false when the token was already cancelled
    pub fn cancel(&mut self, token: FrameToken) -> bool {
        let before = self.live.len();
        self.live.retain(|t| *t != token);
        before != self.live.len()
    }

    pub fn is_live(&self, token: FrameToken) -> bool {
        self.live.contains(&token)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// Per-experience frame bookkeeping: frame count, elapsed time and a rolling
/// window of frame intervals for FPS reporting.
#[derive(Debug)]
pub struct RenderLoop {
    token: FrameToken,
    frame_count: u64,
    started_at: Instant,
    last_tick: Option<Instant>,
    frame_intervals: VecDeque<Duration>,
    max_intervals: usize,
}

impl RenderLoop {
    pub fn new(token: FrameToken, now: Instant) -> Self {
        Self {
            token,
            frame_count: 0,
            started_at: now,
            last_tick: None,
            frame_intervals: VecDeque::new(),
            max_intervals: 90,
        }
    }

    pub fn token(&self) -> FrameToken {
        self.token
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    pub fn tick(&mut self, now: Instant) {
        self.frame_count += 1;
        if let Some(last_tick) = self.last_tick {
            self.frame_intervals
                .push_back(now.saturating_duration_since(last_tick));
            if self.frame_intervals.len() > self.max_intervals {
                self.frame_intervals.pop_front();
            }
        }
        self.last_tick = Some(now);
    }

    pub fn average_fps(&self) -> f32 {
        if self.frame_intervals.is_empty() {
            return 0.0;
        }

        let sum: Duration = self.frame_intervals.iter().copied().sum();
        let avg = sum / self.frame_intervals.len() as u32;

        if avg.is_zero() {
            return 0.0;
        }

        1.0 / avg.as_secs_f32()
    }
}
