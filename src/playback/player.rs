//! Frame stepping for hosts that drive a [`crate::RenderSession`] from a redraw loop.
//!
//! A [`Player`] owns no rendering state. Each [`Player::tick`] yields the frame to render next
//! plus any lifecycle events, and the host schedules the following tick after
//! [`Player::frame_interval`].

use std::time::Duration;

use smallvec::SmallVec;

use crate::foundation::core::AnimationInfo;
use crate::foundation::error::{LottieError, LottieResult};

/// What happens when playback reaches the end of the frame range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Jump back to the first frame.
    #[default]
    Restart,
    /// Reverse direction at each end (ping-pong).
    Reverse,
}

/// How many extra passes to play after the first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RepeatCount {
    Finite(u32),
    Infinite,
}

impl Default for RepeatCount {
    fn default() -> Self {
        Self::Finite(0)
    }
}

/// Lifecycle notifications emitted by [`Player::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// First tick after [`Player::start`].
    Start,
    /// A pass finished and another begins.
    Repeat,
    /// The repeat budget is spent; playback stops on the current frame.
    End,
}

/// Playback configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaybackOpts {
    pub first_frame: u32,
    /// Inclusive; `None` means the animation's last frame. Clamped to the timeline.
    pub last_frame: Option<u32>,
    /// Playback rate multiplier, must be finite and > 0.
    pub speed: f32,
    pub repeat_mode: RepeatMode,
    pub repeat_count: RepeatCount,
    /// Start running on construction.
    pub autoplay: bool,
}

impl Default for PlaybackOpts {
    fn default() -> Self {
        Self {
            first_frame: 0,
            last_frame: None,
            speed: 1.0,
            repeat_mode: RepeatMode::Restart,
            repeat_count: RepeatCount::Finite(0),
            autoplay: true,
        }
    }
}

impl PlaybackOpts {
    pub fn with_frame_range(mut self, first: u32, last: Option<u32>) -> Self {
        self.first_frame = first;
        self.last_frame = last;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_repeat(mut self, mode: RepeatMode, count: RepeatCount) -> Self {
        self.repeat_mode = mode;
        self.repeat_count = count;
        self
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }
}

/// One step of playback.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    /// Frame to render for this tick.
    pub frame: u32,
    pub events: SmallVec<[PlaybackEvent; 2]>,
}

/// Frame-range playback state machine.
#[derive(Clone, Debug)]
pub struct Player {
    first: u32,
    last: u32,
    frame_count: u32,
    duration_ms: u32,
    speed: f32,
    mode: RepeatMode,
    count: RepeatCount,

    frame: u32,
    forward: bool,
    repeated: u32,
    running: bool,
    started: bool,
    ended: bool,
}

impl Player {
    pub fn new(info: AnimationInfo, opts: PlaybackOpts) -> LottieResult<Self> {
        if info.frame_count == 0 {
            return Err(LottieError::validation(
                "playback requires at least one frame",
            ));
        }
        validate_speed(opts.speed)?;

        let max = info.frame_count - 1;
        let last = opts.last_frame.unwrap_or(max).min(max);
        let first = opts.first_frame.min(last);

        let mut player = Self {
            first,
            last,
            frame_count: info.frame_count,
            duration_ms: info.duration_ms,
            speed: opts.speed,
            mode: opts.repeat_mode,
            count: opts.repeat_count,
            frame: first,
            forward: true,
            repeated: 0,
            running: false,
            started: false,
            ended: false,
        };
        if opts.autoplay {
            player.start();
        }
        Ok(player)
    }

    /// Rewind to the first frame and run.
    pub fn start(&mut self) {
        self.running = true;
        self.started = false;
        self.ended = false;
        self.repeated = 0;
        self.frame = self.first;
        self.forward = true;
    }

    /// Halt without rewinding. [`Player::start`] rewinds.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Continue from the current frame. Has no effect once playback has ended.
    pub fn resume(&mut self) {
        if !self.ended {
            self.running = true;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Next frame to be produced.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn frame_range(&self) -> (u32, u32) {
        (self.first, self.last)
    }

    /// Completed passes since the last start.
    pub fn repeated(&self) -> u32 {
        self.repeated
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) -> LottieResult<()> {
        validate_speed(speed)?;
        self.speed = speed;
        Ok(())
    }

    /// Replace the repeat budget and reset the pass counter.
    pub fn set_repeat_count(&mut self, count: RepeatCount) {
        self.count = count;
        self.repeated = 0;
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.mode = mode;
        if mode == RepeatMode::Restart {
            self.forward = true;
        }
    }

    /// Wall-clock time between ticks at the current speed. Saturates at [`Duration::MAX`].
    pub fn frame_interval(&self) -> Duration {
        let per_frame_ms = f64::from(self.duration_ms) / f64::from(self.frame_count);
        let secs = (per_frame_ms / f64::from(self.speed)).max(0.0) / 1000.0;
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Produce the next frame, or `None` when not running.
    pub fn tick(&mut self) -> Option<Tick> {
        if !self.running {
            return None;
        }
        let mut events = SmallVec::new();
        if !self.started {
            self.started = true;
            events.push(PlaybackEvent::Start);
        }

        let frame = self.frame;
        let (next, wrapped) = self.step();
        if wrapped {
            let exhausted = match self.count {
                RepeatCount::Finite(n) => self.repeated >= n,
                RepeatCount::Infinite => false,
            };
            if exhausted {
                self.ended = true;
                self.running = false;
                events.push(PlaybackEvent::End);
                tracing::debug!(frame, repeated = self.repeated, "playback ended");
                return Some(Tick { frame, events });
            }
            self.repeated = self.repeated.saturating_add(1);
            events.push(PlaybackEvent::Repeat);
        }
        if let RepeatMode::Reverse = self.mode
            && wrapped
        {
            self.forward = !self.forward;
        }
        self.frame = next;
        Some(Tick { frame, events })
    }

    /// Frame after the current one and whether producing it completes a pass.
    fn step(&self) -> (u32, bool) {
        let span = self.last - self.first;
        match self.mode {
            RepeatMode::Restart => {
                if self.frame >= self.last {
                    (self.first, true)
                } else {
                    (self.frame + 1, false)
                }
            }
            RepeatMode::Reverse if span == 0 => (self.first, true),
            RepeatMode::Reverse => {
                if self.forward {
                    if self.frame >= self.last {
                        (self.last - 1, true)
                    } else {
                        (self.frame + 1, false)
                    }
                } else if self.frame <= self.first {
                    (self.first + 1, true)
                } else {
                    (self.frame - 1, false)
                }
            }
        }
    }
}

fn validate_speed(speed: f32) -> LottieResult<()> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(LottieError::validation(format!(
            "playback speed must be finite and > 0, got {speed}"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/player.rs"]
mod tests;
