//! Single-property tweens
//!
//! A [`Tween`] drives one scalar from `from` to `to` over a fixed duration.
//! Time is supplied from outside: `update(now)` takes a monotonic timestamp
//! in milliseconds, and the start time is captured lazily on the first update
//! after [`Tween::play`].

use std::fmt;

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::target::Settable;

pub(crate) type UpdateCallback = Box<dyn FnMut(f32, f32)>;
pub(crate) type CompleteCallback = Box<dyn FnMut()>;

/// Duration applied when a config leaves it unset
pub const DEFAULT_DURATION_MS: f64 = 1000.0;

pub(crate) fn validate_duration(duration_ms: f64) -> Result<f64> {
    if duration_ms.is_finite() && duration_ms > 0.0 {
        Ok(duration_ms)
    } else {
        Err(AnimationError::InvalidDuration(duration_ms))
    }
}

/// Animates one property of one target
pub struct Tween {
    target: Option<Box<dyn Settable>>,
    from: f32,
    to: f32,
    duration_ms: f64,
    easing: Easing,
    on_update: Option<UpdateCallback>,
    on_complete: Option<CompleteCallback>,

    start_time: Option<f64>,
    pause_time: Option<f64>,
    last_time: Option<f64>,
    resume_pending: bool,
    playing: bool,
    paused: bool,
    complete: bool,
    progress: f32,
    value: f32,
    target_warned: bool,
}

impl Tween {
    /// Create an idle tween writing into `target`.
    ///
    /// Fails if `duration_ms` is not a finite positive number.
    pub fn new(
        target: impl Settable + 'static,
        from: f32,
        to: f32,
        duration_ms: f64,
    ) -> Result<Self> {
        let mut tween = Self::detached(from, to, duration_ms)?;
        tween.target = Some(Box::new(target));
        Ok(tween)
    }

    /// Create a tween without a target; only its callbacks observe it
    pub fn detached(from: f32, to: f32, duration_ms: f64) -> Result<Self> {
        Ok(Self {
            target: None,
            from,
            to,
            duration_ms: validate_duration(duration_ms)?,
            easing: Easing::Linear,
            on_update: None,
            on_complete: None,
            start_time: None,
            pause_time: None,
            last_time: None,
            resume_pending: false,
            playing: false,
            paused: false,
            complete: false,
            progress: 0.0,
            value: from,
            target_warned: false,
        })
    }

    pub(crate) fn with_target(mut self, target: Option<Box<dyn Settable>>) -> Self {
        self.target = target;
        self
    }

    /// Builder: set the easing curve
    pub fn easing(mut self, easing: impl Into<Easing>) -> Self {
        self.easing = easing.into();
        self
    }

    /// Builder: called with `(value, progress)` on every active update
    pub fn on_update(mut self, callback: impl FnMut(f32, f32) + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Builder: called once each time the tween runs to completion
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub(crate) fn callbacks(
        mut self,
        on_update: Option<UpdateCallback>,
        on_complete: Option<CompleteCallback>,
    ) -> Self {
        self.on_update = on_update;
        self.on_complete = on_complete;
        self
    }

    /// Replace the easing curve of an existing tween
    pub fn set_easing(&mut self, easing: impl Into<Easing>) {
        self.easing = easing.into();
    }

    /// Start, restart, or resume the tween.
    ///
    /// After a pause, the next update shifts the start time forward by the
    /// paused interval. Otherwise progress resets and the next update
    /// captures a fresh start time.
    pub fn play(&mut self) {
        if self.paused {
            self.paused = false;
            self.resume_pending = true;
        } else {
            self.start_time = None;
            self.pause_time = None;
            self.resume_pending = false;
            self.progress = 0.0;
            self.complete = false;
        }
        self.playing = true;
    }

    /// Resume only if paused
    pub fn resume(&mut self) {
        if self.paused {
            self.play();
        }
    }

    /// Freeze at the last observed frame time
    pub fn pause(&mut self) {
        if self.playing && !self.paused {
            self.paused = true;
            self.pause_time = self.last_time;
        }
    }

    /// Reset to idle. No completion callback fires.
    pub fn stop(&mut self) {
        self.playing = false;
        self.paused = false;
        self.resume_pending = false;
        self.progress = 0.0;
    }

    /// Pin the start time, used by timelines to place a child at its offset
    pub(crate) fn rebase(&mut self, start_time: f64) {
        self.start_time = Some(start_time);
        self.resume_pending = false;
        self.pause_time = None;
    }

    /// Advance to `now` (milliseconds).
    ///
    /// Returns `true` only on the call that completes the tween.
    pub fn update(&mut self, now: f64) -> bool {
        if !self.playing || self.paused {
            return false;
        }

        if self.resume_pending {
            self.resume_pending = false;
            if let (Some(start), Some(paused_at)) = (self.start_time, self.pause_time.take()) {
                self.start_time = Some(start + (now - paused_at));
            }
        }

        let start = *self.start_time.get_or_insert(now);
        self.last_time = Some(now);

        let elapsed = now - start;
        self.progress = (elapsed / self.duration_ms).clamp(0.0, 1.0) as f32;
        let finished = self.progress >= 1.0;

        let value = if finished {
            self.to
        } else {
            self.from + (self.to - self.from) * self.easing.apply(self.progress)
        };

        if value.is_finite() {
            self.value = value;
            self.write(value);
        } else {
            tracing::trace!(easing = %self.easing, "non-finite tween value skipped");
        }

        if let Some(on_update) = self.on_update.as_mut() {
            on_update(self.value, self.progress);
        }

        if finished {
            self.playing = false;
            self.complete = true;
            if let Some(on_complete) = self.on_complete.as_mut() {
                on_complete();
            }
            return true;
        }

        false
    }

    fn write(&mut self, value: f32) {
        let Some(target) = self.target.as_mut() else {
            return;
        };
        if let Err(err) = target.set(value) {
            if !self.target_warned {
                self.target_warned = true;
                tracing::warn!(%err, "tween target unavailable, skipping writes");
            } else {
                tracing::trace!(%err, "tween write skipped");
            }
        }
    }

    /// Linear progress (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Last value written
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn from_value(&self) -> f32 {
        self.from
    }

    pub fn to_value(&self) -> f32 {
        self.to
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn easing_curve(&self) -> Easing {
        self.easing
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the last run finished naturally
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration_ms", &self.duration_ms)
            .field("easing", &self.easing)
            .field("progress", &self.progress)
            .field("playing", &self.playing)
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}
