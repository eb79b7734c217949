//! Timeline orchestration for multiple tweens
//!
//! Entries carry a start offset relative to the timeline start. The
//! timeline's duration is always the latest end offset among its entries.

use std::fmt;

use smallvec::SmallVec;

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::target::Settable;
use crate::tween::{
    validate_duration, CompleteCallback, Tween, UpdateCallback, DEFAULT_DURATION_MS,
};

type ProgressCallback = Box<dyn FnMut(f32, f64)>;

fn validate_delay(delay_ms: f64) -> Result<f64> {
    if delay_ms.is_finite() && delay_ms >= 0.0 {
        Ok(delay_ms)
    } else {
        Err(AnimationError::InvalidDelay(delay_ms))
    }
}

/// Description of one tween to place on a timeline
pub struct TweenConfig {
    target: Option<Box<dyn Settable>>,
    from: f32,
    to: f32,
    duration_ms: f64,
    easing: Easing,
    delay_ms: f64,
    on_update: Option<UpdateCallback>,
    on_complete: Option<CompleteCallback>,
}

impl TweenConfig {
    /// Animate `target` from `from` to `to`, 1000ms, linear, no delay
    pub fn new(target: impl Settable + 'static, from: f32, to: f32) -> Self {
        let mut config = Self::detached(from, to);
        config.target = Some(Box::new(target));
        config
    }

    /// A config without a target; only its callbacks observe it
    pub fn detached(from: f32, to: f32) -> Self {
        Self {
            target: None,
            from,
            to,
            duration_ms: DEFAULT_DURATION_MS,
            easing: Easing::Linear,
            delay_ms: 0.0,
            on_update: None,
            on_complete: None,
        }
    }

    pub fn duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn easing(mut self, easing: impl Into<Easing>) -> Self {
        self.easing = easing.into();
        self
    }

    /// Start offset from the beginning of the timeline
    pub fn delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn on_update(mut self, callback: impl FnMut(f32, f32) + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }
}

impl fmt::Debug for TweenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenConfig")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration_ms", &self.duration_ms)
            .field("easing", &self.easing)
            .field("delay_ms", &self.delay_ms)
            .finish_non_exhaustive()
    }
}

enum EntryKind {
    Tween(Box<Tween>),
    /// Placeholder that only occupies time
    Delay,
}

/// An entry in a timeline
struct TimelineEntry {
    /// Offset in milliseconds from timeline start
    start_ms: f64,
    end_ms: f64,
    kind: EntryKind,
}

/// Read-only view of a timeline entry's placement
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntrySpan {
    pub start_ms: f64,
    pub end_ms: f64,
    pub is_delay: bool,
    pub complete: bool,
}

/// A timeline that orchestrates multiple tweens
pub struct Timeline {
    entries: SmallVec<[TimelineEntry; 4]>,
    duration_ms: f64,
    start_time: Option<f64>,
    pause_time: Option<f64>,
    last_time: Option<f64>,
    resume_pending: bool,
    playing: bool,
    paused: bool,
    complete: bool,
    progress: f32,
    on_update: Option<ProgressCallback>,
    on_complete: Option<CompleteCallback>,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
            duration_ms: 0.0,
            start_time: None,
            pause_time: None,
            last_time: None,
            resume_pending: false,
            playing: false,
            paused: false,
            complete: false,
            progress: 0.0,
            on_update: None,
            on_complete: None,
        }
    }

    /// Append a tween starting at the config's delay offset
    pub fn to(mut self, config: TweenConfig) -> Result<Self> {
        self.add(config)?;
        Ok(self)
    }

    /// Start every config together at the latest requested delay
    pub fn parallel(mut self, configs: Vec<TweenConfig>) -> Result<Self> {
        self.add_parallel(configs)?;
        Ok(self)
    }

    /// Append a tween that starts when everything added so far has ended
    pub fn then(mut self, config: TweenConfig) -> Result<Self> {
        self.add_after(config)?;
        Ok(self)
    }

    /// Append an idle gap after the current end of the timeline
    pub fn delay(mut self, delay_ms: f64) -> Result<Self> {
        self.add_delay(delay_ms)?;
        Ok(self)
    }

    /// Builder: called once each time the timeline runs to completion
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Builder: called with `(progress, elapsed_ms)` on every active update
    pub fn on_update(mut self, callback: impl FnMut(f32, f64) + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Add a tween to the timeline at its configured offset
    pub fn add(&mut self, config: TweenConfig) -> Result<()> {
        let delay = validate_delay(config.delay_ms)?;
        let duration = validate_duration(config.duration_ms)?;
        let tween = Tween::detached(config.from, config.to, duration)?
            .with_target(config.target)
            .easing(config.easing)
            .callbacks(config.on_update, config.on_complete);

        self.push(delay, delay + duration, EntryKind::Tween(Box::new(tween)));
        Ok(())
    }

    pub fn add_parallel(&mut self, configs: Vec<TweenConfig>) -> Result<()> {
        for config in &configs {
            validate_delay(config.delay_ms)?;
            validate_duration(config.duration_ms)?;
        }

        let start = configs
            .iter()
            .map(|config| config.delay_ms)
            .fold(0.0, f64::max);

        for mut config in configs {
            config.delay_ms = start;
            self.add(config)?;
        }
        Ok(())
    }

    pub fn add_after(&mut self, mut config: TweenConfig) -> Result<()> {
        config.delay_ms = self.duration_ms + validate_delay(config.delay_ms)?;
        self.add(config)
    }

    pub fn add_delay(&mut self, delay_ms: f64) -> Result<()> {
        let delay = validate_delay(delay_ms)?;
        let start = self.duration_ms;
        self.push(start, start + delay, EntryKind::Delay);
        Ok(())
    }

    fn push(&mut self, start_ms: f64, end_ms: f64, mut kind: EntryKind) {
        // Late additions join the current run
        if self.playing {
            if let EntryKind::Tween(tween) = &mut kind {
                tween.play();
            }
        }
        self.entries.push(TimelineEntry {
            start_ms,
            end_ms,
            kind,
        });
        self.duration_ms = self.duration_ms.max(end_ms);
    }

    /// Start, restart, or resume the timeline
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
            for entry in self.entries.iter_mut() {
                if let EntryKind::Tween(tween) = &mut entry.kind {
                    tween.play();
                }
            }
        }
        self.playing = true;
    }

    /// Resume only if paused
    pub fn resume(&mut self) {
        if self.paused {
            self.play();
        }
    }

    pub fn pause(&mut self) {
        if self.playing && !self.paused {
            self.paused = true;
            self.pause_time = self.last_time;
        }
    }

    /// Reset the timeline and every child tween. No completion callback fires.
    pub fn stop(&mut self) {
        self.playing = false;
        self.paused = false;
        self.resume_pending = false;
        self.start_time = None;
        self.progress = 0.0;
        for entry in self.entries.iter_mut() {
            if let EntryKind::Tween(tween) = &mut entry.kind {
                tween.stop();
            }
        }
    }

    /// Advance to `now` (milliseconds).
    ///
    /// Returns `true` only on the call that completes the timeline.
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
        self.progress = if self.duration_ms > 0.0 {
            (elapsed / self.duration_ms).clamp(0.0, 1.0) as f32
        } else {
            1.0
        };

        for entry in self.entries.iter_mut() {
            let EntryKind::Tween(tween) = &mut entry.kind else {
                continue;
            };
            // Only entries inside their window are forwarded
            let entry_elapsed = elapsed - entry.start_ms;
            if entry_elapsed < 0.0 || entry_elapsed >= entry.end_ms - entry.start_ms {
                continue;
            }

            tween.rebase(start + entry.start_ms);
            tween.update(start + entry.start_ms + entry_elapsed);
        }

        if let Some(on_update) = self.on_update.as_mut() {
            on_update(self.progress, elapsed);
        }

        if self.progress >= 1.0 {
            self.playing = false;
            self.complete = true;
            if let Some(on_complete) = self.on_complete.as_mut() {
                on_complete();
            }
            return true;
        }

        false
    }

    /// Total duration in milliseconds (latest entry end offset)
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Placement and completion state of every entry, in insertion order
    pub fn entries(&self) -> impl Iterator<Item = EntrySpan> + '_ {
        self.entries.iter().map(|entry| {
            let (is_delay, complete) = match &entry.kind {
                EntryKind::Tween(tween) => (false, tween.is_complete()),
                EntryKind::Delay => (true, self.complete),
            };
            EntrySpan {
                start_ms: entry.start_ms,
                end_ms: entry.end_ms,
                is_delay,
                complete,
            }
        })
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("entries", &self.entries.len())
            .field("duration_ms", &self.duration_ms)
            .field("progress", &self.progress)
            .field("playing", &self.playing)
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}
