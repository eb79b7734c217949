//! Animation manager
//!
//! Owns every live tween, timeline and per-frame callback and advances them
//! from one externally supplied timestamp per frame. Completed tweens and
//! timelines are dropped at the end of the frame they finish in.
//!
//! The manager is a plain value: create as many as needed and pass them to
//! whatever owns the render loop. Callbacks that run during `update` cannot
//! borrow the manager, so they register follow-up work through a
//! [`ManagerHandle`], which queues it for the next frame.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::clock::Clock;
use crate::config::ManagerConfig;
use crate::error::Result;
use crate::stats::FrameStats;
use crate::timeline::Timeline;
use crate::tween::Tween;

new_key_type! {
    pub struct TweenId;
    pub struct TimelineId;
    pub struct AnimationId;
}

/// Raw per-frame callback, invoked with `(now_ms, delta_ms)`
pub type FrameCallback = Box<dyn FnMut(f64, f64)>;

enum Pending {
    AddTween(TweenId, Tween),
    AddTimeline(TimelineId, Timeline),
    AddAnimation(AnimationId, FrameCallback),
    RemoveTween(TweenId),
    RemoveTimeline(TimelineId),
    RemoveAnimation(AnimationId),
}

/// Id allocation and the queue shared with handles
#[derive(Default)]
struct Registry {
    tween_keys: SlotMap<TweenId, ()>,
    timeline_keys: SlotMap<TimelineId, ()>,
    animation_keys: SlotMap<AnimationId, ()>,
    pending: Vec<Pending>,
    stop_requested: bool,
}

/// Drives tweens, timelines and frame callbacks from an external clock
pub struct AnimationManager {
    registry: Rc<RefCell<Registry>>,
    tweens: Vec<(TweenId, Tween)>,
    timelines: Vec<(TimelineId, Timeline)>,
    animations: Vec<(AnimationId, FrameCallback)>,
    running: bool,
    last_time: Option<f64>,
    delta_time: f64,
    frame_count: u64,
    stats: FrameStats,
    config: ManagerConfig,
}

impl AnimationManager {
    pub fn new() -> Self {
        Self::from_valid_config(ManagerConfig::default())
    }

    /// Create a manager with custom tuning.
    ///
    /// Fails if the config does not pass [`ManagerConfig::validate`].
    pub fn with_config(config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ManagerConfig) -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry::default())),
            tweens: Vec::new(),
            timelines: Vec::new(),
            animations: Vec::new(),
            running: false,
            last_time: None,
            delta_time: 0.0,
            frame_count: 0,
            stats: FrameStats::new(config.frame_history),
            config,
        }
    }

    /// A cloneable handle for registering work from inside callbacks
    pub fn handle(&self) -> ManagerHandle {
        ManagerHandle {
            registry: self.registry.clone(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a tween. Starts the manager if it is not running.
    pub fn add_tween(&mut self, tween: Tween) -> TweenId {
        let id = self.registry.borrow_mut().tween_keys.insert(());
        tracing::debug!(?id, "tween added");
        self.tweens.push((id, tween));
        self.ensure_started();
        id
    }

    /// Register a timeline. Starts the manager if it is not running.
    pub fn add_timeline(&mut self, timeline: Timeline) -> TimelineId {
        let id = self.registry.borrow_mut().timeline_keys.insert(());
        tracing::debug!(?id, duration_ms = timeline.duration_ms(), "timeline added");
        self.timelines.push((id, timeline));
        self.ensure_started();
        id
    }

    /// Register a callback run every frame until explicitly removed
    pub fn add_animation(&mut self, animation: impl FnMut(f64, f64) + 'static) -> AnimationId {
        self.add_boxed_animation(Box::new(animation))
    }

    fn add_boxed_animation(&mut self, animation: FrameCallback) -> AnimationId {
        let id = self.registry.borrow_mut().animation_keys.insert(());
        tracing::debug!(?id, "frame callback added");
        self.animations.push((id, animation));
        self.ensure_started();
        id
    }

    pub fn remove_tween(&mut self, id: TweenId) -> Option<Tween> {
        let index = self.tweens.iter().position(|(key, _)| *key == id)?;
        self.registry.borrow_mut().tween_keys.remove(id);
        Some(self.tweens.remove(index).1)
    }

    pub fn remove_timeline(&mut self, id: TimelineId) -> Option<Timeline> {
        let index = self.timelines.iter().position(|(key, _)| *key == id)?;
        self.registry.borrow_mut().timeline_keys.remove(id);
        Some(self.timelines.remove(index).1)
    }

    pub fn remove_animation(&mut self, id: AnimationId) -> Option<FrameCallback> {
        let index = self.animations.iter().position(|(key, _)| *key == id)?;
        self.registry.borrow_mut().animation_keys.remove(id);
        Some(self.animations.remove(index).1)
    }

    pub fn tween(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.iter().find(|(key, _)| *key == id).map(|(_, t)| t)
    }

    pub fn tween_mut(&mut self, id: TweenId) -> Option<&mut Tween> {
        self.tweens.iter_mut().find(|(key, _)| *key == id).map(|(_, t)| t)
    }

    pub fn timeline(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.iter().find(|(key, _)| *key == id).map(|(_, t)| t)
    }

    pub fn timeline_mut(&mut self, id: TimelineId) -> Option<&mut Timeline> {
        self.timelines
            .iter_mut()
            .find(|(key, _)| *key == id)
            .map(|(_, t)| t)
    }

    /// Live tween ids in registration order
    pub fn tween_ids(&self) -> impl Iterator<Item = TweenId> + '_ {
        self.tweens.iter().map(|(id, _)| *id)
    }

    /// Live timeline ids in registration order
    pub fn timeline_ids(&self) -> impl Iterator<Item = TimelineId> + '_ {
        self.timelines.iter().map(|(id, _)| *id)
    }

    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    pub fn timeline_count(&self) -> usize {
        self.timelines.len()
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Whether any tween or timeline is live or queued to join
    pub fn has_active_animations(&self) -> bool {
        !self.tweens.is_empty()
            || !self.timelines.is_empty()
            || self
                .registry
                .borrow()
                .pending
                .iter()
                .any(|op| matches!(op, Pending::AddTween(..) | Pending::AddTimeline(..)))
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Mark the manager running. The next update seeds the frame clock.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_time = None;
        tracing::debug!("animation manager started");
    }

    /// Halt updates; a self-driven loop exits after the current frame
    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!(frames = self.frame_count, "animation manager stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn ensure_started(&mut self) {
        if !self.running {
            self.start();
        }
    }

    /// Advance everything to `now` (milliseconds).
    ///
    /// Work queued through handles joins first. Tweens run in registration
    /// order, then timelines, then frame callbacks.
    pub fn update(&mut self, now: f64) {
        self.flush_pending();
        if !self.running {
            return;
        }

        self.delta_time = match self.last_time {
            Some(last) => {
                let delta = now - last;
                self.stats.record(delta);
                delta
            }
            None => 0.0,
        };
        self.last_time = Some(now);

        let mut tweens = Vec::with_capacity(self.tweens.len());
        for (id, mut tween) in std::mem::take(&mut self.tweens) {
            match isolate(|| tween.update(now)) {
                Ok(false) => tweens.push((id, tween)),
                Ok(true) => {
                    tracing::debug!(?id, "tween complete");
                    self.registry.borrow_mut().tween_keys.remove(id);
                }
                Err(message) => {
                    tracing::error!(?id, %message, "tween panicked during update, dropping it");
                    self.registry.borrow_mut().tween_keys.remove(id);
                }
            }
        }
        self.tweens = tweens;

        let mut timelines = Vec::with_capacity(self.timelines.len());
        for (id, mut timeline) in std::mem::take(&mut self.timelines) {
            match isolate(|| timeline.update(now)) {
                Ok(false) => timelines.push((id, timeline)),
                Ok(true) => {
                    tracing::debug!(?id, "timeline complete");
                    self.registry.borrow_mut().timeline_keys.remove(id);
                }
                Err(message) => {
                    tracing::error!(?id, %message, "timeline panicked during update, dropping it");
                    self.registry.borrow_mut().timeline_keys.remove(id);
                }
            }
        }
        self.timelines = timelines;

        let delta = self.delta_time;
        let mut animations = Vec::with_capacity(self.animations.len());
        for (id, mut animation) in std::mem::take(&mut self.animations) {
            match isolate(|| animation(now, delta)) {
                Ok(()) => animations.push((id, animation)),
                Err(message) => {
                    tracing::error!(?id, %message, "frame callback panicked, dropping it");
                    self.registry.borrow_mut().animation_keys.remove(id);
                }
            }
        }
        self.animations = animations;

        self.frame_count += 1;
        self.apply_stop_request();
    }

    /// Drive `update` from `clock` until stopped or `until` returns true.
    ///
    /// Sleeps (or, for a manual clock, advances) by whatever is left of the
    /// configured frame interval after each frame. Returns the number of
    /// frames driven.
    pub fn run(
        &mut self,
        clock: &impl Clock,
        mut until: impl FnMut(&AnimationManager) -> bool,
    ) -> u64 {
        self.start();
        let interval = self.config.frame_interval_ms;
        let mut frames = 0;
        tracing::debug!(interval_ms = interval, "self-driven loop entered");

        while self.running {
            let frame_start = clock.now_ms();
            self.update(frame_start);
            frames += 1;
            if until(self) {
                break;
            }
            let spent = clock.now_ms() - frame_start;
            clock.wait((interval - spent).max(0.0));
        }

        tracing::debug!(frames, "self-driven loop exited");
        frames
    }

    fn flush_pending(&mut self) {
        let pending = std::mem::take(&mut self.registry.borrow_mut().pending);
        for op in pending {
            match op {
                Pending::AddTween(id, tween) => {
                    self.tweens.push((id, tween));
                    self.ensure_started();
                }
                Pending::AddTimeline(id, timeline) => {
                    self.timelines.push((id, timeline));
                    self.ensure_started();
                }
                Pending::AddAnimation(id, animation) => {
                    self.animations.push((id, animation));
                    self.ensure_started();
                }
                Pending::RemoveTween(id) => {
                    self.remove_tween(id);
                }
                Pending::RemoveTimeline(id) => {
                    self.remove_timeline(id);
                }
                Pending::RemoveAnimation(id) => {
                    self.remove_animation(id);
                }
            }
        }
        self.apply_stop_request();
    }

    fn apply_stop_request(&mut self) {
        let requested = std::mem::take(&mut self.registry.borrow_mut().stop_requested);
        if requested {
            self.stop();
        }
    }

    // =========================================================================
    // Broadcast controls and statistics
    // =========================================================================

    /// Pause every tween and timeline. Frame callbacks keep running.
    pub fn pause_all(&mut self) {
        self.tweens.iter_mut().for_each(|(_, tween)| tween.pause());
        self.timelines
            .iter_mut()
            .for_each(|(_, timeline)| timeline.pause());
    }

    /// Resume every paused tween and timeline.
    ///
    /// Unlike calling `play` on each item, this leaves items that are not
    /// paused alone: a running tween keeps its progress instead of
    /// restarting, and an idle or stopped one is not started.
    pub fn resume_all(&mut self) {
        self.tweens.iter_mut().for_each(|(_, tween)| tween.resume());
        self.timelines
            .iter_mut()
            .for_each(|(_, timeline)| timeline.resume());
    }

    /// Drop every tween, timeline and frame callback, including queued ones.
    /// The running state is left untouched.
    pub fn clear(&mut self) {
        let tweens = std::mem::take(&mut self.tweens);
        let timelines = std::mem::take(&mut self.timelines);
        let animations = std::mem::take(&mut self.animations);
        let pending = {
            let mut registry = self.registry.borrow_mut();
            registry.tween_keys.clear();
            registry.timeline_keys.clear();
            registry.animation_keys.clear();
            std::mem::take(&mut registry.pending)
        };
        tracing::debug!(
            tweens = tweens.len(),
            timelines = timelines.len(),
            animations = animations.len(),
            queued = pending.len(),
            "animations cleared"
        );
    }

    /// Frames per second over the recent frame history, 0 before any delta
    pub fn fps(&self) -> f64 {
        self.stats.fps()
    }

    pub fn average_frame_time(&self) -> f64 {
        self.stats.average_frame_time()
    }

    pub fn frame_stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Delta of the most recent frame in milliseconds
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for AnimationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnimationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationManager")
            .field("tweens", &self.tweens.len())
            .field("timelines", &self.timelines.len())
            .field("animations", &self.animations.len())
            .field("running", &self.running)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

/// Run one item's update so a panic only takes that item down
fn isolate<R>(update: impl FnOnce() -> R) -> std::result::Result<R, String> {
    panic::catch_unwind(AssertUnwindSafe(update)).map_err(panic_message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Registers work with an [`AnimationManager`] from inside its callbacks.
///
/// Everything queued here joins at the start of the manager's next update.
#[derive(Clone)]
pub struct ManagerHandle {
    registry: Rc<RefCell<Registry>>,
}

impl ManagerHandle {
    pub fn add_tween(&self, tween: Tween) -> TweenId {
        let mut registry = self.registry.borrow_mut();
        let id = registry.tween_keys.insert(());
        registry.pending.push(Pending::AddTween(id, tween));
        id
    }

    pub fn add_timeline(&self, timeline: Timeline) -> TimelineId {
        let mut registry = self.registry.borrow_mut();
        let id = registry.timeline_keys.insert(());
        registry.pending.push(Pending::AddTimeline(id, timeline));
        id
    }

    pub fn add_animation(&self, animation: impl FnMut(f64, f64) + 'static) -> AnimationId {
        let mut registry = self.registry.borrow_mut();
        let id = registry.animation_keys.insert(());
        registry
            .pending
            .push(Pending::AddAnimation(id, Box::new(animation)));
        id
    }

    pub fn remove_tween(&self, id: TweenId) {
        self.registry
            .borrow_mut()
            .pending
            .push(Pending::RemoveTween(id));
    }

    pub fn remove_timeline(&self, id: TimelineId) {
        self.registry
            .borrow_mut()
            .pending
            .push(Pending::RemoveTimeline(id));
    }

    pub fn remove_animation(&self, id: AnimationId) {
        self.registry
            .borrow_mut()
            .pending
            .push(Pending::RemoveAnimation(id));
    }

    /// Ask the manager to stop once the current frame finishes
    pub fn stop(&self) {
        self.registry.borrow_mut().stop_requested = true;
    }
}

impl fmt::Debug for ManagerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerHandle")
            .field("queued", &self.registry.borrow().pending.len())
            .finish()
    }
}
