//! Convenience constructors that build, start and register in one call

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::manager::{AnimationManager, ManagerHandle, TimelineId, TweenId};
use crate::target::Settable;
use crate::timeline::Timeline;
use crate::tween::Tween;

/// Anything tweens and timelines can be registered with
pub trait Registrar {
    fn register_tween(&mut self, tween: Tween) -> TweenId;
    fn register_timeline(&mut self, timeline: Timeline) -> TimelineId;
}

impl Registrar for AnimationManager {
    fn register_tween(&mut self, tween: Tween) -> TweenId {
        self.add_tween(tween)
    }

    fn register_timeline(&mut self, timeline: Timeline) -> TimelineId {
        self.add_timeline(timeline)
    }
}

impl Registrar for ManagerHandle {
    fn register_tween(&mut self, tween: Tween) -> TweenId {
        self.add_tween(tween)
    }

    fn register_timeline(&mut self, timeline: Timeline) -> TimelineId {
        self.add_timeline(timeline)
    }
}

/// Animate `target` from its current value to `to`.
///
/// The tween starts playing immediately; its start time is the next frame
/// timestamp the manager sees.
pub fn animate<R: Registrar + ?Sized>(
    registrar: &mut R,
    target: impl Settable + 'static,
    to: f32,
    duration_ms: f64,
    easing: impl Into<Easing>,
) -> Result<TweenId> {
    let tween = build(target, to, duration_ms, easing)?;
    Ok(start(registrar, tween))
}

/// [`animate`] with a completion callback
pub fn animate_with<R: Registrar + ?Sized>(
    registrar: &mut R,
    target: impl Settable + 'static,
    to: f32,
    duration_ms: f64,
    easing: impl Into<Easing>,
    on_complete: impl FnMut() + 'static,
) -> Result<TweenId> {
    let tween = build(target, to, duration_ms, easing)?.on_complete(on_complete);
    Ok(start(registrar, tween))
}

/// An empty timeline to build on
pub fn timeline() -> Timeline {
    Timeline::new()
}

/// Play a timeline and register it
pub fn play<R: Registrar + ?Sized>(registrar: &mut R, mut timeline: Timeline) -> TimelineId {
    timeline.play();
    registrar.register_timeline(timeline)
}

fn build(
    target: impl Settable + 'static,
    to: f32,
    duration_ms: f64,
    easing: impl Into<Easing>,
) -> Result<Tween> {
    let from = target.get().ok_or(AnimationError::UnreadableTarget)?;
    Ok(Tween::new(target, from, to, duration_ms)?.easing(easing))
}

fn start<R: Registrar + ?Sized>(registrar: &mut R, mut tween: Tween) -> TweenId {
    tween.play();
    registrar.register_tween(tween)
}
