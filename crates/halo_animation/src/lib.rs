//! Halo Animation System
//!
//! Time-driven tweens and timelines for animating shader uniforms and any
//! other numeric property.
//!
//! # Features
//!
//! - **Easing**: the standard quad-through-bounce curve families, CSS cubic
//!   beziers and custom curves, looked up by name with a linear fallback
//! - **Tweens**: one property, one curve, with pause/resume that excludes the
//!   paused interval
//! - **Timelines**: offset, sequential and parallel composition of tweens
//! - **Manager**: advances everything from one external timestamp per frame
//!   and prunes what has finished
//!
//! # Example
//!
//! ```rust
//! use halo_animation::{animate, AnimationManager, Easing, SharedValue};
//!
//! let mut manager = AnimationManager::new();
//! let radius = SharedValue::new(0.5);
//!
//! animate(&mut manager, radius.clone(), 0.9, 1000.0, Easing::EaseOutQuad).unwrap();
//!
//! manager.update(0.0);
//! manager.update(1000.0);
//! assert_eq!(radius.get(), 0.9);
//! assert_eq!(manager.tween_count(), 0);
//! ```

pub mod clock;
pub mod config;
pub mod easing;
pub mod error;
pub mod factory;
pub mod manager;
pub mod stats;
pub mod target;
pub mod timeline;
pub mod tween;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ManagerConfig;
pub use easing::Easing;
pub use error::{AnimationError, Result, TargetError};
pub use factory::{animate, animate_with, play, timeline, Registrar};
pub use manager::{AnimationId, AnimationManager, FrameCallback, ManagerHandle, TimelineId, TweenId};
pub use stats::FrameStats;
pub use target::{Property, Settable, SharedValue, Setter, WeakValue};
pub use timeline::{EntrySpan, Timeline, TweenConfig};
pub use tween::Tween;
