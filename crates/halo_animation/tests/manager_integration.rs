//! Integration tests for the animation manager
//!
//! These tests verify that:
//! - Tweens and timelines registered with a manager drive their targets
//! - Completed items are pruned while survivors keep their order
//! - Work queued from callbacks joins on the next frame
//! - One misbehaving item never stops its siblings

use halo_animation::{
    animate, animate_with, play, timeline, AnimationError, AnimationManager, Clock, Easing,
    ManagerConfig, ManualClock, Property, Settable, SharedValue, Tween, TweenConfig,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn playing(tween: Tween) -> Tween {
    let mut tween = tween;
    tween.play();
    tween
}

/// End-to-end: easeOutQuad over 1000ms sampled every quarter
#[test]
fn test_ease_out_quad_sequence() {
    let mut manager = AnimationManager::new();
    let x = SharedValue::new(0.0);
    animate(&mut manager, x.clone(), 100.0, 1000.0, "easeOutQuad").unwrap();

    let mut samples = Vec::new();
    for t in [0.0, 250.0, 500.0, 750.0, 1000.0] {
        manager.update(t);
        samples.push(x.get());
    }

    let expected = [0.0, 43.75, 75.0, 93.75, 100.0];
    for (got, want) in samples.iter().zip(expected) {
        assert!(close(*got, want), "got {:?}, want {:?}", samples, expected);
    }
    assert_eq!(manager.tween_count(), 0);
}

/// Completed tweens are removed; survivors keep registration order
#[test]
fn test_completed_tween_is_pruned_in_order() {
    let mut manager = AnimationManager::new();
    let first = manager.add_tween(playing(Tween::detached(0.0, 1.0, 100.0).unwrap()));
    let second = manager.add_tween(playing(Tween::detached(0.0, 1.0, 50.0).unwrap()));
    let third = manager.add_tween(playing(Tween::detached(0.0, 1.0, 200.0).unwrap()));

    manager.update(0.0);
    manager.update(60.0);

    let live: Vec<_> = manager.tween_ids().collect();
    assert_eq!(live, vec![first, third]);
    assert!(manager.tween(second).is_none());
    assert!(manager.remove_tween(second).is_none());
}

#[test]
fn test_fps_tracking() {
    let mut manager = AnimationManager::new();
    assert_eq!(manager.fps(), 0.0);

    manager.start();
    let mut now = 0.0;
    for _ in 0..=70 {
        manager.update(now);
        now += 16.6;
    }

    assert!((manager.fps() - 1000.0 / 16.6).abs() < 0.01);
    assert_eq!(manager.frame_stats().len(), 60);
    assert_eq!(manager.frame_count(), 71);
}

#[test]
fn test_first_frame_has_no_spurious_delta() {
    let mut manager = AnimationManager::new();
    let deltas = Rc::new(RefCell::new(Vec::new()));
    let sink = deltas.clone();
    manager.add_animation(move |_, delta| sink.borrow_mut().push(delta));

    manager.update(5_000.0);
    manager.update(5_016.0);

    assert_eq!(*deltas.borrow(), vec![0.0, 16.0]);
    assert_eq!(manager.average_frame_time(), 16.0);
}

/// A completion callback queues a follow-up that starts on the next frame
#[test]
fn test_reentrant_registration_joins_next_frame() {
    let mut manager = AnimationManager::new();
    let radius = SharedValue::new(0.5);

    let mut handle = manager.handle();
    let bounce_back = radius.clone();
    animate_with(
        &mut manager,
        radius.clone(),
        0.9,
        100.0,
        Easing::EaseOutBounce,
        move || {
            animate(&mut handle, bounce_back.clone(), 0.5, 100.0, Easing::EaseInBounce)
                .expect("follow-up tween");
        },
    )
    .unwrap();

    manager.update(0.0);
    manager.update(100.0);
    assert_eq!(radius.get(), 0.9);
    assert_eq!(manager.tween_count(), 0);
    assert!(manager.has_active_animations());

    manager.update(200.0);
    assert_eq!(manager.tween_count(), 1);
    assert_eq!(radius.get(), 0.9);

    manager.update(300.0);
    assert_eq!(radius.get(), 0.5);
    assert!(!manager.has_active_animations());
}

#[test]
fn test_panicking_item_does_not_stop_siblings() {
    let mut manager = AnimationManager::new();
    let x = SharedValue::new(0.0);

    manager.add_tween(playing(
        Tween::detached(0.0, 1.0, 100.0)
            .unwrap()
            .on_update(|_, progress| {
                if progress > 0.2 {
                    panic!("shader uniform missing");
                }
            }),
    ));
    manager.add_tween(playing(Tween::new(x.clone(), 0.0, 10.0, 100.0).unwrap()));

    manager.update(0.0);
    manager.update(50.0);

    assert_eq!(manager.tween_count(), 1);
    assert!(close(x.get(), 5.0));
}

#[test]
fn test_dropped_target_is_skipped() {
    struct Uniforms {
        glow: f32,
    }

    let mut manager = AnimationManager::new();
    let uniforms = Rc::new(RefCell::new(Uniforms { glow: 1.0 }));
    let survivor = SharedValue::new(0.0);

    manager.add_tween(playing(
        Tween::new(Property::new(&uniforms, |u| &mut u.glow), 1.0, 20.0, 100.0).unwrap(),
    ));
    manager.add_tween(playing(Tween::new(survivor.clone(), 0.0, 1.0, 100.0).unwrap()));

    manager.update(0.0);
    drop(uniforms);
    manager.update(50.0);
    manager.update(100.0);

    assert_eq!(survivor.get(), 1.0);
    assert_eq!(manager.tween_count(), 0);
}

#[test]
fn test_timeline_runs_to_completion() {
    let mut manager = AnimationManager::new();
    let radius = SharedValue::new(0.5);
    let speed = SharedValue::new(1.0);
    let done = Rc::new(Cell::new(false));
    let flag = done.clone();

    let tl = timeline()
        .to(TweenConfig::new(radius.clone(), 0.5, 0.8)
            .duration(1000.0)
            .easing("easeOutQuad"))
        .unwrap()
        .parallel(vec![
            TweenConfig::new(speed.clone(), 1.0, 1.5).duration(500.0),
            TweenConfig::detached(0.0, 1.0).duration(500.0).delay(200.0),
        ])
        .unwrap()
        .on_complete(move || flag.set(true));
    let id = play(&mut manager, tl);
    assert_eq!(manager.timeline(id).map(|t| t.duration_ms()), Some(1000.0));

    manager.update(0.0);
    manager.update(100.0);
    assert_eq!(speed.get(), 1.0);

    manager.update(450.0);
    assert!(close(speed.get(), 1.25));
    manager.update(650.0);
    assert!(close(speed.get(), 1.45));

    manager.update(999.0);
    assert!(!done.get());
    assert!(close(radius.get(), 0.8));
    // Outside its window the parallel entry keeps its last written value
    assert!(close(speed.get(), 1.45));

    manager.update(1000.0);
    assert!(done.get());
    assert_eq!(manager.timeline_count(), 0);
}

#[test]
fn test_pause_all_and_resume_all() {
    let mut manager = AnimationManager::new();
    let x = SharedValue::new(0.0);
    let ticks = Rc::new(Cell::new(0));
    let counter = ticks.clone();
    manager.add_tween(playing(Tween::new(x.clone(), 0.0, 100.0, 1000.0).unwrap()));
    manager.add_animation(move |_, _| counter.set(counter.get() + 1));

    manager.update(0.0);
    manager.update(100.0);
    manager.pause_all();
    manager.update(500.0);
    assert!(close(x.get(), 10.0));
    assert_eq!(ticks.get(), 3);

    manager.resume_all();
    manager.update(600.0);
    assert!(close(x.get(), 10.0));
    manager.update(700.0);
    assert!(close(x.get(), 20.0));
}

#[test]
fn test_resume_all_leaves_running_items_alone() {
    let mut manager = AnimationManager::new();
    let running = SharedValue::new(0.0);
    let idle = SharedValue::new(0.0);
    let id = manager.add_tween(playing(Tween::new(running.clone(), 0.0, 100.0, 1000.0).unwrap()));
    let idle_id = manager.add_tween(Tween::new(idle.clone(), 0.0, 1.0, 100.0).unwrap());

    manager.update(0.0);
    manager.update(500.0);
    manager.resume_all();
    manager.update(600.0);

    assert!(close(running.get(), 60.0));
    assert!(manager.tween(id).is_some_and(|t| t.is_playing()));
    assert!(manager.tween(idle_id).is_some_and(|t| !t.is_playing()));
    assert_eq!(idle.get(), 0.0);
}

#[test]
fn test_stop_clear_and_removal() {
    let mut manager = AnimationManager::new();
    let ticks = Rc::new(Cell::new(0));
    let counter = ticks.clone();
    let id = manager.add_animation(move |_, _| counter.set(counter.get() + 1));
    assert!(manager.is_running());

    manager.update(0.0);
    manager.stop();
    manager.update(16.0);
    assert_eq!(ticks.get(), 1);

    manager.start();
    manager.update(32.0);
    assert_eq!(ticks.get(), 2);

    assert!(manager.remove_animation(id).is_some());
    assert!(manager.remove_animation(id).is_none());
    manager.update(48.0);
    assert_eq!(ticks.get(), 2);

    manager.add_tween(Tween::detached(0.0, 1.0, 10.0).unwrap());
    manager.add_animation(|_, _| {});
    manager.clear();
    assert_eq!(manager.tween_count(), 0);
    assert_eq!(manager.animation_count(), 0);
    assert!(manager.is_running());
}

#[test]
fn test_self_driven_loop_with_manual_clock() {
    let config = ManagerConfig {
        frame_interval_ms: 10.0,
        ..ManagerConfig::default()
    };
    let mut manager = AnimationManager::with_config(config).unwrap();
    let clock = ManualClock::new(0.0);
    let x = SharedValue::new(0.0);
    animate(&mut manager, x.clone(), 1.0, 100.0, Easing::EaseInOutSine).unwrap();

    let frames = manager.run(&clock, |m| !m.has_active_animations());

    assert_eq!(frames, 11);
    assert_eq!(x.get(), 1.0);
    assert_eq!(clock.now_ms(), 100.0);
    assert!((manager.fps() - 100.0).abs() < 1e-6);
}

#[test]
fn test_out_of_range_config_is_rejected() {
    for config in [
        ManagerConfig {
            frame_interval_ms: 0.0,
            ..ManagerConfig::default()
        },
        ManagerConfig {
            frame_interval_ms: f64::NAN,
            ..ManagerConfig::default()
        },
        ManagerConfig {
            frame_history: 0,
            frame_interval_ms: -5.0,
        },
    ] {
        assert!(matches!(
            AnimationManager::with_config(config),
            Err(AnimationError::ConfigValue { .. })
        ));
    }

    let parsed = ManagerConfig::from_toml_str("frame_interval_ms = 0.0");
    assert!(parsed.is_err());
}

#[test]
fn test_handle_stop_ends_self_driven_loop() {
    let mut manager = AnimationManager::new();
    let clock = ManualClock::new(0.0);
    let handle = manager.handle();
    let frames_seen = Rc::new(Cell::new(0));
    let counter = frames_seen.clone();
    manager.add_animation(move |_, _| {
        counter.set(counter.get() + 1);
        if counter.get() == 5 {
            handle.stop();
        }
    });

    let frames = manager.run(&clock, |_| false);

    assert_eq!(frames, 5);
    assert!(!manager.is_running());
}

#[test]
fn test_handle_removal_applies_next_frame() {
    let mut manager = AnimationManager::new();
    let handle = manager.handle();
    let x = SharedValue::new(0.0);
    let id = manager.add_tween(playing(Tween::new(x.clone(), 0.0, 10.0, 100.0).unwrap()));

    manager.update(0.0);
    handle.remove_tween(id);
    manager.update(50.0);

    assert_eq!(manager.tween_count(), 0);
    assert_eq!(x.get(), 0.0);
}

#[test]
fn test_independent_managers() {
    let mut a = AnimationManager::new();
    let b = AnimationManager::new();
    let x = SharedValue::new(0.0);
    animate(&mut a, x.clone(), 1.0, 100.0, "linear").unwrap();

    assert_eq!(a.tween_count(), 1);
    assert_eq!(b.tween_count(), 0);
    assert!(!b.is_running());
    assert_eq!(Settable::get(&x), Some(0.0));
}
