//! Uniform Animation Demo
//!
//! Drives a handful of ring-shader uniforms in real time:
//! - A bounce on the radius that queues its own bounce-back on completion
//! - A staggered timeline across glow, colour shift and ring count
//! - A per-frame callback logging the values
//!
//! Run with: cargo run -p halo_animation --example uniform_demo

use halo_animation::{
    animate, animate_with, play, timeline, AnimationManager, Easing, Result, SharedValue,
    SystemClock, TweenConfig,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let radius = SharedValue::new(0.5);
    let glow = SharedValue::new(10.0);
    let color_shift = SharedValue::new(0.0);
    let ring_count = SharedValue::new(3.0);

    let mut manager = AnimationManager::new();
    let mut handle = manager.handle();

    // Bounce out, then back once landed
    let bounce_back = radius.clone();
    animate_with(
        &mut manager,
        radius.clone(),
        0.9,
        1500.0,
        Easing::EaseOutBounce,
        move || {
            if let Err(err) = animate(&mut handle, bounce_back.clone(), 0.5, 1000.0, "easeInBounce")
            {
                tracing::error!("bounce back failed: {}", err);
            }
        },
    )?;

    let intro = timeline()
        .to(TweenConfig::new(glow.clone(), 10.0, 20.0)
            .duration(800.0)
            .delay(200.0)
            .easing("easeInOutSine"))?
        .to(TweenConfig::new(color_shift.clone(), 0.0, 5.0)
            .duration(1500.0)
            .delay(300.0)
            .easing("easeInOutElastic"))?
        .to(TweenConfig::new(ring_count.clone(), 3.0, 5.0)
            .duration(1000.0)
            .delay(500.0)
            .easing(Easing::EaseOutBack))?
        .on_complete(|| tracing::info!("timeline complete"));
    play(&mut manager, intro);

    let (r, g, c, n) = (radius.clone(), glow.clone(), color_shift.clone(), ring_count.clone());
    let mut frame = 0u64;
    manager.add_animation(move |now, _| {
        frame += 1;
        if frame % 15 == 0 {
            tracing::info!(
                "{:>7.1}ms radius={:.3} glow={:.2} shift={:.2} rings={:.2}",
                now,
                r.get(),
                g.get(),
                c.get(),
                n.get()
            );
        }
    });

    let frames = manager.run(&SystemClock::new(), |m| m.tween_count() + m.timeline_count() == 0);
    tracing::info!("done after {} frames at {:.1} fps", frames, manager.fps());

    Ok(())
}
