//! Halo CLI - inspect easing curves and play uniform animation scenes
//!
//! Scenes run headlessly against a fixed-step clock, so output is the same
//! on every machine.

mod scene;

use anyhow::Result;
use clap::{Parser, Subcommand};
use halo_animation::{play, AnimationManager, Clock, Easing, ManualClock};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::scene::Scene;

/// Easing curves and timeline scenes for shader uniforms
#[derive(Parser, Debug)]
#[command(name = "halo")]
#[command(about = "Inspect easing curves and play uniform animation scenes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every named easing curve
    Easings,

    /// Print an easing curve at evenly spaced points
    Sample {
        /// Easing name (unknown names fall back to linear)
        name: String,

        /// Number of intervals between t=0 and t=1
        #[arg(short, long, default_value = "10")]
        steps: u32,
    },

    /// Play a scene file and print uniform values as it runs
    Play {
        /// Scene file (TOML)
        scene: PathBuf,

        /// Frame rate, overriding the scene's frame interval
        #[arg(long)]
        fps: Option<f64>,

        /// Print every Nth frame
        #[arg(long, default_value = "1")]
        every: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Easings => {
            for easing in Easing::ALL {
                println!("{}", easing);
            }
            Ok(())
        }
        Command::Sample { name, steps } => {
            sample(&name, steps);
            Ok(())
        }
        Command::Play { scene, fps, every } => play_scene(&scene, fps, every),
    }
}

fn sample(name: &str, steps: u32) {
    let easing = Easing::from_name(name);
    let steps = steps.max(1);

    println!("{:>6}  {}", "t", easing);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        println!("{:>6.3}  {:.6}", t, easing.apply(t));
    }
}

fn play_scene(path: &Path, fps: Option<f64>, every: u64) -> Result<()> {
    let scene = Scene::load(path)?;

    let mut config = scene.manager.clone();
    if let Some(fps) = fps {
        anyhow::ensure!(fps.is_finite() && fps > 0.0, "--fps must be a positive number");
        config = config.with_target_fps(fps);
    }

    let uniforms = scene.uniforms();
    let timeline = scene.build_timeline(&uniforms)?;
    tracing::info!(
        scene = %path.display(),
        entries = timeline.len(),
        duration_ms = timeline.duration_ms(),
        "Playing scene"
    );

    let mut manager = AnimationManager::with_config(config)?;
    let id = play(&mut manager, timeline);
    let clock = ManualClock::new(0.0);
    let every = every.max(1);

    let frames = manager.run(&clock, |manager| {
        let done = manager.timeline(id).is_none();
        if done || (manager.frame_count() - 1) % every == 0 {
            println!("{:>9.1}ms  {}", clock.now_ms(), uniforms.describe());
        }
        done
    });

    println!();
    println!("frames:   {}", frames);
    println!("elapsed:  {:.1}ms", clock.now_ms());
    println!("fps:      {:.1}", manager.fps());
    println!("final:    {}", uniforms.describe());

    Ok(())
}
