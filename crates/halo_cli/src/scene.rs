//! Scene files for `halo play`
//!
//! A scene names a set of uniforms with their initial values and a list of
//! steps that become one timeline over those uniforms.

use anyhow::{Context, Result};
use halo_animation::{Easing, ManagerConfig, SharedValue, Timeline, TweenConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Top-level scene description (`*.toml`)
#[derive(Debug, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub manager: ManagerConfig,
    #[serde(default)]
    pub uniforms: BTreeMap<String, f32>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One timeline step, tagged by `kind`
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Tween at its own delay from the timeline start
    To(TweenStep),
    /// Tween starting when everything so far has finished
    Then(TweenStep),
    /// Tweens sharing one start time
    Parallel { tweens: Vec<TweenStep> },
    /// Gap appended at the end of the timeline
    Delay { duration_ms: f64 },
}

#[derive(Debug, Deserialize)]
pub struct TweenStep {
    pub uniform: String,
    /// Defaults to the value the uniform holds when the step begins
    #[serde(default)]
    pub from: Option<f32>,
    pub to: f32,
    #[serde(default = "default_duration")]
    pub duration_ms: f64,
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub delay_ms: f64,
}

fn default_duration() -> f64 {
    1000.0
}

/// The live uniform cells a scene animates
#[derive(Debug, Default)]
pub struct Uniforms {
    values: BTreeMap<String, SharedValue>,
}

impl Uniforms {
    pub fn get(&self, name: &str) -> Result<&SharedValue> {
        self.values
            .get(name)
            .with_context(|| format!("Unknown uniform `{}`", name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.get()))
    }

    /// `name=value` pairs on one line
    pub fn describe(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{}={:.3}", name, value))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scene: Scene = toml::from_str(content)?;
        scene.manager.validate().context("Invalid [manager] table")?;
        Ok(scene)
    }

    /// Fresh uniform cells holding the scene's initial values
    pub fn uniforms(&self) -> Uniforms {
        Uniforms {
            values: self
                .uniforms
                .iter()
                .map(|(name, value)| (name.clone(), SharedValue::new(*value)))
                .collect(),
        }
    }

    /// Build the scene's timeline over `uniforms`.
    ///
    /// A step without an explicit `from` starts where the previous step on
    /// the same uniform ended, in declaration order.
    pub fn build_timeline(&self, uniforms: &Uniforms) -> Result<Timeline> {
        let mut planned = self.uniforms.clone();
        let mut timeline = Timeline::new();

        for (index, step) in self.steps.iter().enumerate() {
            let added = match step {
                Step::To(tween) => timeline.add(tween.config(uniforms, &mut planned)?),
                Step::Then(tween) => timeline.add_after(tween.config(uniforms, &mut planned)?),
                Step::Parallel { tweens } => {
                    let configs = tweens
                        .iter()
                        .map(|tween| tween.config(uniforms, &mut planned))
                        .collect::<Result<Vec<_>>>()?;
                    timeline.add_parallel(configs)
                }
                Step::Delay { duration_ms } => timeline.add_delay(*duration_ms),
            };
            added.with_context(|| format!("Invalid step {}", index + 1))?;
        }

        Ok(timeline)
    }
}

impl TweenStep {
    fn config(
        &self,
        uniforms: &Uniforms,
        planned: &mut BTreeMap<String, f32>,
    ) -> Result<TweenConfig> {
        let target = uniforms.get(&self.uniform)?;
        let from = match self.from {
            Some(from) => from,
            None => planned
                .get(&self.uniform)
                .copied()
                .unwrap_or_else(|| target.get()),
        };
        planned.insert(self.uniform.clone(), self.to);

        Ok(TweenConfig::new(target.clone(), from, self.to)
            .duration(self.duration_ms)
            .easing(self.easing)
            .delay(self.delay_ms))
    }
}
