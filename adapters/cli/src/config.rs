//! Arena description loaded from TOML.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use arena_core::{ItemCatalog, ItemDefinition, PlayerSheet, SpawnRegion, StageInfo};
use arena_system_modifier_expiry as modifier_expiry;
use arena_system_spawning::{self as spawning, SpawnCatalog};
use serde::Deserialize;

const DEFAULT_ARENA: &str = include_str!("../default_arena.toml");

/// Pacing delays expressed in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TimingConfig {
    pub(crate) time_between_spawns: f64,
    pub(crate) time_between_waves: f64,
    pub(crate) modifier_duration: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            time_between_spawns: 0.2,
            time_between_waves: 1.0,
            modifier_duration: 5.0,
        }
    }
}

/// Everything needed to assemble the world and its systems.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ArenaConfig {
    pub(crate) timing: TimingConfig,
    pub(crate) templates: Vec<String>,
    pub(crate) regions: Vec<SpawnRegion>,
    pub(crate) items: Vec<ItemDefinition>,
    pub(crate) player: PlayerSheet,
    pub(crate) stages: Vec<StageInfo>,
}

impl ArenaConfig {
    /// Arena embedded into the binary.
    pub(crate) fn builtin() -> Result<Self> {
        Self::from_toml(DEFAULT_ARENA).context("built-in arena is invalid")
    }

    /// Reads and validates an arena file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read arena file at {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("failed to load arena file at {}", path.display()))
    }

    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse arena toml contents")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let timing = &self.timing;
        for (name, seconds) in [
            ("time_between_spawns", timing.time_between_spawns),
            ("time_between_waves", timing.time_between_waves),
            ("modifier_duration", timing.modifier_duration),
        ] {
            if !seconds.is_finite() || seconds < 0.0 {
                bail!("timing.{name} must be a non-negative number of seconds, got {seconds}");
            }
        }

        for (index, region) in self.regions.iter().enumerate() {
            let bounds = [region.x_min(), region.x_max(), region.y_min(), region.y_max()];
            if bounds.iter().any(|bound| !bound.is_finite()) {
                bail!("regions[{index}] has non-finite bounds {bounds:?}");
            }
        }

        for stage in &self.stages {
            if self.stages.iter().filter(|other| other.name == stage.name).count() > 1 {
                bail!("stage `{}` is defined more than once", stage.name);
            }
            if stage.waves.is_empty() {
                bail!("stage `{}` has no waves", stage.name);
            }
        }
        Ok(())
    }

    /// Scheduler pacing derived from the timing table.
    pub(crate) fn spawn_config(&self) -> Result<spawning::Config> {
        Ok(spawning::Config::new(
            seconds("timing.time_between_spawns", self.timing.time_between_spawns)?,
            seconds("timing.time_between_waves", self.timing.time_between_waves)?,
        ))
    }

    /// Lifetime granted to temporary modifiers.
    pub(crate) fn expiry_config(&self) -> Result<modifier_expiry::Config> {
        Ok(modifier_expiry::Config::new(seconds(
            "timing.modifier_duration",
            self.timing.modifier_duration,
        )?))
    }

    pub(crate) fn spawn_catalog(&self) -> Result<SpawnCatalog> {
        SpawnCatalog::new(self.templates.iter().cloned(), self.regions.clone())
            .context("invalid spawn templates")
    }

    pub(crate) fn item_catalog(&self) -> ItemCatalog {
        ItemCatalog::new(self.items.clone())
    }

    /// Looks up a stage by name.
    pub(crate) fn stage(&self, name: &str) -> Result<&StageInfo> {
        match self.stages.iter().find(|stage| stage.name == name) {
            Some(stage) => Ok(stage),
            None => {
                let known: Vec<&str> = self.stages.iter().map(|stage| stage.name.as_str()).collect();
                bail!("unknown stage `{name}`; available stages: {known:?}")
            }
        }
    }
}

fn seconds(name: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("{name} is not a valid duration: {value}"))
}
