//! Headless driver that plays waves and stages against the world.
//!
//! The driver stands in for the game around the core: it ticks time, kills
//! enemies at a fixed cadence, walks over every dropped item and advances
//! stage progress when a run is cleared.

use std::{collections::BTreeMap, fmt, time::Duration};

use anyhow::{Context, Result};
use arena_core::{
    notify, Command, Event, Orchestrator, SeededRandom, StageProgress, StatEntry, StatKind,
};
use arena_system_loot::Loot;
use arena_system_modifier_expiry::ModifierExpiry;
use arena_system_spawning::WaveScheduler;
use arena_world::{self as world, query, World};
use serde::Serialize;

use crate::config::ArenaConfig;

const LOOT_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// What the simulation is asked to play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    /// A single randomized wave of the given size.
    Wave(i32),
    /// Every wave of the named stage, in order.
    Stage(String),
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wave(count) => write!(f, "wave of {count}"),
            Self::Stage(name) => write!(f, "stage `{name}`"),
        }
    }
}

/// Knobs controlling the driver itself rather than the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) seed: u64,
    pub(crate) tick: Duration,
    pub(crate) tick_limit: u32,
    /// Ticks between two kills; zero disables killing.
    pub(crate) kill_every: u32,
    /// Health lost per alive enemy per simulated second.
    pub(crate) contact_damage: f32,
}

/// Counters reported once the run is over.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub(crate) struct RunSummary {
    pub(crate) mode: String,
    pub(crate) seed: u64,
    pub(crate) completed: bool,
    pub(crate) ticks: u32,
    pub(crate) elapsed_seconds: f64,
    pub(crate) waves_cleared: u32,
    pub(crate) enemies_spawned: u32,
    pub(crate) enemies_killed: u32,
    pub(crate) enemies_remaining: usize,
    pub(crate) kills_by_template: BTreeMap<String, u32>,
    pub(crate) camera_shakes: u32,
    pub(crate) items_dropped: u32,
    pub(crate) items_collected: u32,
    pub(crate) modifiers_expired: u32,
    pub(crate) player: String,
    pub(crate) player_alive: bool,
    pub(crate) player_stats: Vec<StatEntry>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if !self.player_alive {
            "player died"
        } else if self.completed {
            "completed"
        } else {
            "tick limit reached"
        };
        writeln!(f, "{} (seed {}): {outcome}", self.mode, self.seed)?;
        writeln!(
            f,
            "  {} ticks, {:.2}s simulated, {} wave(s) cleared",
            self.ticks, self.elapsed_seconds, self.waves_cleared
        )?;
        writeln!(
            f,
            "  enemies: {} spawned, {} killed, {} remaining",
            self.enemies_spawned, self.enemies_killed, self.enemies_remaining
        )?;
        for (template, kills) in &self.kills_by_template {
            writeln!(f, "    {template}: {kills} killed")?;
        }
        writeln!(
            f,
            "  items: {} dropped, {} collected, {} modifier(s) expired",
            self.items_dropped, self.items_collected, self.modifiers_expired
        )?;
        writeln!(f, "  camera shakes: {}", self.camera_shakes)?;
        writeln!(f, "  player `{}`:", self.player)?;
        for entry in &self.player_stats {
            writeln!(f, "    {:?}: {:.2}", entry.kind, entry.value)?;
        }
        Ok(())
    }
}

/// World plus every system, pumped until commands settle.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    scheduler: WaveScheduler<SeededRandom>,
    loot: Loot<SeededRandom>,
    expiry: ModifierExpiry,
    settings: Settings,
    progress: Option<StageProgress>,
    sequence_ended: bool,
    summary: RunSummary,
}

impl Simulation {
    pub(crate) fn new(arena: &ArenaConfig, settings: Settings) -> Result<Self> {
        let items = arena.item_catalog();
        Ok(Self {
            scheduler: WaveScheduler::new(
                arena.spawn_config()?,
                arena.spawn_catalog()?,
                SeededRandom::seeded(settings.seed),
            ),
            loot: Loot::new(&items, SeededRandom::seeded(settings.seed ^ LOOT_STREAM)),
            expiry: ModifierExpiry::new(arena.expiry_config()?),
            world: World::new(&arena.player, items),
            settings,
            progress: None,
            sequence_ended: false,
            summary: RunSummary {
                seed: settings.seed,
                player_alive: true,
                ..RunSummary::default()
            },
        })
    }

    /// Plays the requested mode until it ends, the player dies or the tick
    /// limit is hit.
    pub(crate) fn run(mut self, arena: &ArenaConfig, mode: Mode) -> Result<RunSummary> {
        self.summary.mode = mode.to_string();
        tracing::info!(%mode, seed = self.settings.seed, "starting run");

        let mut commands = Vec::new();
        match mode {
            Mode::Wave(count) => self.scheduler.start_wave(count, &mut commands),
            Mode::Stage(name) => {
                let progress = StageProgress::new(arena.stage(&name)?.clone());
                self.scheduler
                    .start_stage(&progress, &mut commands)
                    .with_context(|| format!("failed to start stage `{name}`"))?;
                self.progress = Some(progress);
            }
        }
        self.pump(commands);

        while !self.finished() && self.summary.ticks < self.settings.tick_limit {
            self.step()?;
        }

        if !self.finished() {
            tracing::warn!(
                ticks = self.summary.ticks,
                enemies = query::population(&self.world).len(),
                "tick limit reached before the run ended"
            );
        }
        Ok(self.into_summary())
    }

    fn step(&mut self) -> Result<()> {
        self.pump(vec![Command::Tick {
            dt: self.settings.tick,
        }]);
        self.summary.ticks += 1;

        let alive = query::population(&self.world).len();
        if self.settings.contact_damage > 0.0 && alive > 0 {
            let amount =
                self.settings.contact_damage * alive as f32 * self.settings.tick.as_secs_f32();
            self.pump(vec![Command::DamagePlayer { amount }]);
        }

        let kill_every = self.settings.kill_every;
        if kill_every > 0 && self.summary.ticks % kill_every == 0 {
            let oldest = query::population(&self.world).iter().next().map(|enemy| enemy.id);
            if let Some(enemy) = oldest {
                self.pump(vec![Command::KillEnemy { enemy }]);
            }
        }

        let pickups = query::dropped_items(&self.world)
            .into_iter()
            .map(|item| Command::CollectItem { item: item.id })
            .collect();
        self.pump(pickups);

        if self.sequence_ended {
            self.sequence_ended = false;
            self.next_wave()?;
        }
        Ok(())
    }

    fn next_wave(&mut self) -> Result<()> {
        let Some(progress) = self.progress.as_mut() else {
            return Ok(());
        };
        if !progress.advance() {
            self.progress = None;
            return Ok(());
        }
        tracing::info!(
            stage = %progress.stage().name,
            wave = progress.current_wave_index(),
            "advancing to next wave"
        );
        let mut commands = Vec::new();
        self.scheduler
            .start_stage(progress, &mut commands)
            .context("failed to start next stage wave")?;
        self.pump(commands);
        Ok(())
    }

    fn finished(&self) -> bool {
        !self.summary.player_alive || self.summary.completed
    }

    fn pump(&mut self, commands: Vec<Command>) {
        let mut pending = commands;
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.scheduler.handle(&events, &mut pending);
            self.loot.handle(&events, &mut pending);
            self.expiry.handle(&events, &mut pending);
            self.record(&events);
            notify(&events, self);
        }
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            let counter = match event {
                Event::EnemySpawned { .. } => &mut self.summary.enemies_spawned,
                Event::EnemyDied { template, .. } => {
                    let key = self
                        .scheduler
                        .catalog()
                        .template_key(*template)
                        .unwrap_or("unknown");
                    *self
                        .summary
                        .kills_by_template
                        .entry(key.to_owned())
                        .or_default() += 1;
                    &mut self.summary.enemies_killed
                }
                Event::ItemDropped { .. } => &mut self.summary.items_dropped,
                Event::ItemCollected { .. } => &mut self.summary.items_collected,
                Event::ModifierReverted { .. } => &mut self.summary.modifiers_expired,
                _ => continue,
            };
            *counter += 1;
        }
    }

    fn into_summary(mut self) -> RunSummary {
        self.summary.elapsed_seconds = query::elapsed(&self.world).as_secs_f64();
        self.summary.enemies_remaining = query::population(&self.world).len();
        self.summary.player = query::player(&self.world).name().to_owned();
        self.summary.player_stats = StatKind::ALL
            .iter()
            .map(|&kind| StatEntry::new(kind, query::stat_value(&self.world, kind)))
            .collect();
        tracing::info!(
            waves = self.summary.waves_cleared,
            killed = self.summary.enemies_killed,
            "run finished"
        );
        self.summary
    }
}

impl Orchestrator for Simulation {
    fn wave_sequence_ended(&mut self) {
        self.summary.waves_cleared += 1;
        let more_waves = self
            .progress
            .as_ref()
            .is_some_and(|progress| !progress.is_final_wave());
        if more_waves {
            self.sequence_ended = true;
        } else {
            self.summary.completed = true;
        }
    }

    fn camera_shake(&mut self) {
        self.summary.camera_shakes += 1;
        tracing::info!("boss incoming");
    }

    fn player_died(&mut self) {
        self.summary.player_alive = false;
        tracing::info!(ticks = self.summary.ticks, "player died");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            seed: 7,
            tick: Duration::from_millis(100),
            tick_limit: 1_000,
            kill_every: 2,
            contact_damage: 0.0,
        }
    }

    fn play(mode: Mode, settings: Settings) -> RunSummary {
        let arena = ArenaConfig::builtin().expect("built-in arena");
        Simulation::new(&arena, settings)
            .expect("simulation")
            .run(&arena, mode)
            .expect("run")
    }

    #[test]
    fn single_wave_is_cleared() {
        let summary = play(Mode::Wave(4), settings());

        assert!(summary.completed);
        assert_eq!(summary.waves_cleared, 1);
        assert_eq!(summary.enemies_spawned, 4);
        assert_eq!(summary.enemies_killed, 4);
        assert_eq!(summary.items_dropped, 4);
        assert_eq!(summary.items_collected, 4);
        assert_eq!(summary.enemies_remaining, 0);
        assert_eq!(summary.kills_by_template.values().sum::<u32>(), 4);
        assert_eq!(summary.player, "ranger");
    }

    #[test]
    fn stage_plays_every_wave_and_shakes_before_the_boss() {
        let summary = play(Mode::Stage("meadow".to_owned()), settings());

        assert!(summary.completed);
        assert_eq!(summary.waves_cleared, 2);
        assert_eq!(summary.enemies_spawned, 5 + 3 + 1);
        assert_eq!(summary.camera_shakes, 1);
        assert_eq!(summary.kills_by_template.get("dragon"), Some(&1));
        assert_eq!(summary.kills_by_template.get("slime"), Some(&3));
    }

    #[test]
    fn negative_wave_ends_without_ticking() {
        let summary = play(Mode::Wave(-1), settings());

        assert!(summary.completed);
        assert_eq!(summary.ticks, 0);
        assert_eq!(summary.enemies_spawned, 0);
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let first = play(Mode::Wave(6), settings());
        let second = play(Mode::Wave(6), settings());

        assert_eq!(first, second);
    }

    #[test]
    fn contact_damage_can_kill_the_player() {
        let summary = play(
            Mode::Wave(5),
            Settings {
                kill_every: 0,
                contact_damage: 100.0,
                ..settings()
            },
        );

        assert!(!summary.player_alive);
        assert!(!summary.completed);
        let health = summary
            .player_stats
            .iter()
            .find(|entry| entry.kind == StatKind::Health)
            .expect("health entry");
        assert!(health.value <= 0.0);
    }

    #[test]
    fn unknown_stage_is_an_error() {
        let arena = ArenaConfig::builtin().expect("built-in arena");
        let result = Simulation::new(&arena, settings())
            .expect("simulation")
            .run(&arena, Mode::Stage("volcano".to_owned()));

        assert!(result.is_err());
    }

    #[test]
    fn tick_limit_stops_an_unfinished_run() {
        let summary = play(
            Mode::Wave(3),
            Settings {
                kill_every: 0,
                tick_limit: 30,
                ..settings()
            },
        );

        assert!(!summary.completed);
        assert_eq!(summary.ticks, 30);
        assert_eq!(summary.enemies_remaining, 3);
    }
}
