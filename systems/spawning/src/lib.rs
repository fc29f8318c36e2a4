#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-paced spawning system responsible for emitting enemy spawn commands.
//!
//! The [`WaveScheduler`] turns a wave or stage request into a queue of steps
//! separated by explicit waits. Waits are consumed from the `dt` carried by
//! [`Event::TimeAdvanced`]; whatever becomes due is emitted as [`Command`]
//! values for the world to apply.

mod catalog;

use std::{collections::VecDeque, time::Duration};

use arena_core::{Command, Event, RandomSource, StageProgress, TemplateId};

pub use catalog::{CatalogError, SpawnCatalog};

const DEFAULT_TIME_BETWEEN_SPAWNS: Duration = Duration::from_millis(200);
const DEFAULT_TIME_BETWEEN_WAVES: Duration = Duration::from_secs(1);

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    time_between_spawns: Duration,
    time_between_waves: Duration,
}

impl Config {
    /// Creates a new configuration from the spawn and wave pacing delays.
    #[must_use]
    pub const fn new(time_between_spawns: Duration, time_between_waves: Duration) -> Self {
        Self {
            time_between_spawns,
            time_between_waves,
        }
    }

    /// Delay preceding every spawn of a wave and every group of a stage.
    #[must_use]
    pub const fn time_between_spawns(&self) -> Duration {
        self.time_between_spawns
    }

    /// Delay between a start request and the first spawn delay.
    #[must_use]
    pub const fn time_between_waves(&self) -> Duration {
        self.time_between_waves
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_BETWEEN_SPAWNS, DEFAULT_TIME_BETWEEN_WAVES)
    }
}

/// Errors that abort a scripted stage before anything is scheduled.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// The progress cursor points past the stage's last wave.
    #[error("stage `{stage}` has no wave {index} ({waves} defined)")]
    WaveOutOfRange {
        /// Name of the stage.
        stage: String,
        /// Requested wave index.
        index: usize,
        /// Number of waves the stage defines.
        waves: usize,
    },
    /// A monster group or boss names a template missing from the catalog.
    #[error("spawn template `{key}` is not in the catalog")]
    UnknownTemplate {
        /// Key that failed to resolve.
        key: String,
    },
}

/// Observable scheduler state.
///
/// Completion is transient: the step that completes a run reports it to the
/// world and leaves the scheduler idle within the same call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Nothing is scheduled.
    Idle,
    /// A wave or stage run still has pending steps.
    Running,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Wait(Duration),
    RandomSpawns { remaining: u32 },
    SpawnRandom,
    SpawnGroup { template: TemplateId, count: u32 },
    ShakeCamera,
    SpawnBoss { template: TemplateId },
    Complete,
}

/// Cooperative state machine that issues spawn commands over time.
#[derive(Debug)]
pub struct WaveScheduler<R> {
    config: Config,
    catalog: SpawnCatalog,
    random: R,
    steps: VecDeque<Step>,
}

impl<R: RandomSource> WaveScheduler<R> {
    /// Creates an idle scheduler drawing templates and regions from `catalog`.
    #[must_use]
    pub fn new(config: Config, catalog: SpawnCatalog, random: R) -> Self {
        Self {
            config,
            catalog,
            random,
            steps: VecDeque::new(),
        }
    }

    /// Catalog the scheduler spawns from.
    #[must_use]
    pub fn catalog(&self) -> &SpawnCatalog {
        &self.catalog
    }

    /// Current state of the scheduler.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        if self.steps.is_empty() {
            SchedulerState::Idle
        } else {
            SchedulerState::Running
        }
    }

    /// Number of spawn actions still scheduled for the current run.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.steps
            .iter()
            .map(|step| match step {
                Step::RandomSpawns { remaining } => *remaining as usize,
                Step::SpawnGroup { count, .. } => *count as usize,
                Step::SpawnRandom | Step::SpawnBoss { .. } => 1,
                Step::Wait(_) | Step::ShakeCamera | Step::Complete => 0,
            })
            .sum()
    }

    /// Starts a flat wave of `count` random enemies, replacing any run in flight.
    ///
    /// A negative count reports the end of the wave sequence without spawning
    /// and leaves a run in flight untouched.
    pub fn start_wave(&mut self, count: i32, out: &mut Vec<Command>) {
        let Ok(count) = u32::try_from(count) else {
            tracing::debug!(count, "negative wave count, ending wave sequence");
            out.push(Command::EndWaveSequence);
            return;
        };
        self.cancel();

        self.steps
            .push_back(Step::Wait(self.config.time_between_waves));
        self.steps.push_back(Step::RandomSpawns { remaining: count });
        self.steps.push_back(Step::Complete);
        tracing::debug!(count, "wave started");
        out.push(Command::BeginIssuance);
    }

    /// Starts the stage wave the progress cursor points at, replacing any run
    /// in flight.
    ///
    /// Every template key is resolved up front. A missing wave or template
    /// aborts the stage and leaves the scheduler idle.
    pub fn start_stage(
        &mut self,
        progress: &StageProgress,
        out: &mut Vec<Command>,
    ) -> Result<(), SchedulerError> {
        self.cancel();

        let stage = progress.stage();
        let index = progress.current_wave_index();
        let wave = progress
            .current_wave()
            .ok_or_else(|| SchedulerError::WaveOutOfRange {
                stage: stage.name.clone(),
                index,
                waves: stage.waves.len(),
            })?;

        let mut plan = VecDeque::with_capacity(wave.monster_groups.len() * 2 + 5);
        plan.push_back(Step::Wait(self.config.time_between_waves));
        for group in &wave.monster_groups {
            let template = self.resolve(&group.template_key)?;
            plan.push_back(Step::Wait(self.config.time_between_spawns));
            plan.push_back(Step::SpawnGroup {
                template,
                count: group.spawn_count,
            });
        }
        if let Some(boss) = &wave.boss {
            let template = self.resolve(boss)?;
            plan.push_back(Step::Wait(self.config.time_between_spawns));
            plan.push_back(Step::ShakeCamera);
            plan.push_back(Step::SpawnBoss { template });
        }
        plan.push_back(Step::Complete);

        self.steps = plan;
        tracing::debug!(stage = %stage.name, wave = index, "stage wave started");
        out.push(Command::BeginIssuance);
        Ok(())
    }

    /// Discards every pending step. Spawned enemies are left untouched.
    pub fn stop_wave(&mut self) {
        if !self.steps.is_empty() {
            tracing::debug!(pending = self.pending_spawns(), "wave stopped");
        }
        self.cancel();
    }

    /// Consumes events and emits the spawn commands that became due.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if self.steps.is_empty() {
            return;
        }

        let mut observed = false;
        let mut budget = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                observed = true;
                budget = budget.saturating_add(*dt);
            }
        }

        if observed {
            self.advance(budget, out);
        }
    }

    fn advance(&mut self, mut budget: Duration, out: &mut Vec<Command>) {
        while let Some(step) = self.steps.pop_front() {
            match step {
                Step::Wait(remaining) => {
                    if budget < remaining {
                        self.steps.push_front(Step::Wait(remaining - budget));
                        return;
                    }
                    budget -= remaining;
                }
                Step::RandomSpawns { remaining } => {
                    if remaining == 0 {
                        continue;
                    }
                    self.steps.push_front(Step::RandomSpawns {
                        remaining: remaining - 1,
                    });
                    self.steps.push_front(Step::SpawnRandom);
                    self.steps
                        .push_front(Step::Wait(self.config.time_between_spawns));
                }
                Step::SpawnRandom => self.spawn_random(out),
                Step::SpawnGroup { template, count } => {
                    for _ in 0..count {
                        self.spawn(template, out);
                    }
                }
                Step::ShakeCamera => out.push(Command::ShakeCamera),
                Step::SpawnBoss { template } => self.spawn(template, out),
                Step::Complete => {
                    tracing::debug!("issuance complete");
                    out.push(Command::CompleteIssuance);
                }
            }
        }
    }

    fn spawn_random(&mut self, out: &mut Vec<Command>) {
        if self.catalog.regions().is_empty() {
            tracing::warn!("spawn skipped: no spawn regions configured");
            return;
        }
        let Some(template) = self.catalog.random_template(&mut self.random) else {
            tracing::warn!("spawn skipped: no spawn templates configured");
            return;
        };
        self.spawn(template, out);
    }

    fn spawn(&mut self, template: TemplateId, out: &mut Vec<Command>) {
        let Some(position) = self.catalog.random_position(&mut self.random) else {
            tracing::warn!("spawn skipped: no spawn regions configured");
            return;
        };
        out.push(Command::SpawnEnemy { template, position });
    }

    fn resolve(&self, key: &str) -> Result<TemplateId, SchedulerError> {
        self.catalog
            .resolve(key)
            .ok_or_else(|| SchedulerError::UnknownTemplate {
                key: key.to_owned(),
            })
    }

    fn cancel(&mut self) {
        self.steps.clear();
    }
}
