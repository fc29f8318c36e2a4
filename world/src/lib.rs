#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Arena Siege.

mod items;
mod player;
mod population;
pub mod stats;

use std::time::Duration;

use arena_core::{Command, Event, ItemCatalog, PlayerSheet};

pub use items::DroppedItem;
pub use player::Player;
pub use population::{Enemy, EntityPopulation};

use items::DroppedItems;

/// Represents the authoritative Arena Siege world state.
#[derive(Debug)]
pub struct World {
    population: EntityPopulation,
    items: DroppedItems,
    catalog: ItemCatalog,
    player: Player,
    elapsed: Duration,
}

impl World {
    /// Creates a world with a living player and an empty arena.
    #[must_use]
    pub fn new(sheet: &PlayerSheet, catalog: ItemCatalog) -> Self {
        Self {
            population: EntityPopulation::new(),
            items: DroppedItems::default(),
            catalog,
            player: Player::from_sheet(sheet),
            elapsed: Duration::ZERO,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::BeginIssuance => world.population.begin_issuance(),
        Command::CompleteIssuance => {
            if world.population.complete_issuance() {
                tracing::debug!("run cleared as issuance completed");
                out_events.push(Event::WaveSequenceEnded);
            }
        }
        Command::EndWaveSequence => out_events.push(Event::WaveSequenceEnded),
        Command::SpawnEnemy { template, position } => {
            let enemy = world.population.register(template, position);
            out_events.push(Event::EnemySpawned {
                enemy,
                template,
                position,
            });
        }
        Command::ShakeCamera => out_events.push(Event::CameraShakeRequested),
        Command::KillEnemy { enemy } => {
            let Some(removed) = world.population.remove(enemy) else {
                return;
            };
            out_events.push(Event::EnemyDied {
                enemy: removed.id,
                template: removed.template,
                position: removed.position,
            });
            if world.population.take_clear() {
                tracing::debug!(enemy = enemy.get(), "run cleared by last death");
                out_events.push(Event::WaveSequenceEnded);
            }
        }
        Command::DropItem { kind, position } => {
            if world.catalog.get(kind).is_none() {
                tracing::warn!(kind = kind.get(), "ignoring drop of unknown item kind");
                return;
            }
            let item = world.items.insert(kind, position);
            out_events.push(Event::ItemDropped {
                item,
                kind,
                position,
            });
        }
        Command::CollectItem { item } => {
            if !world.player.is_alive() {
                return;
            }
            let Some(dropped) = world.items.remove(item) else {
                return;
            };
            if let Some(definition) = world.catalog.get(dropped.kind) {
                world.player.consume(definition, out_events);
            }
            out_events.push(Event::ItemCollected {
                item,
                kind: dropped.kind,
            });
        }
        Command::ModifyStat { modifier } => {
            if world.player.is_alive() {
                world.player.apply(modifier, out_events);
            }
        }
        Command::RevertModifier { modifier } => world.player.revert(modifier, out_events),
        Command::DamagePlayer { amount } => {
            if world.player.is_alive() {
                world.player.damage(amount, out_events);
            }
        }
        Command::KillPlayer => world.player.kill(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use arena_core::{ItemCatalog, StatKind};

    use super::{DroppedItem, Enemy, EntityPopulation, Player, World};

    /// Provides read-only access to the alive enemies and run bookkeeping.
    #[must_use]
    pub fn population(world: &World) -> &EntityPopulation {
        &world.population
    }

    /// Captures the alive enemies in identifier order.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<Enemy> {
        world.population.iter().copied().collect()
    }

    /// Captures the items lying in the arena in identifier order.
    #[must_use]
    pub fn dropped_items(world: &World) -> Vec<DroppedItem> {
        world.items.iter().copied().collect()
    }

    /// Provides read-only access to the item catalog used for drops.
    #[must_use]
    pub fn item_catalog(world: &World) -> &ItemCatalog {
        &world.catalog
    }

    /// Provides read-only access to the controlled entity.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Effective value of one of the player's stats.
    #[must_use]
    pub fn stat_value(world: &World, kind: StatKind) -> f32 {
        world.player.stats().effective_value(kind)
    }

    /// Total simulated time applied to the world.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }
}
