#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Arena Siege engine.
//!
//! This crate defines the message surface that connects the orchestrator, the
//! authoritative world, and pure systems. Callers submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams and respond exclusively with new
//! command batches. Events that concern the surrounding game are routed to an
//! [`Orchestrator`] through [`notify`].

mod random;

pub use random::{RandomSource, SeededRandom};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Opens a new spawn run, resetting issuance and clear bookkeeping.
    BeginIssuance,
    /// Marks that every spawn of the current run has been issued.
    CompleteIssuance,
    /// Reports the end of the wave sequence without touching the run in flight.
    EndWaveSequence,
    /// Requests that an enemy built from the template appear at the position.
    SpawnEnemy {
        /// Template the enemy is instantiated from.
        template: TemplateId,
        /// Arena position the enemy appears at.
        position: WorldPoint,
    },
    /// Requests the cosmetic cue that precedes a boss.
    ShakeCamera,
    /// Reports that an enemy died.
    KillEnemy {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
    },
    /// Requests that an item be dropped into the arena.
    DropItem {
        /// Catalog entry describing the dropped item.
        kind: ItemKindId,
        /// Arena position the item lands at.
        position: WorldPoint,
    },
    /// Reports that the player touched a dropped item.
    CollectItem {
        /// Identifier of the touched item.
        item: ItemId,
    },
    /// Applies a modifier directly to the player's stat table.
    ModifyStat {
        /// Modifier to apply.
        modifier: StatModifier,
    },
    /// Removes a temporary modifier from the player's stat table.
    RevertModifier {
        /// Handle returned when the modifier was applied.
        modifier: ModifierId,
    },
    /// Reports that the player took damage.
    DamagePlayer {
        /// Health subtracted from the player.
        amount: f32,
    },
    /// Reports that the player died.
    KillPlayer,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy joined the population.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Template the enemy was built from.
        template: TemplateId,
        /// Position the enemy appeared at.
        position: WorldPoint,
    },
    /// Confirms that an enemy left the population.
    EnemyDied {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
        /// Template the enemy was built from.
        template: TemplateId,
        /// Last known position of the enemy.
        position: WorldPoint,
    },
    /// Confirms that an item landed in the arena.
    ItemDropped {
        /// Identifier assigned to the dropped item.
        item: ItemId,
        /// Catalog entry describing the item.
        kind: ItemKindId,
        /// Position the item landed at.
        position: WorldPoint,
    },
    /// Confirms that the player consumed an item.
    ItemCollected {
        /// Identifier of the consumed item.
        item: ItemId,
        /// Catalog entry describing the item.
        kind: ItemKindId,
    },
    /// Reports that one of the player's stats changed.
    StatModified {
        /// Stat that changed.
        kind: StatKind,
        /// Handle of the temporary modifier, absent for permanent changes.
        modifier: Option<ModifierId>,
        /// Reversal unit recorded for the modification.
        magnitude: f32,
        /// Effective value of the stat after the change.
        effective: f32,
    },
    /// Reports that a temporary modifier was removed.
    ModifierReverted {
        /// Handle of the removed modifier.
        modifier: ModifierId,
        /// Stat the modifier adjusted.
        kind: StatKind,
        /// Effective value of the stat after removal.
        effective: f32,
    },
    /// Signals that a boss is imminent.
    CameraShakeRequested,
    /// Signals that the current wave or stage run is over.
    WaveSequenceEnded,
    /// Signals that the player died.
    PlayerDied,
}

/// Callbacks the core invokes on the surrounding game.
pub trait Orchestrator {
    /// Called once a run is cleared or a wave request had nothing to spawn.
    fn wave_sequence_ended(&mut self);

    /// Called right before a boss spawns.
    fn camera_shake(&mut self);

    /// Called once when the player dies.
    fn player_died(&mut self);
}

/// Routes orchestrator-facing events to the provided callbacks in order.
pub fn notify<O: Orchestrator + ?Sized>(events: &[Event], orchestrator: &mut O) {
    for event in events {
        match event {
            Event::WaveSequenceEnded => orchestrator.wave_sequence_ended(),
            Event::CameraShakeRequested => orchestrator.camera_shake(),
            Event::PlayerDied => orchestrator.player_died(),
            _ => {}
        }
    }
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

identifier!(
    /// Unique identifier assigned to a spawned enemy.
    EnemyId
);
identifier!(
    /// Unique identifier assigned to an item lying in the arena.
    ItemId
);
identifier!(
    /// Index of a spawn template within the spawn catalog.
    TemplateId
);
identifier!(
    /// Index of an item definition within the item catalog.
    ItemKindId
);
identifier!(
    /// Handle of a temporary stat modifier.
    ModifierId
);

/// Position inside the arena expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Axis-aligned rectangle from which spawn positions are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RegionBounds")]
pub struct SpawnRegion {
    x_min: f32,
    x_max: f32,
    y_min: f32,
    y_max: f32,
}

impl SpawnRegion {
    /// Creates a region, swapping bounds that were supplied in reverse.
    #[must_use]
    pub fn new(x_min: f32, x_max: f32, y_min: f32, y_max: f32) -> Self {
        Self {
            x_min: x_min.min(x_max),
            x_max: x_min.max(x_max),
            y_min: y_min.min(y_max),
            y_max: y_min.max(y_max),
        }
    }

    /// Smallest horizontal coordinate inside the region.
    #[must_use]
    pub const fn x_min(&self) -> f32 {
        self.x_min
    }

    /// Largest horizontal coordinate inside the region.
    #[must_use]
    pub const fn x_max(&self) -> f32 {
        self.x_max
    }

    /// Smallest vertical coordinate inside the region.
    #[must_use]
    pub const fn y_min(&self) -> f32 {
        self.y_min
    }

    /// Largest vertical coordinate inside the region.
    #[must_use]
    pub const fn y_max(&self) -> f32 {
        self.y_max
    }

    /// Reports whether the point lies inside the region, bounds included.
    #[must_use]
    pub fn contains(&self, point: WorldPoint) -> bool {
        (self.x_min..=self.x_max).contains(&point.x())
            && (self.y_min..=self.y_max).contains(&point.y())
    }

    /// Draws a uniformly distributed point inside the region.
    pub fn sample(&self, random: &mut impl RandomSource) -> WorldPoint {
        WorldPoint::new(
            random.between(self.x_min, self.x_max),
            random.between(self.y_min, self.y_max),
        )
    }
}

#[derive(Deserialize)]
struct RegionBounds {
    x_min: f32,
    x_max: f32,
    y_min: f32,
    y_max: f32,
}

impl From<RegionBounds> for SpawnRegion {
    fn from(bounds: RegionBounds) -> Self {
        Self::new(bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max)
    }
}

/// Stats tracked for the controlled entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    /// Remaining hit points.
    Health,
    /// Movement speed.
    Speed,
    /// Number of projectiles fired per attack.
    ProjectileCount,
}

impl StatKind {
    /// Every stat kind in declaration order.
    pub const ALL: [StatKind; 3] = [Self::Health, Self::Speed, Self::ProjectileCount];
}

/// Single stat value, used for starting stat sheets and item payloads.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    /// Stat the value applies to.
    pub kind: StatKind,
    /// Numeric value of the entry.
    pub value: f32,
}

impl StatEntry {
    /// Creates a new stat entry.
    #[must_use]
    pub const fn new(kind: StatKind, value: f32) -> Self {
        Self { kind, value }
    }
}

/// Starting stat sheet of the controlled entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSheet {
    /// Display name of the character.
    pub name: String,
    /// Base values the stat table starts from.
    #[serde(default)]
    pub stats: Vec<StatEntry>,
}

/// Additive adjustment applied to a stat table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    /// Stat the modifier adjusts.
    pub kind: StatKind,
    /// Delta added to the stat.
    pub amount: f32,
    /// Whether the delta is folded into the base value.
    pub permanent: bool,
    /// Reversal unit recorded alongside temporary modifiers.
    pub magnitude: f32,
}

impl StatModifier {
    /// Creates a modifier that is folded into the base value.
    #[must_use]
    pub const fn permanent(kind: StatKind, amount: f32) -> Self {
        Self {
            kind,
            amount,
            permanent: true,
            magnitude: amount,
        }
    }

    /// Creates a removable modifier.
    #[must_use]
    pub const fn temporary(kind: StatKind, amount: f32, magnitude: f32) -> Self {
        Self {
            kind,
            amount,
            permanent: false,
            magnitude,
        }
    }
}

/// Item that can drop from enemies and be consumed by the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Display name of the item.
    pub name: String,
    /// Stat payload applied on pickup.
    pub stats: Vec<StatEntry>,
    /// Whether the payload is applied as temporary modifiers.
    #[serde(default)]
    pub temporary: bool,
}

impl ItemDefinition {
    /// Expands the payload into modifiers.
    ///
    /// Each entry's value doubles as the modifier amount and its reversal
    /// magnitude; temporary items yield removable modifiers.
    pub fn modifiers(&self) -> impl Iterator<Item = StatModifier> + '_ {
        self.stats.iter().map(|entry| StatModifier {
            kind: entry.kind,
            amount: entry.value,
            permanent: !self.temporary,
            magnitude: entry.value,
        })
    }
}

/// Ordered collection of item definitions, also used as the drop table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemCatalog {
    items: Vec<ItemDefinition>,
}

impl ItemCatalog {
    /// Creates a catalog from definitions; positions become [`ItemKindId`]s.
    #[must_use]
    pub fn new(items: Vec<ItemDefinition>) -> Self {
        Self { items }
    }

    /// Looks up the definition registered under the identifier.
    #[must_use]
    pub fn get(&self, kind: ItemKindId) -> Option<&ItemDefinition> {
        usize::try_from(kind.get())
            .ok()
            .and_then(|index| self.items.get(index))
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Reports whether the catalog holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over definitions alongside their identifiers.
    pub fn iter(&self) -> impl Iterator<Item = (ItemKindId, &ItemDefinition)> {
        self.items
            .iter()
            .enumerate()
            .map_while(|(index, item)| {
                u32::try_from(index)
                    .ok()
                    .map(|raw| (ItemKindId::new(raw), item))
            })
    }
}

/// Batch of one monster type within a scripted wave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterSpawnGroup {
    /// Catalog key of the monster template.
    pub template_key: String,
    /// Number of monsters spawned together.
    pub spawn_count: u32,
}

/// Scripted wave composed of ordered monster groups and an optional boss.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageWaveDefinition {
    /// Groups spawned in order.
    #[serde(default)]
    pub monster_groups: Vec<MonsterSpawnGroup>,
    /// Catalog key of the boss spawned after the last group.
    #[serde(default)]
    pub boss: Option<String>,
}

impl StageWaveDefinition {
    /// Reports whether the wave ends with a boss.
    #[must_use]
    pub fn has_boss(&self) -> bool {
        self.boss.is_some()
    }

    /// Total number of spawns the wave issues, boss included.
    #[must_use]
    pub fn total_spawns(&self) -> u32 {
        let groups: u32 = self
            .monster_groups
            .iter()
            .map(|group| group.spawn_count)
            .fold(0, u32::saturating_add);
        groups.saturating_add(u32::from(self.has_boss()))
    }
}

/// Named sequence of scripted waves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInfo {
    /// Name the stage is selected by.
    pub name: String,
    /// Waves played in order.
    pub waves: Vec<StageWaveDefinition>,
}

/// Orchestrator-owned cursor into a stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageProgress {
    stage: StageInfo,
    current_wave: usize,
}

impl StageProgress {
    /// Starts a cursor at the first wave of the stage.
    #[must_use]
    pub fn new(stage: StageInfo) -> Self {
        Self::at_wave(stage, 0)
    }

    /// Starts a cursor at an explicit wave index.
    #[must_use]
    pub fn at_wave(stage: StageInfo, current_wave: usize) -> Self {
        Self {
            stage,
            current_wave,
        }
    }

    /// Stage the cursor walks through.
    #[must_use]
    pub fn stage(&self) -> &StageInfo {
        &self.stage
    }

    /// Index of the wave that the next stage run plays.
    #[must_use]
    pub const fn current_wave_index(&self) -> usize {
        self.current_wave
    }

    /// Definition of the wave that the next stage run plays.
    #[must_use]
    pub fn current_wave(&self) -> Option<&StageWaveDefinition> {
        self.stage.waves.get(self.current_wave)
    }

    /// Reports whether the cursor sits on the stage's last wave.
    #[must_use]
    pub fn is_final_wave(&self) -> bool {
        self.current_wave.saturating_add(1) >= self.stage.waves.len()
    }

    /// Moves to the next wave, returning `false` when none is left.
    pub fn advance(&mut self) -> bool {
        if self.is_final_wave() {
            return false;
        }
        self.current_wave += 1;
        true
    }
}
