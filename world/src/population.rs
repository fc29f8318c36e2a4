//! Bookkeeping for the enemies currently alive in the arena.

use std::collections::BTreeMap;

use arena_core::{EnemyId, TemplateId, WorldPoint};

/// Enemy registered in the population.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Enemy {
    /// Identifier allocated when the enemy spawned.
    pub id: EnemyId,
    /// Template the enemy was built from.
    pub template: TemplateId,
    /// Last known position of the enemy.
    pub position: WorldPoint,
}

/// Alive enemies plus the issuance state of the current spawn run.
///
/// Issuance completion and population emptiness are tracked independently.
/// A run is cleared exactly once, at the moment the second of the two
/// conditions becomes true.
#[derive(Debug, Default)]
pub struct EntityPopulation {
    alive: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: u32,
    issuance_complete: bool,
    clear_reported: bool,
}

impl EntityPopulation {
    /// Creates an empty population with no run in progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a freshly spawned enemy and returns its identifier.
    pub fn register(&mut self, template: TemplateId, position: WorldPoint) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        let _ = self.alive.insert(
            id,
            Enemy {
                id,
                template,
                position,
            },
        );
        id
    }

    /// Removes an enemy. Unknown identifiers are ignored.
    pub fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        self.alive.remove(&id)
    }

    /// Number of alive enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    /// Reports whether no enemy is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Iterates over alive enemies in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.alive.values()
    }

    /// Reports whether every spawn of the current run has been issued.
    #[must_use]
    pub const fn issuance_complete(&self) -> bool {
        self.issuance_complete
    }

    /// Opens a new run. Enemies left over from earlier runs stay alive.
    pub fn begin_issuance(&mut self) {
        self.issuance_complete = false;
        self.clear_reported = false;
    }

    /// Marks the run's issuance complete, returning `true` when the run is
    /// cleared right away because nothing is alive.
    pub fn complete_issuance(&mut self) -> bool {
        self.issuance_complete = true;
        self.take_clear()
    }

    /// Returns `true` once when the run has become cleared.
    pub fn take_clear(&mut self) -> bool {
        if !self.issuance_complete || self.clear_reported || !self.alive.is_empty() {
            return false;
        }
        self.clear_reported = true;
        true
    }
}
