//! Controlled entity that consumes pickups and reports its own death.

use arena_core::{Event, ItemDefinition, ModifierId, PlayerSheet, StatKind, StatModifier};

use crate::stats::StatTable;

/// Player-controlled entity owning the arena's only stat table.
#[derive(Clone, Debug)]
pub struct Player {
    name: String,
    stats: StatTable,
    alive: bool,
}

impl Player {
    /// Creates a living player from its starting stat sheet.
    #[must_use]
    pub fn from_sheet(sheet: &PlayerSheet) -> Self {
        Self {
            name: sheet.name.clone(),
            stats: StatTable::from_entries(&sheet.stats),
            alive: true,
        }
    }

    /// Display name of the player.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only access to the player's stats.
    #[must_use]
    pub fn stats(&self) -> &StatTable {
        &self.stats
    }

    /// Reports whether the player is still alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    pub(crate) fn consume(&mut self, item: &ItemDefinition, out_events: &mut Vec<Event>) {
        for modifier in item.modifiers() {
            self.apply(modifier, out_events);
        }
    }

    pub(crate) fn apply(&mut self, modifier: StatModifier, out_events: &mut Vec<Event>) {
        let handle = self.stats.apply(modifier);
        out_events.push(Event::StatModified {
            kind: modifier.kind,
            modifier: handle,
            magnitude: modifier.magnitude,
            effective: self.stats.effective_value(modifier.kind),
        });
    }

    pub(crate) fn revert(&mut self, id: ModifierId, out_events: &mut Vec<Event>) {
        if let Some(reverted) = self.stats.revert(id) {
            out_events.push(Event::ModifierReverted {
                modifier: id,
                kind: reverted.kind,
                effective: self.stats.effective_value(reverted.kind),
            });
        }
    }

    pub(crate) fn damage(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        let amount = amount.max(0.0);
        self.apply(StatModifier::permanent(StatKind::Health, -amount), out_events);
        if self.stats.effective_value(StatKind::Health) <= 0.0 {
            self.kill(out_events);
        }
    }

    pub(crate) fn kill(&mut self, out_events: &mut Vec<Event>) {
        if !self.alive {
            return;
        }
        self.alive = false;
        out_events.push(Event::PlayerDied);
    }
}
