//! Stat table owned by the controlled entity.

use std::collections::BTreeMap;

use arena_core::{ModifierId, StatEntry, StatKind, StatModifier};

/// Temporary adjustment currently applied to a stat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveModifier {
    /// Stat the modifier adjusts.
    pub kind: StatKind,
    /// Delta contributed to the effective value.
    pub amount: f32,
    /// Reversal unit recorded when the modifier was applied.
    pub magnitude: f32,
}

/// Base stat values plus the temporary modifiers layered on top of them.
///
/// Permanent modifications are folded into the base value and cannot be
/// undone. Temporary modifications are tracked individually and stay active
/// until [`StatTable::revert`] is called; the table never expires them on
/// its own.
#[derive(Clone, Debug, Default)]
pub struct StatTable {
    base: BTreeMap<StatKind, f32>,
    modifiers: BTreeMap<ModifierId, ActiveModifier>,
    next_modifier: u32,
}

impl StatTable {
    /// Creates a table with every stat at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from a stat sheet. Later entries for a stat win.
    #[must_use]
    pub fn from_entries(entries: &[StatEntry]) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.set_base(entry.kind, entry.value);
        }
        table
    }

    /// Base value of the stat, excluding temporary modifiers.
    #[must_use]
    pub fn base_value(&self, kind: StatKind) -> f32 {
        self.base.get(&kind).copied().unwrap_or(0.0)
    }

    /// Base value plus the sum of active modifier amounts for the stat.
    #[must_use]
    pub fn effective_value(&self, kind: StatKind) -> f32 {
        self.modifiers
            .values()
            .filter(|modifier| modifier.kind == kind)
            .fold(self.base_value(kind), |total, modifier| {
                total + modifier.amount
            })
    }

    /// Applies an additive adjustment to the stat.
    ///
    /// Permanent adjustments return `None`. Temporary adjustments return the
    /// handle the caller must later pass to [`StatTable::revert`].
    pub fn modify(
        &mut self,
        kind: StatKind,
        amount: f32,
        permanent: bool,
        magnitude: f32,
    ) -> Option<ModifierId> {
        if permanent {
            self.set_base(kind, self.base_value(kind) + amount);
            return None;
        }

        let id = ModifierId::new(self.next_modifier);
        self.next_modifier = self.next_modifier.wrapping_add(1);
        let _ = self.modifiers.insert(
            id,
            ActiveModifier {
                kind,
                amount,
                magnitude,
            },
        );
        Some(id)
    }

    /// Applies a [`StatModifier`] using its own fields.
    pub fn apply(&mut self, modifier: StatModifier) -> Option<ModifierId> {
        self.modify(
            modifier.kind,
            modifier.amount,
            modifier.permanent,
            modifier.magnitude,
        )
    }

    /// Removes a temporary modifier, returning it when it was active.
    pub fn revert(&mut self, id: ModifierId) -> Option<ActiveModifier> {
        self.modifiers.remove(&id)
    }

    /// Looks up an active temporary modifier.
    #[must_use]
    pub fn modifier(&self, id: ModifierId) -> Option<&ActiveModifier> {
        self.modifiers.get(&id)
    }

    /// Iterates over active temporary modifiers in handle order.
    pub fn active_modifiers(&self) -> impl Iterator<Item = (ModifierId, &ActiveModifier)> {
        self.modifiers.iter().map(|(id, modifier)| (*id, modifier))
    }

    fn set_base(&mut self, kind: StatKind, value: f32) {
        let value = match kind {
            StatKind::Health => value.max(0.0),
            StatKind::Speed | StatKind::ProjectileCount => value,
        };
        let _ = self.base.insert(kind, value);
    }
}
