#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns enemy deaths into item drops.

use arena_core::{Command, Event, ItemCatalog, ItemKindId, RandomSource};

/// Loot system that drops one uniformly chosen item per enemy death.
#[derive(Debug)]
pub struct Loot<R> {
    drop_table: Vec<ItemKindId>,
    random: R,
}

impl<R: RandomSource> Loot<R> {
    /// Creates a loot system whose drop table covers the whole catalog.
    #[must_use]
    pub fn new(catalog: &ItemCatalog, random: R) -> Self {
        Self {
            drop_table: catalog.iter().map(|(kind, _)| kind).collect(),
            random,
        }
    }

    /// Emits `Command::DropItem` at the last position of every enemy that died.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            let Event::EnemyDied {
                enemy, position, ..
            } = event
            else {
                continue;
            };

            if self.drop_table.is_empty() {
                tracing::warn!(enemy = enemy.get(), "drop skipped: item catalog is empty");
                continue;
            }

            let kind = self.drop_table[self.random.index(self.drop_table.len())];
            out.push(Command::DropItem {
                kind,
                position: *position,
            });
        }
    }
}
