//! Items lying in the arena waiting to be picked up.

use std::collections::BTreeMap;

use arena_core::{ItemId, ItemKindId, WorldPoint};

/// Item dropped into the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DroppedItem {
    /// Identifier allocated when the item dropped.
    pub id: ItemId,
    /// Catalog entry describing the item.
    pub kind: ItemKindId,
    /// Position the item lies at.
    pub position: WorldPoint,
}

/// Registry that stores dropped items and manages identifier allocation.
#[derive(Debug, Default)]
pub(crate) struct DroppedItems {
    entries: BTreeMap<ItemId, DroppedItem>,
    next_item_id: u32,
}

impl DroppedItems {
    pub(crate) fn insert(&mut self, kind: ItemKindId, position: WorldPoint) -> ItemId {
        let id = ItemId::new(self.next_item_id);
        self.next_item_id = self.next_item_id.wrapping_add(1);
        let _ = self
            .entries
            .insert(id, DroppedItem { id, kind, position });
        id
    }

    pub(crate) fn remove(&mut self, id: ItemId) -> Option<DroppedItem> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &DroppedItem> {
        self.entries.values()
    }
}
