//! Floor features that are entities: clouds and item piles.

use runedeep_logic::hazards::CloudKind;
use runedeep_logic::items::Item;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cloud {
    pub kind: CloudKind,
    /// Remaining strength; the cloud disappears at zero.
    pub density: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPile {
    pub items: Vec<Item>,
}

impl ItemPile {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Add an item, merging it into a matching stack.
    pub fn push(&mut self, item: Item) {
        if let Some(stack) = self.items.iter_mut().find(|i| i.stacks_with(&item)) {
            stack.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
