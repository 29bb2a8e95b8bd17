//! Carried and floor items, reduced to what the turn loop needs: mass for
//! burden, rods for recharging, and the Orb for the game phase.

use serde::{Deserialize, Serialize};

use crate::constants::rods::CHARGE_MULT;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rod {
    pub name: String,
    /// Charges times [`CHARGE_MULT`].
    pub charge: u32,
    pub max_charges: u32,
}

impl Rod {
    pub fn new(name: impl Into<String>, max_charges: u32) -> Self {
        Self {
            name: name.into(),
            charge: max_charges * CHARGE_MULT,
            max_charges,
        }
    }

    pub fn is_full(&self) -> bool {
        self.charge >= self.max_charges * CHARGE_MULT
    }

    pub fn whole_charges(&self) -> u32 {
        self.charge / CHARGE_MULT
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Gold,
    Potion,
    Scroll,
    Ration,
    Weapon(String),
    Rod(Rod),
    Orb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub quantity: u32,
}

impl Item {
    pub fn new(kind: ItemKind, quantity: u32) -> Self {
        Self { kind, quantity }
    }

    pub fn mass(&self) -> u32 {
        let each = match &self.kind {
            ItemKind::Gold => 0,
            ItemKind::Potion | ItemKind::Scroll => 40,
            ItemKind::Ration => 80,
            ItemKind::Weapon(_) => 150,
            ItemKind::Rod(_) => 100,
            ItemKind::Orb => 300,
        };
        each * self.quantity
    }

    pub fn name(&self) -> String {
        let base = match &self.kind {
            ItemKind::Gold => return format!("{} gold pieces", self.quantity),
            ItemKind::Potion => "potion",
            ItemKind::Scroll => "scroll",
            ItemKind::Ration => "ration",
            ItemKind::Weapon(name) => name.as_str(),
            ItemKind::Rod(rod) => rod.name.as_str(),
            ItemKind::Orb => return "the Orb of Zot".to_string(),
        };
        if self.quantity == 1 {
            format!("a {}", base)
        } else {
            format!("{} {}s", self.quantity, base)
        }
    }

    /// Whether `other` can merge into this stack.
    pub fn stacks_with(&self, other: &Item) -> bool {
        matches!(
            (&self.kind, &other.kind),
            (ItemKind::Gold, ItemKind::Gold)
                | (ItemKind::Potion, ItemKind::Potion)
                | (ItemKind::Scroll, ItemKind::Scroll)
                | (ItemKind::Ration, ItemKind::Ration)
        )
    }
}
