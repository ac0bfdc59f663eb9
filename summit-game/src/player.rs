//! Persistent player progression: stamina cap, wallet, unlocks and gear.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_LEVEL, DEFAULT_MAX_STAMINA, DEFAULT_MONEY, STAMINA_PER_PURCHASE,
};
use crate::data::{Backpack, Catalog, Item, LevelProperties, Shoes};

/// Result of a purchase attempt. Failed purchases leave the player untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOutcome {
    Purchased,
    InsufficientFunds,
    NoCapacity,
}

impl PurchaseOutcome {
    #[must_use]
    pub const fn is_purchased(self) -> bool {
        matches!(self, Self::Purchased)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub max_stamina: f64,
    pub money: f64,
    pub max_level: u32,
    #[serde(default)]
    pub inventory_items: Vec<Item>,
    #[serde(default)]
    pub equipped_items: Vec<Item>,
    #[serde(default)]
    pub shoes: Shoes,
    #[serde(default)]
    pub backpack: Backpack,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            max_stamina: DEFAULT_MAX_STAMINA,
            money: DEFAULT_MONEY,
            max_level: DEFAULT_MAX_LEVEL,
            inventory_items: Vec::new(),
            equipped_items: Vec::new(),
            shoes: Shoes::default(),
            backpack: Backpack::default(),
        }
    }
}

impl PlayerStats {
    /// Fresh player wearing the catalog's default backpack and shoes.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            shoes: catalog.default_shoes.clone(),
            backpack: catalog.default_backpack.clone(),
            ..Self::default()
        }
    }

    /// Everything the climber carries, including the backpack and shoes.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        let items: f64 = self
            .inventory_items
            .iter()
            .chain(&self.equipped_items)
            .map(|item| item.weight)
            .sum();
        items + self.backpack.item.weight + self.shoes.item.weight
    }

    /// Volume of the inventory packed into the backpack.
    #[must_use]
    pub fn carried_volume(&self) -> f64 {
        self.inventory_items.iter().map(|item| item.volume).sum()
    }

    #[must_use]
    pub fn owns_item(&self, item_id: &str) -> bool {
        self.inventory_items
            .iter()
            .chain(&self.equipped_items)
            .any(|item| item.id == item_id)
    }

    /// Required item ids for `level` the player does not carry, in order.
    #[must_use]
    pub fn missing_items(&self, level: &LevelProperties) -> Vec<String> {
        level
            .required_items()
            .iter()
            .filter(|id| !self.owns_item(id))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn has_unlocked(&self, level: &LevelProperties) -> bool {
        level.required_level <= self.max_level
    }

    /// Trade `cost` money for one point of stamina cap.
    pub fn purchase_stamina(&mut self, cost: f64) -> PurchaseOutcome {
        if self.money < cost {
            log::debug!(
                "stamina purchase skipped: money {:.2} < cost {:.2}",
                self.money,
                cost
            );
            return PurchaseOutcome::InsufficientFunds;
        }
        self.money = (self.money - cost).max(0.0);
        self.max_stamina += STAMINA_PER_PURCHASE;
        PurchaseOutcome::Purchased
    }

    /// Buy `item` into the inventory if it is affordable and fits the backpack.
    pub fn purchase_item(&mut self, item: &Item) -> PurchaseOutcome {
        if self.money < item.price {
            log::debug!("item purchase skipped: {} costs {:.2}", item.id, item.price);
            return PurchaseOutcome::InsufficientFunds;
        }
        if self.carried_volume() + item.volume > self.backpack.capacity {
            log::debug!(
                "item purchase skipped: {} volume {:.2} exceeds remaining capacity",
                item.id,
                item.volume
            );
            return PurchaseOutcome::NoCapacity;
        }
        self.money = (self.money - item.price).max(0.0);
        self.inventory_items.push(item.clone());
        PurchaseOutcome::Purchased
    }

    /// Move the first inventory item with `item_id` to the equipped list.
    pub fn equip_item(&mut self, item_id: &str) -> bool {
        let Some(index) = self.inventory_items.iter().position(|i| i.id == item_id) else {
            return false;
        };
        let item = self.inventory_items.remove(index);
        self.equipped_items.push(item);
        true
    }

    /// Move the first equipped item with `item_id` back to the inventory.
    pub fn unequip_item(&mut self, item_id: &str) -> bool {
        let Some(index) = self.equipped_items.iter().position(|i| i.id == item_id) else {
            return false;
        };
        let item = self.equipped_items.remove(index);
        self.inventory_items.push(item);
        true
    }
}
