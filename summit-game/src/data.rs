//! Static content tables: levels and the item catalog.
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_LEVEL_DATA: &str = include_str!("../assets/data/levels.json");
const DEFAULT_ITEM_DATA: &str = include_str!("../assets/data/items.json");

/// A climbable level: its summit height and the rewards for reaching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProperties {
    pub name: String,
    pub max_height: f64,
    #[serde(default)]
    pub reward_money: f64,
    #[serde(default)]
    pub reward_stamina: f64,
    #[serde(default)]
    pub required_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_item_ids: Option<Vec<String>>,
}

impl LevelProperties {
    /// Item ids that must be carried to attempt this level.
    #[must_use]
    pub fn required_items(&self) -> &[String] {
        self.required_item_ids.as_deref().unwrap_or(&[])
    }
}

/// A purchasable piece of gear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub volume: f64,
}

/// A backpack limits how much inventory volume the player can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backpack {
    #[serde(flatten)]
    pub item: Item,
    pub capacity: f64,
}

/// Shoes scale the distance covered per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shoes {
    #[serde(flatten)]
    pub item: Item,
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,
}

fn default_speed_multiplier() -> f64 {
    1.0
}

impl Default for Backpack {
    fn default() -> Self {
        Self {
            item: Item {
                id: "default_backpack".to_string(),
                name: "default backpack".to_string(),
                description: "Default Backpack".to_string(),
                price: 0.0,
                weight: 2.0,
                volume: 0.0,
            },
            capacity: 10.0,
        }
    }
}

impl Default for Shoes {
    fn default() -> Self {
        Self {
            item: Item {
                id: "default_shoes".to_string(),
                name: "default shoes".to_string(),
                description: "Default Shoes".to_string(),
                price: 0.0,
                weight: 0.0,
                volume: 0.0,
            },
            speed_multiplier: 1.0,
        }
    }
}

/// Errors raised while reading content tables.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed catalog data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown level: {0}")]
    UnknownLevel(String),
    #[error("default {kind} '{id}' is not listed in the catalog")]
    MissingDefault { kind: &'static str, id: String },
}

#[derive(Debug, Clone, Deserialize)]
struct LevelTable {
    levels: Vec<LevelProperties>,
}

#[derive(Debug, Clone, Deserialize)]
struct ItemTable {
    default_backpack: String,
    default_shoes: String,
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    backpacks: Vec<Backpack>,
    #[serde(default)]
    shoes: Vec<Shoes>,
}

/// Container for all static content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub levels: Vec<LevelProperties>,
    pub items: Vec<Item>,
    pub backpacks: Vec<Backpack>,
    pub shoes: Vec<Shoes>,
    pub default_backpack: Backpack,
    pub default_shoes: Shoes,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            items: Vec::new(),
            backpacks: vec![Backpack::default()],
            shoes: vec![Shoes::default()],
            default_backpack: Backpack::default(),
            default_shoes: Shoes::default(),
        }
    }
}

impl Catalog {
    /// Build a catalog from the level and item JSON tables.
    ///
    /// # Errors
    ///
    /// Returns an error if either table cannot be parsed or the item table
    /// names a default backpack or shoes that it does not list.
    pub fn from_json(levels_json: &str, items_json: &str) -> Result<Self, CatalogError> {
        let levels: LevelTable = serde_json::from_str(levels_json)?;
        let items: ItemTable = serde_json::from_str(items_json)?;

        let default_backpack = items
            .backpacks
            .iter()
            .find(|b| b.item.id == items.default_backpack)
            .cloned()
            .ok_or_else(|| CatalogError::MissingDefault {
                kind: "backpack",
                id: items.default_backpack.clone(),
            })?;
        let default_shoes = items
            .shoes
            .iter()
            .find(|s| s.item.id == items.default_shoes)
            .cloned()
            .ok_or_else(|| CatalogError::MissingDefault {
                kind: "shoes",
                id: items.default_shoes.clone(),
            })?;

        Ok(Self {
            levels: levels.levels,
            items: items.items,
            backpacks: items.backpacks,
            shoes: items.shoes,
            default_backpack,
            default_shoes,
        })
    }

    /// Load the content tables bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled JSON is malformed.
    pub fn load_bundled() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_LEVEL_DATA, DEFAULT_ITEM_DATA)
    }

    /// Find a level by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownLevel`] if no level carries that name.
    pub fn level(&self, name: &str) -> Result<&LevelProperties, CatalogError> {
        self.levels
            .iter()
            .find(|level| level.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CatalogError::UnknownLevel(name.to_string()))
    }

    /// Find a plain item by id.
    #[must_use]
    pub fn find_item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Levels whose `required_level` is at or below the unlocked level.
    pub fn unlocked_levels(&self, max_level: u32) -> impl Iterator<Item = &LevelProperties> {
        self.levels
            .iter()
            .filter(move |level| level.required_level <= max_level)
    }
}
