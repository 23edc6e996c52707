//! Gear loadout model matching the frontend GearItemData interface.

use serde::{Deserialize, Serialize};

/// The fixed gear slot catalog, in canonical display order.
///
/// `activeGear` lists on builds are always a subset of these titles;
/// re-activating a slot restores this order.
pub const GEAR_SLOTS: [&str; 9] = [
    "Weapon 1",
    "Weapon 2",
    "Weapon 3",
    "Weapon 4",
    "Shield",
    "Repkit",
    "Ordnance",
    "Class Mod",
    "Enhancement",
];

/// Item rarity tiers. Stored lowercase on the wire, matching the frontend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythic => "mythic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            "mythic" => Some(Rarity::Mythic),
            _ => None,
        }
    }
}

/// A single gear slot's contents. Every field is optional on the wire and
/// defaults to empty, so a bare `{}` is a valid empty slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct GearItem {
    pub name: String,
    pub rarity: Rarity,
    #[serde(rename = "type")]
    pub kind: String,
    pub augments: String,
    pub locations: String,
    pub notes: String,
}
