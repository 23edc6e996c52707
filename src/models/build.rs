//! Build model matching the frontend Build interface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::GearItem;

/// Sentinel id for a draft that has never been persisted. Real ids are
/// assigned by the store on create.
pub const UNSAVED_BUILD_ID: &str = "new";

/// A saved configuration of one character's skill allocations and gear
/// loadout, owned by one user.
///
/// Maps are `BTreeMap` rather than `HashMap` so iteration (and therefore
/// rendering and JSON output) is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub character_id: String,
    /// Skill id -> allocated points. Skill ids are scoped to `character_id`.
    #[serde(default)]
    pub skill_points: BTreeMap<String, u32>,
    /// Gear slot title -> item. May retain entries for inactive slots.
    #[serde(default)]
    pub gear: BTreeMap<String, GearItem>,
    /// Currently displayed gear slots, a subset of [`super::GEAR_SLOTS`].
    #[serde(default)]
    pub active_gear: Vec<String>,
    /// Assigned by the store on create; drives deterministic "first build"
    /// selection.
    #[serde(default)]
    pub created_at: String,
}

impl Build {
    /// The create-request shape of this build (everything the store does not
    /// assign itself).
    pub fn to_create_request(&self) -> CreateBuildRequest {
        CreateBuildRequest {
            name: self.name.clone(),
            character_id: self.character_id.clone(),
            skill_points: self.skill_points.clone(),
            gear: self.gear.clone(),
            active_gear: self.active_gear.clone(),
        }
    }

    /// A full-field update request, used when saving an already-persisted
    /// draft (the editor always writes the whole draft back).
    pub fn to_update_request(&self) -> UpdateBuildRequest {
        UpdateBuildRequest {
            name: Some(self.name.clone()),
            character_id: Some(self.character_id.clone()),
            skill_points: Some(self.skill_points.clone()),
            gear: Some(self.gear.clone()),
            active_gear: Some(self.active_gear.clone()),
        }
    }
}

/// Request body for creating a new build. The owning user comes from the
/// caller's identity, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuildRequest {
    pub name: String,
    pub character_id: String,
    #[serde(default)]
    pub skill_points: BTreeMap<String, u32>,
    #[serde(default)]
    pub gear: BTreeMap<String, GearItem>,
    #[serde(default)]
    pub active_gear: Vec<String>,
}

/// Request body for updating an existing build. Provided fields are merged
/// into the stored document; omitted fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBuildRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub character_id: Option<String>,
    #[serde(default)]
    pub skill_points: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub gear: Option<BTreeMap<String, GearItem>>,
    #[serde(default)]
    pub active_gear: Option<Vec<String>>,
}
