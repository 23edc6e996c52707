//! Build viewer read controller.
//!
//! Lets any visitor browse saved builds: pick a user from the directory,
//! pick one of their builds, and see it resolved for display. Shares
//! [`resolve_view`] with the HTTP view endpoint.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::db::{BuildStore, UserDirectory};
use crate::errors::AppError;
use crate::models::{Build, PublicUser, Rarity};

/// A build resolved for read-only display.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildView {
    pub name: String,
    pub character_id: String,
    pub gear: Vec<GearSlotView>,
    pub skills: Vec<SkillView>,
}

/// One active gear slot holding a named item.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GearSlotView {
    pub slot: String,
    pub name: String,
    pub rarity: Rarity,
}

/// One skill with points allocated.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkillView {
    pub name: String,
    pub points: u32,
}

/// Resolve a build for display: active gear slots whose item has a name (in
/// active-list order), and skills with nonzero points (in skill-id order).
///
/// Skill names are looked up by scanning the whole catalog rather than the
/// build's own character; ids are globally unique by construction, and this
/// keeps the viewer working even if a stored characterId ever goes stale.
/// Ids that no longer resolve at all are shown verbatim.
pub fn resolve_view(catalog: &Catalog, build: &Build) -> BuildView {
    let gear = build
        .active_gear
        .iter()
        .filter_map(|slot| {
            let item = build.gear.get(slot)?;
            if item.name.is_empty() {
                return None;
            }
            Some(GearSlotView {
                slot: slot.clone(),
                name: item.name.clone(),
                rarity: item.rarity,
            })
        })
        .collect();

    let skills = build
        .skill_points
        .iter()
        .filter(|(_, &points)| points > 0)
        .map(|(skill_id, &points)| SkillView {
            name: catalog
                .find_skill(skill_id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| skill_id.clone()),
            points,
        })
        .collect();

    BuildView {
        name: build.name.clone(),
        character_id: build.character_id.clone(),
        gear,
        skills,
    }
}

/// State controller for the read-only viewer.
pub struct BuildViewer {
    catalog: Arc<Catalog>,
    store: Arc<dyn BuildStore>,
    directory: Arc<dyn UserDirectory>,
    users: Vec<PublicUser>,
    selected_user: Option<String>,
    builds: Vec<Build>,
    selected_build: Option<String>,
}

impl BuildViewer {
    pub fn new(
        catalog: Arc<Catalog>,
        store: Arc<dyn BuildStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            catalog,
            store,
            directory,
            users: Vec::new(),
            selected_user: None,
            builds: Vec::new(),
            selected_build: None,
        }
    }

    /// Load the full user directory. Called once when the viewer opens.
    pub async fn load_users(&mut self) -> Result<(), AppError> {
        self.users = self.directory.list_users().await?;
        Ok(())
    }

    pub fn users(&self) -> &[PublicUser] {
        &self.users
    }

    pub fn builds(&self) -> &[Build] {
        &self.builds
    }

    pub fn selected_user(&self) -> Option<&str> {
        self.selected_user.as_deref()
    }

    /// Select a user and load their builds; the first (oldest) build is
    /// auto-selected, or the selection cleared if they have none. An unknown
    /// uid clears everything.
    pub async fn select_user(&mut self, uid: &str) -> Result<(), AppError> {
        if !self.users.iter().any(|u| u.uid == uid) {
            self.selected_user = None;
            self.builds.clear();
            self.selected_build = None;
            return Ok(());
        }

        self.selected_user = Some(uid.to_string());
        self.builds = self.store.list_builds_for_user(uid).await?;
        self.selected_build = self.builds.first().map(|b| b.id.clone());
        Ok(())
    }

    /// Select one of the loaded builds; unknown ids clear the selection.
    pub fn select_build(&mut self, id: &str) {
        self.selected_build = self
            .builds
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.id.clone());
    }

    pub fn selected_build(&self) -> Option<&Build> {
        let id = self.selected_build.as_deref()?;
        self.builds.iter().find(|b| b.id == id)
    }

    /// The resolved rendering of the selected build, if any.
    pub fn view(&self) -> Option<BuildView> {
        self.selected_build()
            .map(|build| resolve_view(&self.catalog, build))
    }
}
