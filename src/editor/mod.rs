//! Build editor state controller.
//!
//! Holds the in-memory draft of the build being edited, applies local
//! mutations, and talks to the build store on explicit save/delete. The
//! draft is a local copy; it is never synchronized with concurrent remote
//! changes (last write wins on save). Outcomes of store calls surface as
//! [`Notice`]s drained by the caller; failed calls leave local state
//! untouched and are never retried.

use std::sync::Arc;

use crate::catalog::{Catalog, DEFAULT_CHARACTER_ID};
use crate::db::BuildStore;
use crate::models::{Build, GearItem, GEAR_SLOTS, UNSAVED_BUILD_ID};

/// Outcome class of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-facing notification (the toast stream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn success(title: &str, message: String) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.to_string(),
            message,
        }
    }

    fn error(message: &str) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Error".to_string(),
            message: message.to_string(),
        }
    }
}

/// State controller for editing one user's builds.
pub struct BuildEditor {
    catalog: Arc<Catalog>,
    store: Arc<dyn BuildStore>,
    user_id: Option<String>,
    builds: Vec<Build>,
    selected_id: Option<String>,
    draft: Option<Build>,
    is_new: bool,
    notices: Vec<Notice>,
}

impl BuildEditor {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn BuildStore>) -> Self {
        Self {
            catalog,
            store,
            user_id: None,
            builds: Vec::new(),
            selected_id: None,
            draft: None,
            is_new: false,
            notices: Vec::new(),
        }
    }

    pub fn draft(&self) -> Option<&Build> {
        self.draft.as_ref()
    }

    pub fn builds(&self) -> &[Build] {
        &self.builds
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Drain the accumulated notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// React to the user's identity becoming available: load their builds
    /// and select the first (oldest), or start a fresh draft if they have
    /// none. On a load failure the editor still presents a fresh draft so
    /// local editing stays possible.
    pub async fn sign_in(&mut self, user_id: &str) {
        self.user_id = Some(user_id.to_string());

        match self.store.list_builds_for_user(user_id).await {
            Ok(builds) => {
                self.builds = builds;
                match self.builds.first().map(|b| b.id.clone()) {
                    Some(first) => self.select_build(&first),
                    None => self.create_new_draft(),
                }
            }
            Err(err) => {
                tracing::error!("Failed to load builds: {}", err);
                self.notices.push(Notice::error("Failed to load builds."));
                self.builds.clear();
                self.create_new_draft();
            }
        }
    }

    /// React to the identity going away.
    pub fn sign_out(&mut self) {
        self.user_id = None;
        self.builds.clear();
        self.selected_id = None;
        self.draft = None;
        self.is_new = false;
    }

    /// Make a loaded build the draft. Unknown ids are a no-op.
    pub fn select_build(&mut self, id: &str) {
        if let Some(build) = self.builds.iter().find(|b| b.id == id) {
            self.draft = Some(build.clone());
            self.selected_id = Some(build.id.clone());
            self.is_new = false;
        }
    }

    /// Start a fresh unsaved draft for the default character: zero points on
    /// every skill, empty gear, all nine gear slots active.
    pub fn create_new_draft(&mut self) {
        self.draft = Some(self.new_draft_template(DEFAULT_CHARACTER_ID));
        self.selected_id = None;
        self.is_new = true;
    }

    fn new_draft_template(&self, character_id: &str) -> Build {
        Build {
            id: UNSAVED_BUILD_ID.to_string(),
            user_id: self.user_id.clone().unwrap_or_default(),
            name: "New Build".to_string(),
            character_id: character_id.to_string(),
            skill_points: self.catalog.zeroed_skill_points(character_id),
            gear: Default::default(),
            active_gear: GEAR_SLOTS.iter().map(|s| s.to_string()).collect(),
            created_at: String::new(),
        }
    }

    pub fn set_name(&mut self, name: &str) {
        if let Some(draft) = self.draft.as_mut() {
            draft.name = name.to_string();
        }
    }

    /// Shallow-replace the whole skill point map (a direct field edit; caps
    /// are enforced when saving, not here).
    pub fn set_skill_points(&mut self, points: std::collections::BTreeMap<String, u32>) {
        if let Some(draft) = self.draft.as_mut() {
            draft.skill_points = points;
        }
    }

    pub fn set_gear_item(&mut self, slot: &str, item: GearItem) {
        if let Some(draft) = self.draft.as_mut() {
            draft.gear.insert(slot.to_string(), item);
        }
    }

    pub fn set_active_gear(&mut self, active_gear: Vec<String>) {
        if let Some(draft) = self.draft.as_mut() {
            draft.active_gear = active_gear;
        }
    }

    /// Add one point to a skill, clamped at its cap. Skill ids that do not
    /// resolve under the draft's character are ignored.
    pub fn add_point(&mut self, skill_id: &str) {
        let Some(draft) = self.draft.as_mut() else {
            return;
        };
        let Some(cap) = self.catalog.max_points(&draft.character_id, skill_id) else {
            return;
        };

        let current = draft.skill_points.get(skill_id).copied().unwrap_or(0);
        if current < cap {
            draft.skill_points.insert(skill_id.to_string(), current + 1);
        }
    }

    /// Remove one point from a skill, floored at zero.
    pub fn remove_point(&mut self, skill_id: &str) {
        if let Some(draft) = self.draft.as_mut() {
            let current = draft.skill_points.get(skill_id).copied().unwrap_or(0);
            if current > 0 {
                draft.skill_points.insert(skill_id.to_string(), current - 1);
            }
        }
    }

    /// Activate a gear slot. The active list is rebuilt from the canonical
    /// slot order, so re-activated slots return to their fixed position;
    /// titles outside the catalog are ignored.
    pub fn activate_slot(&mut self, title: &str) {
        if let Some(draft) = self.draft.as_mut() {
            if !draft.active_gear.iter().any(|t| t == title) {
                let active: Vec<String> = GEAR_SLOTS
                    .iter()
                    .filter(|t| draft.active_gear.iter().any(|a| a == **t) || **t == title)
                    .map(|t| t.to_string())
                    .collect();
                draft.active_gear = active;
            }
        }
    }

    /// Deactivate a gear slot. Its gear entry is retained, just not shown.
    pub fn deactivate_slot(&mut self, title: &str) {
        if let Some(draft) = self.draft.as_mut() {
            draft.active_gear.retain(|t| t != title);
        }
    }

    /// Switch the draft to another character. Skill ids are scoped per
    /// character, so all allocations reset to zero over the new character's
    /// skill set.
    pub fn change_character(&mut self, character_id: &str) {
        let zeroed = self.catalog.zeroed_skill_points(character_id);
        if let Some(draft) = self.draft.as_mut() {
            draft.character_id = character_id.to_string();
            draft.skill_points = zeroed;
        }
    }

    /// Persist the draft: create when it has never been saved, otherwise a
    /// full-field update. Skill points are clamped to their caps first, so a
    /// direct field edit cannot persist an over-cap value. On failure the
    /// local state is left as it was; no retry.
    pub async fn save(&mut self) {
        let Some(user_id) = self.user_id.clone() else {
            return;
        };
        let Some(mut draft) = self.draft.clone() else {
            return;
        };

        self.catalog
            .clamp_skill_points(&draft.character_id, &mut draft.skill_points);
        self.draft = Some(draft.clone());

        if self.is_new || draft.id == UNSAVED_BUILD_ID {
            match self.store.create_build(&user_id, &draft.to_create_request()).await {
                Ok(saved) => {
                    self.builds.push(saved.clone());
                    self.selected_id = Some(saved.id.clone());
                    self.draft = Some(saved.clone());
                    self.is_new = false;
                    self.notices.push(Notice::success(
                        "Build Saved!",
                        format!("\"{}\" has been created.", saved.name),
                    ));
                }
                Err(err) => {
                    tracing::error!("Failed to save build: {}", err);
                    self.notices.push(Notice::error("Failed to save build."));
                }
            }
        } else {
            match self.store.update_build(&draft.id, &draft.to_update_request()).await {
                Ok(()) => {
                    if let Some(entry) = self.builds.iter_mut().find(|b| b.id == draft.id) {
                        *entry = draft.clone();
                    }
                    self.notices.push(Notice::success(
                        "Build Updated!",
                        format!("\"{}\" has been saved.", draft.name),
                    ));
                }
                Err(err) => {
                    tracing::error!("Failed to save build: {}", err);
                    self.notices.push(Notice::error("Failed to save build."));
                }
            }
        }
    }

    /// Delete the selected build, then fall back to the first remaining
    /// build or a fresh draft. Unsaved drafts have nothing to delete.
    pub async fn delete_current(&mut self) {
        let Some(id) = self.selected_id.clone() else {
            return;
        };

        match self.store.delete_build(&id).await {
            Ok(()) => {
                self.notices.push(Notice::success(
                    "Build Deleted",
                    "The build has been removed.".to_string(),
                ));
                self.builds.retain(|b| b.id != id);
                match self.builds.first().map(|b| b.id.clone()) {
                    Some(first) => self.select_build(&first),
                    None => self.create_new_draft(),
                }
            }
            Err(err) => {
                tracing::error!("Failed to delete build: {}", err);
                self.notices.push(Notice::error("Failed to delete build."));
            }
        }
    }
}
