//! In-memory store used by controller unit tests in place of SQLite.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{BuildStore, UserDirectory};
use crate::errors::AppError;
use crate::models::{Build, CreateBuildRequest, PublicUser, UpdateBuildRequest};

/// In-memory implementation of both store traits, with write-failure
/// injection for exercising the no-retry error paths.
#[derive(Default)]
pub struct MemoryStore {
    builds: Mutex<BTreeMap<String, Build>>,
    users: Mutex<Vec<PublicUser>>,
    next_id: AtomicU64,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write operation fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a build directly, bypassing the failure switch.
    pub async fn seed_build(&self, user_id: &str, request: &CreateBuildRequest) -> Build {
        let failing = self.fail_writes.swap(false, Ordering::SeqCst);
        let build = self.create_build(user_id, request).await.unwrap();
        self.fail_writes.store(failing, Ordering::SeqCst);
        build
    }

    pub fn seed_user(&self, user: PublicUser) {
        self.users.lock().unwrap().push(user);
    }

    pub fn build_count(&self) -> usize {
        self.builds.lock().unwrap().len()
    }

    pub fn stored_build(&self, id: &str) -> Option<Build> {
        self.builds.lock().unwrap().get(id).cloned()
    }

    fn check_writes(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(AppError::Database("injected write failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BuildStore for MemoryStore {
    async fn create_build(
        &self,
        user_id: &str,
        request: &CreateBuildRequest,
    ) -> Result<Build, AppError> {
        self.check_writes()?;

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let build = Build {
            id: format!("b{:04}", n),
            user_id: user_id.to_string(),
            name: request.name.clone(),
            character_id: request.character_id.clone(),
            skill_points: request.skill_points.clone(),
            gear: request.gear.clone(),
            active_gear: request.active_gear.clone(),
            created_at: format!("2024-01-01T00:00:00.{:04}Z", n),
        };

        self.builds
            .lock()
            .unwrap()
            .insert(build.id.clone(), build.clone());
        Ok(build)
    }

    async fn list_builds_for_user(&self, user_id: &str) -> Result<Vec<Build>, AppError> {
        let mut builds: Vec<Build> = self
            .builds
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        builds.sort_by(|a, b| (&a.created_at, &a.id).cmp(&(&b.created_at, &b.id)));
        Ok(builds)
    }

    async fn get_build(&self, id: &str) -> Result<Option<Build>, AppError> {
        Ok(self.builds.lock().unwrap().get(id).cloned())
    }

    async fn update_build(&self, id: &str, request: &UpdateBuildRequest) -> Result<(), AppError> {
        self.check_writes()?;

        let mut builds = self.builds.lock().unwrap();
        let build = builds
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Build {} not found", id)))?;

        if let Some(name) = &request.name {
            build.name = name.clone();
        }
        if let Some(character_id) = &request.character_id {
            build.character_id = character_id.clone();
        }
        if let Some(skill_points) = &request.skill_points {
            build.skill_points = skill_points.clone();
        }
        if let Some(gear) = &request.gear {
            build.gear = gear.clone();
        }
        if let Some(active_gear) = &request.active_gear {
            build.active_gear = active_gear.clone();
        }

        Ok(())
    }

    async fn delete_build(&self, id: &str) -> Result<(), AppError> {
        self.check_writes()?;

        self.builds
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Build {} not found", id)))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn upsert_user(&self, user: &PublicUser) -> Result<(), AppError> {
        self.check_writes()?;

        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter_mut().find(|u| u.uid == user.uid) {
            *existing = user.clone();
        } else {
            users.push(user.clone());
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<PublicUser>, AppError> {
        Ok(self.users.lock().unwrap().clone())
    }
}
