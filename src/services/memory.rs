use crate::core::filters::matches_candidate_query;
use crate::models::{CandidateQuery, InterestSet, NewPlan, ProfileUpdate, TravelPlan, User};
use crate::services::store::{PlanStore, StoreError, UserStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process user and plan store
///
/// Used for local development (`database.backend = "memory"`) and tests.
/// Nothing is persisted across restarts.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    plans: RwLock<Vec<TravelPlan>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.email) {
            return Err(StoreError::Conflict(format!("email {} already registered", user.email)));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!("username {} already taken", user.username)));
        }

        tracing::debug!("Created user {}", user.email);
        users.insert(user.email.clone(), user);
        Ok(())
    }

    async fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(email) {
            Some(user) => {
                update.apply_to(user);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_interests(&self, email: &str, interests: &InterestSet) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(email) {
            Some(user) => {
                user.interests = interests.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_bio(&self, email: &str, bio: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(email) {
            Some(user) => {
                user.bio = bio.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError> {
        let candidates: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| matches_candidate_query(u, query))
            .cloned()
            .collect();

        Ok(candidates)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn insert_plan(&self, plan: NewPlan) -> Result<TravelPlan, StoreError> {
        let plan = plan.into_plan();
        self.plans.write().await.push(plan.clone());
        Ok(plan)
    }

    async fn list_plans(&self) -> Result<Vec<TravelPlan>, StoreError> {
        let mut plans = self.plans.read().await.clone();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    async fn get_plan(&self, id: uuid::Uuid) -> Result<Option<TravelPlan>, StoreError> {
        Ok(self.plans.read().await.iter().find(|p| p.id == id).cloned())
    }
}
