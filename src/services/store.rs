use crate::models::{CandidateQuery, InterestSet, NewPlan, ProfileUpdate, TravelPlan, User};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when reading or writing records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Key-based access to user records
///
/// Users are identified by email. Update methods return `false` when no
/// record matched.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user; fails with [`StoreError::Conflict`] when the email
    /// or username is taken
    async fn create_user(&self, user: User) -> Result<(), StoreError>;

    async fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<bool, StoreError>;

    async fn update_interests(&self, email: &str, interests: &InterestSet) -> Result<bool, StoreError>;

    async fn update_bio(&self, email: &str, bio: &str) -> Result<bool, StoreError>;

    /// Users in the candidate pool described by `query`
    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Insert and listing of travel plans
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn insert_plan(&self, plan: NewPlan) -> Result<TravelPlan, StoreError>;

    /// All plans, newest first
    async fn list_plans(&self) -> Result<Vec<TravelPlan>, StoreError>;

    async fn get_plan(&self, id: uuid::Uuid) -> Result<Option<TravelPlan>, StoreError>;
}
