use crate::models::{CandidateQuery, InterestSet, NewPlan, ProfileUpdate, TravelPlan, User};
use crate::services::store::{PlanStore, StoreError, UserStore};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

const USER_COLUMNS: &str = "email, username, password_hash, name, nationality, birthday, gender, \
     trip_type, destination, languages, interests, profile_photo, preference, bio, created_at";

const PLAN_COLUMNS: &str =
    "id, name, location, start_date, end_date, description, image_url, participants, created_at";

/// PostgreSQL-backed user and plan store
///
/// Languages and interests are stored as `TEXT[]` columns. The schema is
/// created by the embedded migrations on startup.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    fn user_from_row(row: &PgRow) -> User {
        User {
            email: row.get("email"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            name: row.get("name"),
            nationality: row.get("nationality"),
            birthday: row.get("birthday"),
            gender: row.get("gender"),
            trip_type: row.get("trip_type"),
            destination: row.get("destination"),
            languages: row.get("languages"),
            interests: InterestSet::from(row.get::<Vec<String>, _>("interests")),
            profile_photo: row.get("profile_photo"),
            preference: row.get("preference"),
            bio: row.get("bio"),
            created_at: Some(row.get("created_at")),
        }
    }

    fn plan_from_row(row: &PgRow) -> TravelPlan {
        TravelPlan {
            id: row.get("id"),
            name: row.get("name"),
            location: row.get("location"),
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            description: row.get("description"),
            image_url: row.get("image_url"),
            participants: row.get("participants"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl UserStore for PostgresClient {
    async fn get_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::user_from_row))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::user_from_row))
    }

    async fn create_user(&self, user: User) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO users (email, username, password_hash, languages, interests, created_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
        "#;

        let result = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.languages)
            .bind(user.interests.to_vec())
            .bind(user.created_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                tracing::debug!("Created user {}", user.email);
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::Conflict(
                format!("email {} or username {} already registered", user.email, user.username),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE users SET
                name = $2,
                nationality = $3,
                birthday = $4,
                gender = $5,
                trip_type = $6,
                destination = $7,
                languages = $8,
                profile_photo = COALESCE(NULLIF($9, ''), profile_photo)
            WHERE email = $1
        "#;

        let result = sqlx::query(query)
            .bind(email)
            .bind(&update.name)
            .bind(&update.nationality)
            .bind(&update.birthday)
            .bind(&update.gender)
            .bind(&update.trip_type)
            .bind(&update.destination)
            .bind(&update.languages)
            .bind(&update.profile_photo)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_interests(&self, email: &str, interests: &InterestSet) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET interests = $2 WHERE email = $1")
            .bind(email)
            .bind(interests.to_vec())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_bio(&self, email: &str, bio: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET bio = $2 WHERE email = $1")
            .bind(email)
            .bind(bio)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM users
            WHERE email <> $1
              AND destination = $2
              AND cardinality(interests) > 0
              AND ($3::TEXT IS NULL OR gender = $3)
            "#,
            USER_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(&query.exclude_email)
            .bind(&query.destination)
            .bind(query.gender.as_option())
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            "Queried {} candidates for destination {}",
            rows.len(),
            query.destination
        );

        Ok(rows.iter().map(Self::user_from_row).collect())
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl PlanStore for PostgresClient {
    async fn insert_plan(&self, plan: NewPlan) -> Result<TravelPlan, StoreError> {
        let plan = plan.into_plan();
        let query = r#"
            INSERT INTO plans (id, name, location, start_date, end_date, description, image_url, participants, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#;

        sqlx::query(query)
            .bind(plan.id)
            .bind(&plan.name)
            .bind(&plan.location)
            .bind(&plan.start_date)
            .bind(&plan.end_date)
            .bind(&plan.description)
            .bind(&plan.image_url)
            .bind(&plan.participants)
            .bind(plan.created_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Inserted plan {} ({})", plan.id, plan.name);

        Ok(plan)
    }

    async fn list_plans(&self) -> Result<Vec<TravelPlan>, StoreError> {
        let query = format!("SELECT {} FROM plans ORDER BY created_at DESC", PLAN_COLUMNS);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(Self::plan_from_row).collect())
    }

    async fn get_plan(&self, id: uuid::Uuid) -> Result<Option<TravelPlan>, StoreError> {
        let query = format!("SELECT {} FROM plans WHERE id = $1", PLAN_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::plan_from_row))
    }
}
