use crate::models::{
    Application, ApplicationStatus, Bookmark, DomainError, Match, MatchUpsert, NewApplication,
};
use crate::services::store::{Store, StoreError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

/// Application status as stored in the `application_status` enum type
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
pub enum StatusColumn {
    Pending,
    Accepted,
    Declined,
}

impl From<ApplicationStatus> for StatusColumn {
    fn from(value: ApplicationStatus) -> Self {
        match value {
            ApplicationStatus::Pending => StatusColumn::Pending,
            ApplicationStatus::Accepted => StatusColumn::Accepted,
            ApplicationStatus::Declined => StatusColumn::Declined,
        }
    }
}

impl From<StatusColumn> for ApplicationStatus {
    fn from(value: StatusColumn) -> Self {
        match value {
            StatusColumn::Pending => ApplicationStatus::Pending,
            StatusColumn::Accepted => ApplicationStatus::Accepted,
            StatusColumn::Declined => ApplicationStatus::Declined,
        }
    }
}

const MATCH_COLUMNS: &str =
    "id, event_id, sponsor_id, match_score, is_featured, created_at, updated_at";
const APPLICATION_COLUMNS: &str =
    "id, event_id, sponsor_id, status, proposal_message, created_at, updated_at";

/// PostgreSQL store for matches, applications and bookmarks
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string and run migrations
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

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from optional settings
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

    fn match_from_row(row: &PgRow) -> Result<Match, sqlx::Error> {
        let score: i32 = row.try_get("match_score")?;
        Ok(Match {
            id: row.try_get("id")?,
            event_id: row.try_get("event_id")?,
            sponsor_id: row.try_get("sponsor_id")?,
            match_score: score.clamp(0, 100) as u8,
            is_featured: row.try_get("is_featured")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn application_from_row(row: &PgRow) -> Result<Application, sqlx::Error> {
        let status: StatusColumn = row.try_get("status")?;
        Ok(Application {
            id: row.try_get("id")?,
            event_id: row.try_get("event_id")?,
            sponsor_id: row.try_get("sponsor_id")?,
            status: status.into(),
            proposal_message: row.try_get("proposal_message")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bookmark_from_row(row: &PgRow) -> Result<Bookmark, sqlx::Error> {
        Ok(Bookmark {
            id: row.try_get("id")?,
            sponsor_id: row.try_get("sponsor_id")?,
            event_id: row.try_get("event_id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn matches_where(
        &self,
        column: &str,
        value: &str,
        limit: usize,
    ) -> Result<Vec<Match>, StoreError> {
        let query = format!(
            "SELECT {} FROM matches WHERE {} = $1 \
             ORDER BY match_score DESC, event_id ASC, sponsor_id ASC LIMIT $2",
            MATCH_COLUMNS, column
        );

        let rows = sqlx::query(&query)
            .bind(value)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(Self::match_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    async fn applications_where(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Vec<Application>, StoreError> {
        let query = format!(
            "SELECT {} FROM applications WHERE {} = $1 ORDER BY created_at DESC",
            APPLICATION_COLUMNS, column
        );

        let rows = sqlx::query(&query).bind(value).fetch_all(&self.pool).await?;

        rows.iter()
            .map(Self::application_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

#[async_trait]
impl Store for PostgresClient {
    /// Uses INSERT ... ON CONFLICT so re-scoring a pair never creates a second row
    async fn upsert_match(&self, upsert: &MatchUpsert) -> Result<Match, StoreError> {
        let query = format!(
            r#"
            INSERT INTO matches (id, event_id, sponsor_id, match_score, is_featured, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            ON CONFLICT (event_id, sponsor_id)
            DO UPDATE SET
                match_score = EXCLUDED.match_score,
                is_featured = EXCLUDED.is_featured,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&upsert.event_id)
            .bind(&upsert.sponsor_id)
            .bind(i32::from(upsert.match_score))
            .bind(upsert.is_featured)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(
            "Upserted match {} <-> {} (score {})",
            upsert.event_id,
            upsert.sponsor_id,
            upsert.match_score
        );

        Ok(Self::match_from_row(&row)?)
    }

    async fn matches_for_sponsor(&self, sponsor_id: &str, limit: usize) -> Result<Vec<Match>, StoreError> {
        self.matches_where("sponsor_id", sponsor_id, limit).await
    }

    async fn matches_for_event(&self, event_id: &str, limit: usize) -> Result<Vec<Match>, StoreError> {
        self.matches_where("event_id", event_id, limit).await
    }

    async fn create_application(&self, application: &NewApplication) -> Result<Application, StoreError> {
        application.validate()?;

        let query = format!(
            r#"
            INSERT INTO applications (id, event_id, sponsor_id, status, proposal_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&application.event_id)
            .bind(&application.sponsor_id)
            .bind(StatusColumn::Pending)
            .bind(&application.proposal_message)
            .fetch_one(&self.pool)
            .await?;

        Ok(Self::application_from_row(&row)?)
    }

    /// The update only applies while the row is still pending, so two
    /// concurrent responses cannot both win.
    async fn respond_to_application(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, StoreError> {
        let next = ApplicationStatus::Pending.respond(status)?;

        let query = format!(
            r#"
            UPDATE applications
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );

        let updated = sqlx::query(&query)
            .bind(application_id)
            .bind(StatusColumn::from(next))
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = updated {
            return Ok(Self::application_from_row(&row)?);
        }

        // Either missing or already resolved
        let current: Option<StatusColumn> =
            sqlx::query_scalar("SELECT status FROM applications WHERE id = $1")
                .bind(application_id)
                .fetch_optional(&self.pool)
                .await?;

        match current {
            None => Err(StoreError::NotFound(format!("application {}", application_id))),
            Some(current) => Err(DomainError::AlreadyResolved(current.into()).into()),
        }
    }

    async fn applications_for_sponsor(&self, sponsor_id: &str) -> Result<Vec<Application>, StoreError> {
        self.applications_where("sponsor_id", sponsor_id).await
    }

    async fn applications_for_event(&self, event_id: &str) -> Result<Vec<Application>, StoreError> {
        self.applications_where("event_id", event_id).await
    }

    async fn toggle_bookmark(&self, sponsor_id: &str, event_id: &str) -> Result<bool, StoreError> {
        let removed = sqlx::query("DELETE FROM bookmarks WHERE sponsor_id = $1 AND event_id = $2")
            .bind(sponsor_id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        if removed.rows_affected() > 0 {
            tracing::debug!("Removed bookmark {} -> {}", sponsor_id, event_id);
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO bookmarks (id, sponsor_id, event_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (sponsor_id, event_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(sponsor_id)
        .bind(event_id)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Added bookmark {} -> {}", sponsor_id, event_id);
        Ok(true)
    }

    async fn bookmarks_for_sponsor(&self, sponsor_id: &str) -> Result<Vec<Bookmark>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sponsor_id, event_id, created_at
            FROM bookmarks
            WHERE sponsor_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(sponsor_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(Self::bookmark_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
