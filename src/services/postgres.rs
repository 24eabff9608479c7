use crate::models::{Criterion, RankedMatch, RatingProfile};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// PostgreSQL client for survey data and ranked results
///
/// Owns the persistence side of the matching pipeline: the criteria registry,
/// per-user criterion scores, and the per-client ranked results that the
/// engine replaces on every run.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
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
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(url, max_connections.unwrap_or(10), min_connections.unwrap_or(1)).await
    }

    /// All matching criteria in ordinal order
    pub async fn list_criteria(&self) -> Result<Vec<Criterion>, PostgresError> {
        let rows = sqlx::query(
            r#"
            SELECT id, position, name, description
            FROM criteria
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let criteria = rows
            .iter()
            .map(|row| Criterion {
                id: row.get("id"),
                position: row.get("position"),
                name: row.get("name"),
                description: row.get("description"),
            })
            .collect();

        Ok(criteria)
    }

    /// Replace a user's full rating vector and mark their survey complete.
    ///
    /// The vector must carry exactly one score per registered criterion;
    /// scores map to criteria by ordinal position.
    pub async fn upsert_scores(&self, user_id: i64, scores: &[u8]) -> Result<usize, PostgresError> {
        let criteria = self.list_criteria().await?;

        if criteria.is_empty() {
            return Err(PostgresError::InvalidInput(
                "no criteria registered".to_string(),
            ));
        }
        if scores.len() != criteria.len() {
            return Err(PostgresError::InvalidInput(format!(
                "expected {} scores, got {}",
                criteria.len(),
                scores.len()
            )));
        }

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_exists {
            return Err(PostgresError::NotFound(format!("user {}", user_id)));
        }

        let mut tx = self.pool.begin().await?;

        for (criterion, &score) in criteria.iter().zip(scores) {
            sqlx::query(
                r#"
                INSERT INTO criterion_scores (user_id, criterion_id, score)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, criterion_id)
                DO UPDATE SET score = EXCLUDED.score
                "#,
            )
            .bind(user_id)
            .bind(criterion.id)
            .bind(i16::from(score))
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE users SET survey_done = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(user_id, count = scores.len(), "saved criterion scores");

        Ok(scores.len())
    }

    /// A user's rating vector, scores ordered by criterion position.
    ///
    /// Returns NotFound if the user has no scores at all.
    pub async fn get_rating_vector(&self, user_id: i64) -> Result<RatingProfile, PostgresError> {
        let rows = sqlx::query(
            r#"
            SELECT cs.score
            FROM criterion_scores cs
            JOIN criteria c ON c.id = cs.criterion_id
            WHERE cs.user_id = $1
            ORDER BY c.position
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(PostgresError::NotFound(format!(
                "rating vector for user {}",
                user_id
            )));
        }

        let scores = rows
            .iter()
            .map(|row| row.get::<i16, _>("score") as u8)
            .collect();

        Ok(RatingProfile { user_id, scores })
    }

    /// Rating vectors of every therapist who has completed the survey,
    /// scores ordered by criterion position within each vector.
    pub async fn get_therapist_vectors(&self) -> Result<Vec<RatingProfile>, PostgresError> {
        let rows = sqlx::query(
            r#"
            SELECT cs.user_id, cs.score
            FROM criterion_scores cs
            JOIN users u ON u.id = cs.user_id
            JOIN criteria c ON c.id = cs.criterion_id
            WHERE u.user_role = 'therapist' AND u.survey_done = TRUE
            ORDER BY cs.user_id, c.position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        // Rows arrive grouped by user_id, so one pass is enough
        let mut profiles: Vec<RatingProfile> = Vec::new();
        for row in rows {
            let user_id: i64 = row.get("user_id");
            let score = row.get::<i16, _>("score") as u8;

            match profiles.last_mut() {
                Some(p) if p.user_id == user_id => p.scores.push(score),
                _ => profiles.push(RatingProfile {
                    user_id,
                    scores: vec![score],
                }),
            }
        }

        tracing::debug!(count = profiles.len(), "loaded therapist rating vectors");

        Ok(profiles)
    }

    /// Delete all persisted results for a client. Returns rows removed.
    pub async fn clear_results(&self, client_id: i64) -> Result<u64, PostgresError> {
        let result = sqlx::query("DELETE FROM matching_results WHERE client_id = $1")
            .bind(client_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            client_id,
            cleared = result.rows_affected(),
            "cleared matching results"
        );

        Ok(result.rows_affected())
    }

    /// Insert a ranked result set for a client. Assumes any prior rows have
    /// been cleared; (client_id, therapist_id) is unique.
    pub async fn store_results(
        &self,
        client_id: i64,
        results: &[RankedMatch],
    ) -> Result<(), PostgresError> {
        for m in results {
            sqlx::query(
                r#"
                INSERT INTO matching_results (client_id, therapist_id, score, rank)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(client_id)
            .bind(m.therapist_id)
            .bind(m.score)
            .bind(m.rank)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Replace a client's result set: clear-then-store inside one
    /// transaction, so a concurrent reader never sees a half-written ranking.
    /// Runs for the same client must still be serialized by the caller.
    pub async fn replace_results(
        &self,
        client_id: i64,
        results: &[RankedMatch],
    ) -> Result<(), PostgresError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM matching_results WHERE client_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;

        for m in results {
            sqlx::query(
                r#"
                INSERT INTO matching_results (client_id, therapist_id, score, rank)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(client_id)
            .bind(m.therapist_id)
            .bind(m.score)
            .bind(m.rank)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            client_id,
            stored = results.len(),
            "replaced matching results"
        );

        Ok(())
    }

    /// A client's persisted ranking, best first
    pub async fn get_results(&self, client_id: i64) -> Result<Vec<RankedMatch>, PostgresError> {
        let rows = sqlx::query(
            r#"
            SELECT therapist_id, score, rank
            FROM matching_results
            WHERE client_id = $1
            ORDER BY rank
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        let results = rows
            .iter()
            .map(|row| RankedMatch {
                therapist_id: row.get("therapist_id"),
                score: row.get("score"),
                rank: row.get("rank"),
            })
            .collect();

        Ok(results)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
