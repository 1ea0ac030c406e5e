use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::info;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{DbError, WorkoutStore};
use crate::models::workout::{NewWorkout, Workout, WorkoutRow};
use crate::models::workout_log::{GetLogDate, NewWorkoutLog, WorkoutLog, WorkoutLogDetail, WorkoutLogDetailRow};
use crate::utils::dates::MonthRange;

/// SQLSTATE raised by Postgres for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

const WORKOUT_COLUMNS: &str = "id, user_id, name, exercises, created_at, updated_at";
const LOG_COLUMNS: &str = "id, user_id, workout_id, date, notes, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(PgStore { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

pub fn is_unique_violation(code: Option<&str>) -> bool {
    code == Some(UNIQUE_VIOLATION)
}

/// The one place that knows how Postgres reports errors. Only the unique
/// violation carries domain meaning; everything else is opaque.
fn classify(err: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        if is_unique_violation(db_err.code().as_deref()) {
            return DbError::UniqueViolation {
                constraint: db_err.constraint().map(str::to_string),
            };
        }
    }
    DbError::Other(err)
}

#[async_trait]
impl WorkoutStore for PgStore {
    async fn list_workouts(&self, user_id: Uuid, limit: Option<i64>) -> Result<Vec<Workout>, DbError> {
        // LIMIT NULL means no limit
        let sql = format!(
            "SELECT {} FROM workouts WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
            WORKOUT_COLUMNS
        );
        let rows = sqlx::query_as::<_, WorkoutRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        Ok(rows.into_iter().map(Workout::from).collect())
    }

    async fn find_workout(&self, user_id: Uuid, workout_id: Uuid) -> Result<Option<Workout>, DbError> {
        let sql = format!("SELECT {} FROM workouts WHERE id = $1 AND user_id = $2", WORKOUT_COLUMNS);
        let row = sqlx::query_as::<_, WorkoutRow>(&sql)
            .bind(workout_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;

        Ok(row.map(Workout::from))
    }

    async fn insert_workout(&self, user_id: Uuid, workout: &NewWorkout) -> Result<Workout, DbError> {
        let sql = format!(
            "INSERT INTO workouts ({cols}) VALUES ($1, $2, $3, $4, $5, $5) RETURNING {cols}",
            cols = WORKOUT_COLUMNS
        );
        let row = sqlx::query_as::<_, WorkoutRow>(&sql)
            .bind(Uuid::now_v7())
            .bind(user_id)
            .bind(&workout.name)
            .bind(Json(&workout.exercises))
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;

        Ok(row.into())
    }

    async fn insert_log(&self, user_id: Uuid, log: &NewWorkoutLog) -> Result<WorkoutLog, DbError> {
        let sql = format!(
            "INSERT INTO workout_logs ({cols}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {cols}",
            cols = LOG_COLUMNS
        );
        sqlx::query_as::<_, WorkoutLog>(&sql)
            .bind(Uuid::now_v7())
            .bind(user_id)
            .bind(log.workout_id)
            .bind(log.date)
            .bind(&log.notes)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn log_dates_in_range(&self, user_id: Uuid, range: &MonthRange) -> Result<Vec<NaiveDate>, DbError> {
        let rows = sqlx::query_as::<_, GetLogDate>(
            "SELECT date FROM workout_logs WHERE user_id = $1 AND date >= $2 AND date < $3",
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(rows.into_iter().map(|r| r.date).collect())
    }

    async fn logs_on_date(&self, user_id: Uuid, date: NaiveDate) -> Result<Vec<WorkoutLogDetail>, DbError> {
        let rows = sqlx::query_as::<_, WorkoutLogDetailRow>(
            "SELECT l.id, l.workout_id, l.date, l.notes, l.created_at, \
                    w.name AS workout_name, w.exercises \
             FROM workout_logs l \
             JOIN workouts w ON w.id = l.workout_id AND w.user_id = l.user_id \
             WHERE l.user_id = $1 AND l.date = $2 \
             ORDER BY l.created_at DESC",
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(rows.into_iter().map(WorkoutLogDetail::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_23505_is_a_unique_violation() {
        assert!(is_unique_violation(Some("23505")));
        assert!(!is_unique_violation(Some("23503")));
        assert!(!is_unique_violation(None));
    }

    #[test]
    fn non_database_errors_stay_opaque() {
        assert!(matches!(classify(sqlx::Error::RowNotFound), DbError::Other(_)));
    }
}
