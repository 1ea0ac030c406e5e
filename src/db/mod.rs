//! Storage collaborator. Handlers only see the [`WorkoutStore`] trait; every
//! operation is scoped by the owning user's id.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::workout::{NewWorkout, Workout};
use crate::models::workout_log::{NewWorkoutLog, WorkoutLog, WorkoutLogDetail};
use crate::utils::dates::MonthRange;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Name of the (user, workout, date) uniqueness constraint on `workout_logs`.
pub const LOG_UNIQUE_CONSTRAINT: &str = "workout_logs_user_workout_date_key";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Unique constraint violation ({constraint:?})")]
    UniqueViolation { constraint: Option<String> },

    #[error(transparent)]
    Other(#[from] sqlx::Error),
}

#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Newest first.
    async fn list_workouts(&self, user_id: Uuid, limit: Option<i64>) -> Result<Vec<Workout>, DbError>;

    async fn find_workout(&self, user_id: Uuid, workout_id: Uuid) -> Result<Option<Workout>, DbError>;

    async fn insert_workout(&self, user_id: Uuid, workout: &NewWorkout) -> Result<Workout, DbError>;

    /// Fails with [`DbError::UniqueViolation`] when the user already logged
    /// this workout on that date.
    async fn insert_log(&self, user_id: Uuid, log: &NewWorkoutLog) -> Result<WorkoutLog, DbError>;

    /// Dates of every log with `range.start <= date < range.end`, duplicates included.
    async fn log_dates_in_range(&self, user_id: Uuid, range: &MonthRange) -> Result<Vec<NaiveDate>, DbError>;

    /// Logs on exactly `date` joined with their workout, newest first.
    async fn logs_on_date(&self, user_id: Uuid, date: NaiveDate) -> Result<Vec<WorkoutLogDetail>, DbError>;
}
