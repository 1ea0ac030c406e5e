use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{DbError, WorkoutStore, LOG_UNIQUE_CONSTRAINT};
use crate::models::workout::{NewWorkout, Workout};
use crate::models::workout_log::{LoggedWorkout, NewWorkoutLog, WorkoutLog, WorkoutLogDetail};
use crate::utils::dates::MonthRange;

/// Process-local store with the same constraints as the Postgres schema.
/// Used by the test suite and by `STORAGE=memory` for local runs.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    workouts: Vec<Workout>,
    logs: Vec<WorkoutLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WorkoutStore for MemoryStore {
    async fn list_workouts(&self, user_id: Uuid, limit: Option<i64>) -> Result<Vec<Workout>, DbError> {
        let tables = self.tables();
        let mut workouts: Vec<Workout> = tables
            .workouts
            .iter()
            .rev()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        workouts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            workouts.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(workouts)
    }

    async fn find_workout(&self, user_id: Uuid, workout_id: Uuid) -> Result<Option<Workout>, DbError> {
        Ok(self
            .tables()
            .workouts
            .iter()
            .find(|w| w.id == workout_id && w.user_id == user_id)
            .cloned())
    }

    async fn insert_workout(&self, user_id: Uuid, workout: &NewWorkout) -> Result<Workout, DbError> {
        let now = Utc::now();
        let created = Workout {
            id: Uuid::now_v7(),
            user_id,
            name: workout.name.clone(),
            exercises: workout.exercises.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables().workouts.push(created.clone());
        Ok(created)
    }

    async fn insert_log(&self, user_id: Uuid, log: &NewWorkoutLog) -> Result<WorkoutLog, DbError> {
        let mut tables = self.tables();
        let duplicate = tables
            .logs
            .iter()
            .any(|l| l.user_id == user_id && l.workout_id == log.workout_id && l.date == log.date);
        if duplicate {
            return Err(DbError::UniqueViolation {
                constraint: Some(LOG_UNIQUE_CONSTRAINT.to_string()),
            });
        }

        let created = WorkoutLog {
            id: Uuid::now_v7(),
            user_id,
            workout_id: log.workout_id,
            date: log.date,
            notes: log.notes.clone(),
            created_at: Utc::now(),
        };
        tables.logs.push(created.clone());
        Ok(created)
    }

    async fn log_dates_in_range(&self, user_id: Uuid, range: &MonthRange) -> Result<Vec<NaiveDate>, DbError> {
        Ok(self
            .tables()
            .logs
            .iter()
            .filter(|l| l.user_id == user_id && range.contains(l.date))
            .map(|l| l.date)
            .collect())
    }

    async fn logs_on_date(&self, user_id: Uuid, date: NaiveDate) -> Result<Vec<WorkoutLogDetail>, DbError> {
        let tables = self.tables();
        let mut details: Vec<WorkoutLogDetail> = tables
            .logs
            .iter()
            .rev()
            .filter(|l| l.user_id == user_id && l.date == date)
            .filter_map(|l| {
                let workout = tables
                    .workouts
                    .iter()
                    .find(|w| w.id == l.workout_id && w.user_id == user_id)?;
                Some(WorkoutLogDetail {
                    id: l.id,
                    workout_id: l.workout_id,
                    date: l.date,
                    notes: l.notes.clone(),
                    created_at: l.created_at,
                    workout: LoggedWorkout {
                        id: workout.id,
                        name: workout.name.clone(),
                        exercises: workout.exercises.clone(),
                    },
                })
            })
            .collect();
        details.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(details)
    }
}
