use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, Utc};

use super::workout::Exercise;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_id: Uuid,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWorkoutLog {
    pub workout_id: Uuid,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

/// The parent workout as shown next to a log entry.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LoggedWorkout {
    pub id: Uuid,
    pub name: String,
    pub exercises: Vec<Exercise>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WorkoutLogDetail {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
    pub workout: LoggedWorkout,
}

#[derive(sqlx::FromRow, Debug)]
pub struct WorkoutLogDetailRow {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
    pub workout_name: String,
    pub exercises: sqlx::types::Json<Vec<Exercise>>,
}

impl From<WorkoutLogDetailRow> for WorkoutLogDetail {
    fn from(row: WorkoutLogDetailRow) -> Self {
        WorkoutLogDetail {
            id: row.id,
            workout_id: row.workout_id,
            date: row.date,
            notes: row.notes,
            created_at: row.created_at,
            workout: LoggedWorkout {
                id: row.workout_id,
                name: row.workout_name,
                exercises: row.exercises.0,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct GetLogDate {
    pub date: NaiveDate,
}
