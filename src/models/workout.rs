use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::Utc;

/// One movement inside a workout. Stored embedded in the workout row, never on its own.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Exercise {
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    /// Kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Exercise {
    pub fn total_reps(&self) -> i64 {
        i64::from(self.sets) * i64::from(self.reps)
    }

    /// `sets * reps * weight`; only defined for weighted exercises and
    /// finite results.
    pub fn volume(&self) -> Option<f64> {
        self.weight
            .map(|w| self.total_reps() as f64 * w)
            .filter(|v| v.is_finite())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub exercises: Vec<Exercise>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

/// Validated input for a workout insert.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub name: String,
    pub exercises: Vec<Exercise>,
}

#[derive(sqlx::FromRow, Debug)]
pub struct WorkoutRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub exercises: sqlx::types::Json<Vec<Exercise>>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl From<WorkoutRow> for Workout {
    fn from(row: WorkoutRow) -> Self {
        Workout {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            exercises: row.exercises.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(weight: Option<f64>) -> Exercise {
        Exercise { name: "Bench Press".into(), sets: 3, reps: 10, weight }
    }

    #[test]
    fn volume_requires_weight() {
        assert_eq!(exercise(Some(60.0)).volume(), Some(1800.0));
        assert_eq!(exercise(None).volume(), None);
        assert_eq!(exercise(None).total_reps(), 30);
    }

    #[test]
    fn overflowing_volume_is_undefined() {
        let huge = Exercise { name: "Leg Press".into(), sets: i32::MAX, reps: i32::MAX, weight: Some(f64::MAX) };
        assert_eq!(huge.volume(), None);
        assert_eq!(huge.total_reps(), i64::from(i32::MAX) * i64::from(i32::MAX));
    }

    #[test]
    fn missing_weight_is_omitted_from_json() {
        let json = serde_json::to_value(exercise(None)).unwrap();
        assert!(json.get("weight").is_none());

        let json = serde_json::to_value(exercise(Some(0.0))).unwrap();
        assert_eq!(json["weight"], 0.0);
    }
}
