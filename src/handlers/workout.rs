use actix_web::{web, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::WorkoutStore;
use crate::errors::AppError;
use crate::models::workout::{Exercise, NewWorkout, Workout};
use crate::utils::jwt::CurrentUser;
use crate::utils::validation::{validate_limit, validate_payload};

#[derive(Deserialize, Validate)]
pub struct ExerciseRequest {
    #[validate(length(min = 1, message = "Exercise name is required"))]
    name: String,

    #[validate(range(min = 1, message = "Sets must be a positive integer"))]
    sets: i32,

    #[validate(range(min = 1, message = "Reps must be a positive integer"))]
    reps: i32,

    #[validate(range(min = 0.0, max = 1000.0, message = "Weight must be between 0 and 1000"))]
    weight: Option<f64>,
}

#[derive(Deserialize, Validate)]
pub struct CreateWorkoutRequest {
    #[validate(length(min = 1, message = "Workout name is required"))]
    name: String,

    #[validate]
    exercises: Vec<ExerciseRequest>,
}

impl From<CreateWorkoutRequest> for NewWorkout {
    fn from(req: CreateWorkoutRequest) -> Self {
        NewWorkout {
            name: req.name,
            exercises: req
                .exercises
                .into_iter()
                .map(|e| Exercise {
                    name: e.name,
                    sets: e.sets,
                    reps: e.reps,
                    weight: e.weight,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct GetWorkoutsQuery {
    limit: Option<i64>,
}

#[derive(Serialize)]
struct ExerciseTotal {
    name: String,
    total_reps: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume: Option<f64>,
}

#[derive(Serialize)]
struct WorkoutDetailResponse {
    #[serde(flatten)]
    workout: Workout,
    totals: Vec<ExerciseTotal>,
}

// GET /v1/workouts
pub async fn get_workouts(
    user: CurrentUser,
    store: web::Data<dyn WorkoutStore>,
    query: web::Query<GetWorkoutsQuery>,
) -> Result<HttpResponse, AppError> {
    if let Some(limit) = query.limit {
        validate_limit(limit)?;
    }

    let workouts = store.list_workouts(user.user_id, query.limit).await?;

    Ok(HttpResponse::Ok().json(workouts))
}

// POST /v1/workouts
pub async fn create_workout(
    user: CurrentUser,
    store: web::Data<dyn WorkoutStore>,
    payload: web::Json<CreateWorkoutRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;

    let new_workout = NewWorkout::from(payload.into_inner());
    let workout = store.insert_workout(user.user_id, &new_workout).await?;
    info!("Created workout {} for user {}", workout.id, user.user_id);

    Ok(HttpResponse::Created().json(workout))
}

// GET /v1/workouts/{id}
pub async fn get_workout(
    user: CurrentUser,
    store: web::Data<dyn WorkoutStore>,
    workout_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let workout = store
        .find_workout(user.user_id, *workout_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))?;

    let totals = workout
        .exercises
        .iter()
        .map(|e| ExerciseTotal {
            name: e.name.clone(),
            total_reps: e.total_reps(),
            volume: e.volume(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(WorkoutDetailResponse { workout, totals }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::field_messages;

    fn request(json: serde_json::Value) -> CreateWorkoutRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn valid_request_passes_unchanged() {
        let req = request(serde_json::json!({
            "name": "Push Day",
            "exercises": [{"name": "Bench Press", "sets": 3, "reps": 10, "weight": 60}]
        }));
        assert!(req.validate().is_ok());

        let new_workout = NewWorkout::from(req);
        assert_eq!(new_workout.name, "Push Day");
        assert_eq!(new_workout.exercises[0].weight, Some(60.0));
    }

    #[test]
    fn every_bad_field_is_reported() {
        let req = request(serde_json::json!({
            "name": "",
            "exercises": [
                {"name": "Squat", "sets": 5, "reps": 5},
                {"name": "", "sets": 0, "reps": -1, "weight": -2.5}
            ]
        }));
        let errs = req.validate().unwrap_err();
        let fields = field_messages(&errs);

        assert_eq!(fields["name"], vec!["Workout name is required"]);
        assert_eq!(fields["exercises[1].name"], vec!["Exercise name is required"]);
        assert_eq!(fields["exercises[1].sets"], vec!["Sets must be a positive integer"]);
        assert_eq!(fields["exercises[1].reps"], vec!["Reps must be a positive integer"]);
        assert_eq!(fields["exercises[1].weight"], vec!["Weight must be between 0 and 1000"]);
        assert!(!fields.keys().any(|k| k.starts_with("exercises[0]")));
    }

    #[test]
    fn zero_weight_and_no_exercises_are_allowed() {
        let req = request(serde_json::json!({
            "name": "Mobility",
            "exercises": [{"name": "Plank", "sets": 3, "reps": 1, "weight": 0}]
        }));
        assert!(req.validate().is_ok());

        let req = request(serde_json::json!({"name": "Rest", "exercises": []}));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn weight_is_capped() {
        let req = request(serde_json::json!({
            "name": "Strongman",
            "exercises": [{"name": "Deadlift", "sets": 1, "reps": 1, "weight": 1000}]
        }));
        assert!(req.validate().is_ok());

        let req = request(serde_json::json!({
            "name": "Strongman",
            "exercises": [{"name": "Deadlift", "sets": 1, "reps": 1, "weight": 1e308}]
        }));
        let fields = field_messages(&req.validate().unwrap_err());
        assert_eq!(fields["exercises[0].weight"], vec!["Weight must be between 0 and 1000"]);
    }

    #[test]
    fn fractional_sets_do_not_deserialize() {
        let parsed = serde_json::from_value::<CreateWorkoutRequest>(serde_json::json!({
            "name": "Push Day",
            "exercises": [{"name": "Bench Press", "sets": 2.5, "reps": 10}]
        }));
        assert!(parsed.is_err());
    }
}
