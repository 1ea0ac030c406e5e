use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{info, warn};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::db::{DbError, WorkoutStore};
use crate::errors::AppError;
use crate::models::workout_log::{NewWorkoutLog, WorkoutLog};
use crate::utils::dates::{distinct_dates, local_today, parse_log_date, MonthRange};
use crate::utils::jwt::CurrentUser;
use crate::utils::validation::{validate_calendar_date, validate_payload, validate_uuid, DATE_RE};

#[derive(Deserialize, Validate)]
pub struct CreateWorkoutLogRequest {
    #[validate(custom(function = "validate_uuid", message = "Invalid workout ID"))]
    workout_id: String,

    #[validate(regex(path = "DATE_RE", message = "Date must be in YYYY-MM-DD format"))]
    #[validate(custom(function = "validate_calendar_date", message = "Date is not a valid calendar day"))]
    date: String,

    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize)]
pub struct LoggedDatesQuery {
    year: Option<i32>,
    month: Option<u32>,
}

#[derive(Deserialize)]
pub struct LogsByDateQuery {
    date: Option<String>,
}

#[derive(Deserialize)]
pub struct LogTodayQuery {
    utc_offset_minutes: Option<i32>,
}

/// Ownership check, then insert. The two steps are not atomic; the unique
/// constraint on (user, workout, date) settles concurrent duplicates.
async fn record_log(
    store: &dyn WorkoutStore,
    user: CurrentUser,
    new_log: NewWorkoutLog,
) -> Result<WorkoutLog, AppError> {
    store
        .find_workout(user.user_id, new_log.workout_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))?;

    match store.insert_log(user.user_id, &new_log).await {
        Ok(log) => {
            info!("Logged workout {} on {} for user {}", log.workout_id, log.date, user.user_id);
            Ok(log)
        }
        Err(DbError::UniqueViolation { .. }) => {
            warn!("Duplicate log for workout {} on {}", new_log.workout_id, new_log.date);
            Err(AppError::Conflict("Workout already logged for this date".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

// GET /v1/workout-logs?year=&month=
pub async fn get_logged_dates(
    user: CurrentUser,
    store: web::Data<dyn WorkoutStore>,
    query: web::Query<LoggedDatesQuery>,
) -> Result<HttpResponse, AppError> {
    let (year, month) = match (query.year, query.month) {
        (Some(year), Some(month)) => (year, month),
        _ => return Err(AppError::BadRequest("Year and month parameters are required".to_string())),
    };
    let range = MonthRange::new(year, month)?;

    let dates = store.log_dates_in_range(user.user_id, &range).await?;

    Ok(HttpResponse::Ok().json(distinct_dates(dates)))
}

// POST /v1/workout-logs
pub async fn create_workout_log(
    user: CurrentUser,
    store: web::Data<dyn WorkoutStore>,
    payload: web::Json<CreateWorkoutLogRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let payload = payload.into_inner();

    // Both already validated above
    let workout_id = Uuid::parse_str(&payload.workout_id)
        .map_err(|_| AppError::BadRequest("Invalid workout ID".to_string()))?;
    let date = parse_log_date(&payload.date)?;

    let new_log = NewWorkoutLog {
        workout_id,
        date,
        notes: payload.notes.filter(|n| !n.is_empty()),
    };
    let log = record_log(store.get_ref(), user, new_log).await?;

    Ok(HttpResponse::Created().json(log))
}

// GET /v1/workout-logs/by-date?date=YYYY-MM-DD
pub async fn get_logs_by_date(
    user: CurrentUser,
    store: web::Data<dyn WorkoutStore>,
    query: web::Query<LogsByDateQuery>,
) -> Result<HttpResponse, AppError> {
    let date = query
        .date
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Date parameter is required (YYYY-MM-DD)".to_string()))
        .and_then(parse_log_date)?;

    let logs = store.logs_on_date(user.user_id, date).await?;

    Ok(HttpResponse::Ok().json(logs))
}

// POST /v1/workouts/{id}/log-today
pub async fn log_today(
    user: CurrentUser,
    store: web::Data<dyn WorkoutStore>,
    workout_id: web::Path<Uuid>,
    query: web::Query<LogTodayQuery>,
) -> Result<HttpResponse, AppError> {
    let date = local_today(Utc::now(), query.utc_offset_minutes)?;

    let new_log = NewWorkoutLog {
        workout_id: *workout_id,
        date,
        notes: None,
    };
    let log = record_log(store.get_ref(), user, new_log).await?;

    Ok(HttpResponse::Created().json(log))
}
