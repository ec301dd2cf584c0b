use axum::{http::StatusCode, response::Response};
use tracing::error;

use crate::{responses::JsonResponse, services::scheduler::errors::ScheduleError};

/// Maps a scheduler error to its HTTP response. `failure` is the message
/// shown when the queue itself fails.
pub(crate) fn schedule_error_response(err: ScheduleError, failure: &str) -> Response {
    match err {
        ScheduleError::MissingField(field) => JsonResponse::error_with_code(
            StatusCode::BAD_REQUEST,
            &format!("Missing required field: {field}"),
            "missing_field",
        ),
        ScheduleError::InvalidTimezone(zone) => JsonResponse::error_with_code(
            StatusCode::BAD_REQUEST,
            &format!("Unknown timezone: {zone}"),
            "invalid_timezone",
        ),
        ScheduleError::InvalidTimeOfDay(time) => JsonResponse::error_with_code(
            StatusCode::BAD_REQUEST,
            &format!("Invalid time of day (expected HH:MM): {time}"),
            "invalid_time",
        ),
        ScheduleError::DuplicateSchedule(name) => {
            tracing::warn!(task_name = %name, "schedule raced with a concurrent request");
            JsonResponse::error_with_code(
                StatusCode::CONFLICT,
                "A notification is already scheduled for this device",
                "duplicate_schedule",
            )
        }
        ScheduleError::QueueUnavailable(err) => {
            error!(%err, "task queue request failed");
            JsonResponse::error_with_code(StatusCode::INTERNAL_SERVER_ERROR, failure, "queue_unavailable")
        }
    }
}
