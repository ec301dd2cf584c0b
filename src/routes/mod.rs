pub mod dispatch;
pub mod notifications;
mod schedule_errors;
#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    response::Response,
    routing::{get, post},
    Router,
};

use crate::{responses::JsonResponse, state::AppState};

/// Application routes without transport layers (CORS, rate limiting, tracing).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/scheduleNotification",
            post(notifications::schedule_notification),
        )
        .route("/cancelNotification", post(notifications::cancel_notification))
        .route("/sendDailyHadith", post(dispatch::send_daily_hadith))
        .with_state(state)
}

async fn healthz() -> Response {
    JsonResponse::success("ok")
}
