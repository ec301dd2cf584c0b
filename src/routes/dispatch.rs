use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Response,
};
use chrono::Utc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::{
    responses::JsonResponse,
    services::{dispatcher::decode_payload, scheduler::DISPATCH_SECRET_HEADER},
    state::AppState,
};

const TASK_NAME_HEADER: &str = "x-cloudtasks-taskname";
const RETRY_COUNT_HEADER: &str = "x-cloudtasks-taskretrycount";

fn presents_secret(headers: &HeaderMap, expected: &str) -> bool {
    let Some(provided) = headers.get(DISPATCH_SECRET_HEADER) else {
        return false;
    };
    provided.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() == 1
}

/// Target of fired schedule tasks. Only callers holding the dispatch secret
/// get through. Failures answer 500 so the queue's retry policy decides what
/// happens next.
pub async fn send_daily_hadith(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string()
    };
    let task_name = header(TASK_NAME_HEADER);
    let retry_count = header(RETRY_COUNT_HEADER);

    if !presents_secret(&headers, &state.config.dispatch_secret) {
        warn!(%task_name, "rejecting dispatch without a valid secret");
        return JsonResponse::unauthorized("Invalid dispatch credentials");
    }

    let request = match decode_payload(&body) {
        Ok(request) => request,
        Err(err) => {
            warn!(%task_name, error = %err, "rejecting undecodable dispatch payload");
            return JsonResponse::bad_request("Invalid notification payload");
        }
    };
    info!(%task_name, %retry_count, user_id = %request.user_id, "dispatching daily hadith");

    match state.dispatcher.dispatch(&request, Utc::now()).await {
        Ok(_) => JsonResponse::success("Notification sent"),
        Err(_) => JsonResponse::server_error("Failed to send notification"),
    }
}
