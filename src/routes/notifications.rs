use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;

use super::schedule_errors::schedule_error_response;
use crate::{
    models::{
        schedule_request::{CancelRequestPayload, ScheduleRequest, ScheduleRequestPayload},
        scheduled_task::ScheduledRun,
    },
    responses::JsonResponse,
    state::AppState,
};

const SCHEDULE_FAILED: &str = "Failed to schedule notification. Please try again.";
const CANCEL_FAILED: &str = "Failed to cancel notification. Please try again.";

#[derive(Serialize)]
struct ScheduledResponse {
    status: &'static str,
    success: bool,
    message: String,
    #[serde(flatten)]
    run: ScheduledRun,
}

pub async fn schedule_notification(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleRequestPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return JsonResponse::bad_request(&rejection.body_text()),
    };

    let request = match ScheduleRequest::try_from(payload) {
        Ok(request) => request,
        Err(err) => return schedule_error_response(err, SCHEDULE_FAILED),
    };

    match state.scheduler.upsert_schedule(request, Utc::now()).await {
        Ok(run) => {
            let local = run
                .run_at_local
                .get(..16)
                .unwrap_or(&run.run_at_local)
                .replace('T', " ");
            let message = format!("Notification scheduled for {} ({})", local, run.timezone);
            (
                StatusCode::OK,
                Json(ScheduledResponse {
                    status: "success",
                    success: true,
                    message,
                    run,
                }),
            )
                .into_response()
        }
        Err(err) => schedule_error_response(err, SCHEDULE_FAILED),
    }
}

pub async fn cancel_notification(
    State(state): State<AppState>,
    payload: Result<Json<CancelRequestPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return JsonResponse::bad_request(&rejection.body_text()),
    };

    match state.scheduler.cancel_schedule(payload).await {
        Ok(_) => JsonResponse::success("Notification cancelled"),
        Err(err) => schedule_error_response(err, CANCEL_FAILED),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{DateTime, Utc};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::routes::router;
    use crate::routes::test_support::{body_json, json_request, test_state, StubHadithSource};
    use crate::services::push::MockPushSender;
    use crate::services::task_queue::{MockTaskQueue, QueueCall};

    fn app(queue: Arc<MockTaskQueue>) -> axum::Router {
        router(test_state(queue, StubHadithSource(None), MockPushSender::new()))
    }

    const VALID: &str = r#"{"userId":"u1","fcmToken":"device-token-ABCDEFGHIJ","time":"08:00","timezone":"Africa/Cairo"}"#;

    #[tokio::test]
    async fn schedules_and_reports_run_time() {
        let queue = Arc::new(MockTaskQueue::default());
        let resp = app(queue.clone())
            .oneshot(json_request("/scheduleNotification", VALID))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["timezone"], "Africa/Cairo");
        let message = json["message"].as_str().unwrap();
        assert!(message.contains("08:00"), "{message}");
        assert!(message.contains("Africa/Cairo"), "{message}");

        let run_at: DateTime<Utc> = json["runAt"].as_str().unwrap().parse().unwrap();
        assert!(run_at > Utc::now());
        assert_eq!(queue.pending_tasks().len(), 1);
        assert_eq!(json["taskName"], queue.pending_tasks()[0].name.as_str());
    }

    #[tokio::test]
    async fn missing_timezone_is_bad_request_without_queue_calls() {
        let queue = Arc::new(MockTaskQueue::default());
        let resp = app(queue.clone())
            .oneshot(json_request(
                "/scheduleNotification",
                r#"{"userId":"u1","fcmToken":"tok","time":"08:00"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["code"], "missing_field");
        assert!(json["error"].as_str().unwrap().contains("timezone"));
        assert!(queue.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_timezone_is_bad_request() {
        let queue = Arc::new(MockTaskQueue::default());
        let resp = app(queue.clone())
            .oneshot(json_request(
                "/scheduleNotification",
                r#"{"userId":"u1","fcmToken":"tok","time":"08:00","timezone":"Nowhere/City"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["code"], "invalid_timezone");
        assert!(queue.calls().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_time_is_bad_request() {
        let queue = Arc::new(MockTaskQueue::default());
        let resp = app(queue.clone())
            .oneshot(json_request(
                "/scheduleNotification",
                r#"{"userId":"u1","fcmToken":"tok","time":"25:00","timezone":"Africa/Cairo"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["code"], "invalid_time");
        assert!(json["error"].as_str().unwrap().contains("25:00"));
        assert!(queue.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let queue = Arc::new(MockTaskQueue::default());
        let resp = app(queue.clone())
            .oneshot(json_request("/scheduleNotification", "{not json"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(queue.calls().is_empty());
    }

    #[tokio::test]
    async fn queue_failure_is_server_error() {
        let queue = Arc::new(MockTaskQueue {
            fail_delete: true,
            ..Default::default()
        });
        let resp = app(queue.clone())
            .oneshot(json_request("/scheduleNotification", VALID))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["code"], "queue_unavailable");
        assert!(json["error"].as_str().unwrap().starts_with("Failed to schedule"));
        assert_eq!(queue.calls().len(), 1);
    }

    #[tokio::test]
    async fn cancel_queue_failure_names_the_cancel() {
        let queue = Arc::new(MockTaskQueue {
            fail_delete: true,
            ..Default::default()
        });
        let resp = app(queue)
            .oneshot(json_request(
                "/cancelNotification",
                r#"{"userId":"u1","fcmToken":"device-token-ABCDEFGHIJ"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["code"], "queue_unavailable");
        assert!(json["error"].as_str().unwrap().starts_with("Failed to cancel"));
    }

    #[tokio::test]
    async fn duplicate_schedule_is_conflict() {
        let queue = Arc::new(MockTaskQueue {
            concurrent_create: true,
            ..Default::default()
        });
        let resp = app(queue)
            .oneshot(json_request("/scheduleNotification", VALID))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["code"], "duplicate_schedule");
    }

    #[tokio::test]
    async fn resubmitting_replaces_previous_task() {
        let queue = Arc::new(MockTaskQueue::default());
        for _ in 0..2 {
            let resp = app(queue.clone())
                .oneshot(json_request("/scheduleNotification", VALID))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }
        assert_eq!(queue.pending_tasks().len(), 1);
        let calls = queue.calls();
        assert!(matches!(
            calls.as_slice(),
            [QueueCall::Delete(_), QueueCall::Create(_), QueueCall::Delete(_), QueueCall::Create(_)]
        ));
    }

    #[tokio::test]
    async fn cancel_removes_pending_task() {
        let queue = Arc::new(MockTaskQueue::default());
        app(queue.clone())
            .oneshot(json_request("/scheduleNotification", VALID))
            .await
            .unwrap();

        let resp = app(queue.clone())
            .oneshot(json_request(
                "/cancelNotification",
                r#"{"userId":"u1","fcmToken":"device-token-ABCDEFGHIJ"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(queue.pending_tasks().is_empty());
    }

    #[tokio::test]
    async fn cancel_without_token_is_bad_request() {
        let queue = Arc::new(MockTaskQueue::default());
        let resp = app(queue.clone())
            .oneshot(json_request("/cancelNotification", r#"{"userId":"u1"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(queue.calls().is_empty());
    }
}
