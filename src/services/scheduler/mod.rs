pub mod errors;

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::schedule_request::{required, CancelRequestPayload, ScheduleRequest};
use crate::models::scheduled_task::{ScheduledRun, ScheduledTask};
use crate::services::task_queue::{QueueError, TaskQueue};
use crate::utils::schedule::{next_occurrence, parse_timezone, TimeOfDay};
use crate::utils::task_name::{task_id, QueuePath};
use errors::ScheduleError;

/// Header carrying the shared secret on every queued delivery.
pub const DISPATCH_SECRET_HEADER: &str = "X-Meshkah-Dispatch-Secret";

/// Where fired tasks are delivered.
#[derive(Debug, Clone)]
pub struct DispatchTarget {
    pub url: String,
    pub oidc_service_account: Option<String>,
    pub secret: String,
}

/// Keeps at most one pending reminder per (user, device).
///
/// `upsert_schedule` hides the delete-then-create pair behind one call. The
/// pair is not atomic. Two concurrent upserts for the same identity can both
/// delete, and the second create then hits the queue's name uniqueness and
/// surfaces as `DuplicateSchedule`.
pub struct NotificationScheduler {
    queue: Arc<dyn TaskQueue>,
    queue_path: QueuePath,
    target: DispatchTarget,
}

impl NotificationScheduler {
    pub fn new(queue: Arc<dyn TaskQueue>, queue_path: QueuePath, target: DispatchTarget) -> Self {
        Self {
            queue,
            queue_path,
            target,
        }
    }

    pub fn task_name_for(&self, user_id: &str, fcm_token: &str) -> String {
        self.queue_path.task_name(&task_id(user_id, fcm_token))
    }

    pub async fn upsert_schedule(
        &self,
        request: ScheduleRequest,
        now: DateTime<Utc>,
    ) -> Result<ScheduledRun, ScheduleError> {
        // Re-check: callers may build the request directly.
        let request = ScheduleRequest {
            user_id: required(Some(request.user_id.as_str()), "userId")?,
            fcm_token: required(Some(request.fcm_token.as_str()), "fcmToken")?,
            time: required(Some(request.time.as_str()), "time")?,
            timezone: required(Some(request.timezone.as_str()), "timezone")?,
        };

        // Resolve before touching the queue so a malformed request never
        // cancels an existing reminder.
        let time = TimeOfDay::parse(&request.time)?;
        let tz = parse_timezone(&request.timezone)?;
        let run_at = next_occurrence(time, tz, now)?;

        let name = self.task_name_for(&request.user_id, &request.fcm_token);
        self.delete_existing(&name, &request.user_id).await?;

        let payload = serde_json::to_vec(&request)
            .map_err(|err| ScheduleError::QueueUnavailable(err.to_string()))?;
        let task = ScheduledTask {
            name: name.clone(),
            url: self.target.url.clone(),
            payload,
            headers: vec![(DISPATCH_SECRET_HEADER.to_string(), self.target.secret.clone())],
            schedule_time: run_at,
            oidc_service_account: self.target.oidc_service_account.clone(),
        };

        if let Err(err) = self.queue.create_task(&task).await {
            warn!(
                task_name = %name,
                user_id = %request.user_id,
                error = %err,
                "failed to create notification task"
            );
            return Err(err.into());
        }

        info!(
            task_name = %name,
            user_id = %request.user_id,
            run_at = %run_at,
            timezone = tz.name(),
            "scheduled daily notification"
        );

        Ok(ScheduledRun {
            task_name: name,
            run_at,
            run_at_local: run_at
                .with_timezone(&tz)
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            timezone: tz.name().to_string(),
        })
    }

    /// Removes the pending reminder for a (user, device) pair, if any.
    pub async fn cancel_schedule(&self, payload: CancelRequestPayload) -> Result<String, ScheduleError> {
        let user_id = required(payload.user_id.as_deref(), "userId")?;
        let fcm_token = required(payload.fcm_token.as_deref(), "fcmToken")?;

        let name = self.task_name_for(&user_id, &fcm_token);
        self.delete_existing(&name, &user_id).await?;
        info!(task_name = %name, user_id = %user_id, "cancelled daily notification");
        Ok(name)
    }

    async fn delete_existing(&self, name: &str, user_id: &str) -> Result<(), ScheduleError> {
        match self.queue.delete_task(name).await {
            Ok(()) => {
                info!(task_name = %name, user_id = %user_id, "deleted previous notification task");
                Ok(())
            }
            Err(QueueError::NotFound(_)) => Ok(()),
            Err(err) => {
                warn!(
                    task_name = %name,
                    user_id = %user_id,
                    error = %err,
                    "failed to delete previous notification task"
                );
                Err(ScheduleError::QueueUnavailable(err.to_string()))
            }
        }
    }
}
