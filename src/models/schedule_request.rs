use serde::{Deserialize, Serialize};

use crate::services::scheduler::errors::ScheduleError;

/// Inbound schedule body. Every field is optional so absence is reported as
/// `MissingField` rather than as a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequestPayload {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub fcm_token: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Validated schedule request. Also the payload carried by the queued task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub user_id: String,
    pub fcm_token: String,
    pub time: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequestPayload {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub fcm_token: Option<String>,
}

pub(crate) fn required(
    value: Option<&str>,
    field: &'static str,
) -> Result<String, ScheduleError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ScheduleError::MissingField(field)),
    }
}

impl TryFrom<ScheduleRequestPayload> for ScheduleRequest {
    type Error = ScheduleError;

    fn try_from(payload: ScheduleRequestPayload) -> Result<Self, Self::Error> {
        Ok(ScheduleRequest {
            user_id: required(payload.user_id.as_deref(), "userId")?,
            fcm_token: required(payload.fcm_token.as_deref(), "fcmToken")?,
            time: required(payload.time.as_deref(), "time")?,
            timezone: required(payload.timezone.as_deref(), "timezone")?,
        })
    }
}
