use sha2::{Digest, Sha256};

pub const TASK_ID_PREFIX: &str = "hadith";
pub const TOKEN_SUFFIX_LEN: usize = 10;
const TASK_ID_HASH_HEX_LEN: usize = 32;

/// Last `TOKEN_SUFFIX_LEN` characters of an FCM registration token.
pub fn token_suffix(fcm_token: &str) -> &str {
    let trimmed = fcm_token.trim();
    let start = trimmed
        .char_indices()
        .rev()
        .nth(TOKEN_SUFFIX_LEN - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &trimmed[start..]
}

/// Deterministic Cloud Tasks task id for a (user, device) pair.
///
/// Hashing keeps the id inside the `[A-Za-z0-9_-]` alphabet Cloud Tasks accepts
/// and keeps distinct pairs distinct even when raw ids contain separators.
pub fn task_id(user_id: &str, fcm_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.trim().as_bytes());
    hasher.update([0u8]);
    hasher.update(token_suffix(fcm_token).as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}-{}", TASK_ID_PREFIX, &digest[..TASK_ID_HASH_HEX_LEN])
}

/// Location of a Cloud Tasks queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuePath {
    pub project_id: String,
    pub location: String,
    pub queue: String,
}

impl QueuePath {
    pub fn parent(&self) -> String {
        format!(
            "projects/{}/locations/{}/queues/{}",
            self.project_id, self.location, self.queue
        )
    }

    pub fn task_name(&self, task_id: &str) -> String {
        format!("{}/tasks/{}", self.parent(), task_id)
    }
}
