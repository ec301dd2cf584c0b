pub mod dispatcher;
pub mod gcp_auth;
pub mod hadith_source;
pub mod push;
pub mod scheduler;
pub mod task_queue;
