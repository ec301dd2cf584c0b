pub mod hadith;
pub mod schedule_request;
pub mod scheduled_task;
