pub mod schedule;
pub mod task_name;
