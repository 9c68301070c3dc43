pub mod selection_scheduler;
pub mod target_queue;

pub use selection_scheduler::{RunReport, SchedulerTiming, SelectionScheduler, Termination};
pub use target_queue::TargetQueue;
