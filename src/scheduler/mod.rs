//! Same-day reminder scheduling.

pub mod consumer;
pub mod reminder_scheduler;

pub use reminder_scheduler::ReminderScheduler;
