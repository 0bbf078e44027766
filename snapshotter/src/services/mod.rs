
pub mod notification_service;

pub use notification_service::{
    notify_best_effort, NotificationChannel, NotificationService, NotificationSink, Severity,
};
