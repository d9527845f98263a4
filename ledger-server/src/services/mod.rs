//! 服务层
//!
//! - [`NotificationService`] - 通知派发 (fire-and-forget)

pub mod notifier;

pub use notifier::{LogNotifier, Notification, NotificationService, Notifier, NotifyError};
