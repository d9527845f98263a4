//! Notification dispatch
//!
//! 通知是 fire-and-forget: 发送在独立任务里执行，失败只记录日志，
//! 不影响触发它的业务操作。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// 通知事件
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    /// 已完成但未付款的任务
    UnpaidJobReminder {
        task_id: i64,
        order_number: i64,
        client_name: String,
        service_date: Option<String>,
        amount_due: f64,
    },
    /// 班次结束摘要
    ShiftEnded {
        user_id: i64,
        payroll_id: i64,
        total_hours: f64,
        salary: f64,
        total_cash: f64,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnpaidJobReminder { .. } => "unpaid_job_reminder",
            Self::ShiftEnded { .. } => "shift_ended",
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// 通知通道 (email, push, ...)
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, notification: &Notification) -> Result<(), NotifyError>;
}

/// 默认通道: 写结构化日志
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, notification: &Notification) -> Result<(), NotifyError> {
        if recipient.trim().is_empty() {
            return Err(NotifyError::InvalidRecipient(recipient.to_string()));
        }
        let payload = serde_json::to_string(notification)
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        tracing::info!(
            target: "notify",
            recipient,
            kind = notification.kind(),
            payload = %payload,
            "Notification"
        );
        Ok(())
    }
}

/// 通知服务
///
/// 持有通道和管理员收件人 (来自 `ADMIN_NOTIFY_RECIPIENT`)。
#[derive(Clone)]
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
    admin_recipient: Option<String>,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>, admin_recipient: Option<String>) -> Self {
        Self {
            notifier,
            admin_recipient,
        }
    }

    pub fn admin_recipient(&self) -> Option<&str> {
        self.admin_recipient.as_deref()
    }

    /// 发给管理员；未配置收件人时跳过
    ///
    /// 返回是否已派发。
    pub fn notify_admin(&self, notification: Notification) -> bool {
        match &self.admin_recipient {
            Some(recipient) => {
                self.dispatch(recipient.clone(), notification);
                true
            }
            None => {
                tracing::debug!(kind = notification.kind(), "No admin recipient configured, notification skipped");
                false
            }
        }
    }

    /// 在后台任务中发送，失败只记录
    pub fn dispatch(&self, recipient: String, notification: Notification) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&recipient, &notification).await {
                tracing::warn!(
                    recipient = %recipient,
                    kind = notification.kind(),
                    error = %e,
                    "Notification delivery failed"
                );
            }
        });
    }
}
