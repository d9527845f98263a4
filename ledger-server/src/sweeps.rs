//! 定时扫描
//!
//! - [`DailySheetSweep`]: 周期性重建今天的所有司机日报表
//! - [`UnpaidJobWatchdog`]: 已完成但逾期未付款的任务提醒管理员
//!
//! 两者都注册为 `JobKind::Periodic`，在 `start_background_tasks()` 中启动。

use std::time::Duration;

use chrono::Days;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::core::ServerState;
use crate::db::repository::task;
use crate::money;
use crate::services::Notification;
use crate::utils::time::{self, date_key};

/// 同一任务两次提醒之间的最短间隔
const REMINDER_INTERVAL_MS: i64 = 24 * 60 * 60 * 1000;

/// 间隔为 0 时 `tokio::time::interval` 会 panic
fn tick_interval(secs: u64) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(Duration::from_secs(secs.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval
}

/// 日报表重建调度器
pub struct DailySheetSweep {
    state: ServerState,
    shutdown: CancellationToken,
}

impl DailySheetSweep {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    /// 主循环：启动时立即执行一次，之后按间隔执行
    pub async fn run(self) {
        let secs = self.state.config.sheet_sweep_interval_secs;
        tracing::info!(interval_secs = secs, "Daily sheet sweep started");
        let mut interval = tick_interval(secs);

        loop {
            tokio::select! {
                _ = interval.tick() => self.run_once().await,
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Daily sheet sweep received shutdown signal");
                    return;
                }
            }
        }
    }

    async fn run_once(&self) {
        let today = time::today(self.state.config.timezone);
        match self.state.sheets.generate_all(today).await {
            Ok(summary) if !summary.failed.is_empty() => {
                tracing::warn!(
                    date = %date_key(today),
                    generated = summary.generated.len(),
                    failed = summary.failed.len(),
                    "Daily sheet sweep finished with failures"
                );
            }
            Ok(summary) => {
                tracing::debug!(date = %date_key(today), generated = summary.generated.len(), "Daily sheet sweep finished");
            }
            Err(e) => tracing::error!(error = %e, "Daily sheet sweep failed"),
        }
    }
}

/// 逾期未付款提醒
pub struct UnpaidJobWatchdog {
    state: ServerState,
    shutdown: CancellationToken,
}

impl UnpaidJobWatchdog {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    pub async fn run(self) {
        let secs = self.state.config.unpaid_watchdog_interval_secs;
        tracing::info!(interval_secs = secs, "Unpaid job watchdog started");
        let mut interval = tick_interval(secs);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_once().await {
                        tracing::error!(error = %e, "Unpaid job check failed");
                    }
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Unpaid job watchdog received shutdown signal");
                    return;
                }
            }
        }
    }

    /// 执行一次检查，返回已派发的提醒数量
    ///
    /// 未配置管理员收件人时不标记任务，配置后仍会提醒。
    pub async fn run_once(&self) -> crate::utils::AppResult<usize> {
        let config = &self.state.config;
        let today = time::today(config.timezone);
        let cutoff = today
            .checked_sub_days(Days::new(u64::from(config.unpaid_grace_days)))
            .unwrap_or(today);
        let now = shared::util::now_millis();

        let overdue = task::find_unpaid_completed(&self.state.pool, cutoff, now - REMINDER_INTERVAL_MS).await?;
        if overdue.is_empty() {
            tracing::debug!("No overdue unpaid jobs");
            return Ok(0);
        }
        if self.state.notifications.admin_recipient().is_none() {
            tracing::debug!(count = overdue.len(), "Overdue unpaid jobs found but no admin recipient configured");
            return Ok(0);
        }

        let mut sent = 0;
        for t in overdue {
            let due = (money::to_decimal(t.total_price) - money::to_decimal(t.cash_received)).max(Decimal::ZERO);
            let reminder = Notification::UnpaidJobReminder {
                task_id: t.id,
                order_number: t.order_number,
                client_name: t.client_name.clone(),
                service_date: t.service_date.map(date_key),
                amount_due: money::to_f64(due),
            };
            if self.state.notifications.notify_admin(reminder) {
                task::mark_reminded(&self.state.pool, t.id, now).await?;
                sent += 1;
            }
        }
        tracing::info!(count = sent, "Unpaid job reminders dispatched");
        Ok(sent)
    }
}
