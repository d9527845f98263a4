use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::tasks::{BackgroundTasks, JobKind};
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::ledger::SheetBuilder;
use crate::services::{LogNotifier, NotificationService};
use crate::sweeps::{DailySheetSweep, UnpaidJobWatchdog};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是廉价 clone (连接池和 Arc)。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | notifications | NotificationService | 通知派发 |
/// | sheets | SheetBuilder | 日报表生成器 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub notifications: NotificationService,
    pub sheets: SheetBuilder,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`]；测试用它注入内存数据库和通知通道
    pub fn new(config: Config, pool: SqlitePool, notifications: NotificationService) -> Self {
        let sheets = SheetBuilder::new(pool.clone(), config.timezone, config.sweep_item_timeout());
        Self {
            config,
            pool,
            notifications,
            sheets,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 确保数据库/日志目录存在
    /// 2. 打开数据库并执行迁移
    /// 3. 通知服务 (日志通道，收件人来自配置)
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_dirs()?;

        let db = DbService::new(&config.database_url).await?;
        let notifications = NotificationService::new(
            Arc::new(LogNotifier),
            config.admin_notify_recipient.clone(),
        );
        if config.admin_notify_recipient.is_none() {
            tracing::warn!("ADMIN_NOTIFY_RECIPIENT not set, admin notifications are disabled");
        }

        Ok(Self::new(config.clone(), db.pool, notifications))
    }

    /// 启动后台任务
    ///
    /// - 日报表重建 (DailySheetSweep)
    /// - 未付款提醒 (UnpaidJobWatchdog)
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let sweep = DailySheetSweep::new(self.clone(), tasks.shutdown_token());
        tasks.spawn("daily_sheet_sweep", JobKind::Periodic, sweep.run());

        let watchdog = UnpaidJobWatchdog::new(self.clone(), tasks.shutdown_token());
        tasks.spawn("unpaid_job_watchdog", JobKind::Periodic, watchdog.run());

        tasks.log_summary();
        tasks
    }
}
