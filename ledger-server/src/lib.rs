//! Haulage Ledger Server - 垃圾清运每日任务台账
//!
//! # 架构概述
//!
//! - **任务** (`ledger::tasks`): 客户订单、明细、付款、照片
//! - **车辆索引** (`ledger::registry`): 按日期分配任务和倾倒申请，
//!   同一任务同时只属于一辆车
//! - **日报表** (`ledger::builder`): 每个司机每天一张，按状态分桶
//! - **状态对账** (`ledger::reconcile`): 状态变更时移动日报表中的任务，
//!   并重算现金合计
//! - **工资结算** (`payroll`): 开班/收班、加班计算、累计台账
//! - **后台巡检** (`sweeps`): 定时生成日报表，提醒未付款任务
//!
//! # 模块结构
//!
//! ```text
//! ledger-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # SQLite 连接池和仓储
//! ├── ledger/        # 任务、车辆、日报表、对账
//! ├── services/      # 通知
//! ├── utils/         # 日志、时间、校验
//! ├── money.rs       # 金额计算
//! ├── payroll.rs     # 工资结算
//! └── sweeps.rs      # 定时巡检
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod ledger;
pub mod money;
pub mod payroll;
pub mod services;
pub mod sweeps;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use ledger::SheetBuilder;
pub use services::{LogNotifier, Notification, NotificationService, Notifier};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 加载 `.env` 并初始化日志
///
/// 日志级别和目录来自 `LOG_LEVEL` / `LOG_DIR`，生产环境输出 JSON。
pub fn setup_environment() -> anyhow::Result<()> {
    // .env 不存在时忽略
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty());
    let json = std::env::var("ENVIRONMENT").is_ok_and(|e| e == "production");

    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(log_level.as_deref(), json, log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __             __
   / /   ___  ____/ /___ ____  _____
  / /   / _ \/ __  / __ `/ _ \/ ___/
 / /___/  __/ /_/ / /_/ /  __/ /
/_____/\___/\__,_/\__, /\___/_/
                 /____/
    "#
    );
}
