use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::utils::time::parse_timezone;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | DATABASE_URL | {WORK_DIR}/database/ledger.db | SQLite 数据库路径 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | (无) | 日志文件目录，设置后按天滚动 |
/// | BUSINESS_TIMEZONE | UTC | 业务时区 (IANA 名称) |
/// | SHEET_SWEEP_INTERVAL_SECS | 300 | 日报表重建间隔 |
/// | UNPAID_WATCHDOG_INTERVAL_SECS | 600 | 未付款检查间隔 |
/// | UNPAID_GRACE_DAYS | 1 | 服务日期后多少天开始提醒 |
/// | SWEEP_ITEM_TIMEOUT_MS | 10000 | 单个司机重建超时 |
/// | ADMIN_NOTIFY_RECIPIENT | (无) | 管理员通知收件人 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时 |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 关闭超时 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/ledger BUSINESS_TIMEZONE=Europe/London cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// SQLite 数据库文件路径
    pub database_url: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 业务时区，"今天" 只在这里计算
    pub timezone: Tz,
    pub sheet_sweep_interval_secs: u64,
    pub unpaid_watchdog_interval_secs: u64,
    pub unpaid_grace_days: u32,
    pub sweep_item_timeout_ms: u64,
    pub admin_notify_recipient: Option<String>,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_url = env_opt("DATABASE_URL").unwrap_or_else(|| {
            PathBuf::from(&work_dir)
                .join("database")
                .join("ledger.db")
                .to_string_lossy()
                .into_owned()
        });

        Self {
            database_url,
            work_dir,
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: env_opt("LOG_DIR"),
            timezone: parse_timezone(&std::env::var("BUSINESS_TIMEZONE").unwrap_or_else(|_| "UTC".into())),
            sheet_sweep_interval_secs: env_or("SHEET_SWEEP_INTERVAL_SECS", 300),
            unpaid_watchdog_interval_secs: env_or("UNPAID_WATCHDOG_INTERVAL_SECS", 600),
            unpaid_grace_days: env_or("UNPAID_GRACE_DAYS", 1),
            sweep_item_timeout_ms: env_or("SWEEP_ITEM_TIMEOUT_MS", 10_000),
            admin_notify_recipient: env_opt("ADMIN_NOTIFY_RECIPIENT"),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10_000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_url = PathBuf::from(&config.work_dir)
            .join("database")
            .join("ledger.db")
            .to_string_lossy()
            .into_owned();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn sweep_item_timeout(&self) -> Duration {
        Duration::from_millis(self.sweep_item_timeout_ms)
    }

    /// 确保数据库和日志目录存在
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        if let Some(parent) = PathBuf::from(&self.database_url).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        if let Some(dir) = &self.log_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
