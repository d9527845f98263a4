//! 后台任务管理
//!
//! 统一管理后台任务的注册、启动和关闭。所有任务共享一个
//! [`CancellationToken`]，关闭时先取消再等待。

use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 后台任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// 长期后台工作者
    Worker,
    /// 定时任务
    Periodic,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Worker => write!(f, "Worker"),
            JobKind::Periodic => write!(f, "Periodic"),
        }
    }
}

struct RegisteredJob {
    name: &'static str,
    kind: JobKind,
    handle: JoinHandle<()>,
}

/// 后台任务管理器
///
/// ```ignore
/// let mut jobs = BackgroundTasks::new();
/// let token = jobs.shutdown_token();
/// jobs.spawn("daily_sheet_sweep", JobKind::Periodic, sweep.run(token));
/// jobs.shutdown(Duration::from_secs(10)).await;
/// ```
pub struct BackgroundTasks {
    jobs: Vec<RegisteredJob>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// 获取取消令牌（用于任务内部监听 shutdown 信号）
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 注册并启动一个后台任务
    ///
    /// 任务会被包装以捕获 panic。在取消信号之前退出的任务记 warn。
    pub fn spawn<F>(&mut self, name: &'static str, kind: JobKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        let wrapped = async move {
            let result: Result<(), Box<dyn std::any::Any + Send>> =
                AssertUnwindSafe(future).catch_unwind().await;
            match result {
                Ok(()) if token.is_cancelled() => {
                    tracing::debug!(task = %name, kind = %kind, "Background task stopped");
                }
                Ok(()) => {
                    tracing::warn!(task = %name, kind = %kind, "Background task completed unexpectedly");
                }
                Err(panic_info) => {
                    let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(task = %name, kind = %kind, panic = %panic_msg, "Background task panicked");
                }
            }
        };

        let handle = tokio::spawn(wrapped);
        tracing::debug!(task = %name, kind = %kind, "Registered background task");
        self.jobs.push(RegisteredJob { name, kind, handle });
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// 打印任务摘要
    pub fn log_summary(&self) {
        let periodic = self
            .jobs
            .iter()
            .filter(|j| j.kind == JobKind::Periodic)
            .count();
        tracing::info!(
            total = self.jobs.len(),
            periodic,
            worker = self.jobs.len() - periodic,
            "Background tasks registered"
        );
    }

    /// 返回已异常结束的任务数量
    pub fn check_health(&self) -> usize {
        let failed = self
            .jobs
            .iter()
            .filter(|j| j.handle.is_finished())
            .inspect(|j| tracing::error!(task = %j.name, kind = %j.kind, "Background task finished unexpectedly"))
            .count();
        if failed > 0 {
            tracing::error!(failed, total = self.jobs.len(), "Background task health check failed");
        }
        failed
    }

    /// Graceful shutdown - 取消所有任务，在 `timeout` 内等待完成
    ///
    /// 超时仍未结束的任务被 abort。
    pub async fn shutdown(self, timeout: Duration) {
        tracing::info!(count = self.jobs.len(), "Shutting down background tasks");
        self.shutdown.cancel();

        for job in self.jobs {
            let abort = job.handle.abort_handle();
            match tokio::time::timeout(timeout, job.handle).await {
                Ok(Ok(())) => tracing::debug!(task = %job.name, "Task completed"),
                Ok(Err(e)) if e.is_cancelled() => tracing::debug!(task = %job.name, "Task cancelled"),
                Ok(Err(e)) => tracing::error!(task = %job.name, error = ?e, "Task panicked"),
                Err(_) => {
                    tracing::warn!(task = %job.name, "Task did not stop in time, aborting");
                    abort.abort();
                }
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_cancels_jobs() {
        let mut jobs = BackgroundTasks::new();
        let token = jobs.shutdown_token();
        jobs.spawn("waiter", JobKind::Worker, async move {
            token.cancelled().await;
        });
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs.check_health(), 0);
        jobs.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_panicking_job_is_contained() {
        let mut jobs = BackgroundTasks::new();
        jobs.spawn("boom", JobKind::Periodic, async {
            panic!("boom");
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(jobs.check_health(), 1);
        jobs.shutdown(Duration::from_secs(1)).await;
    }
}
