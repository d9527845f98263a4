//! Daily sheet builder
//!
//! Rebuilds sheets from the truck index: every job referenced under a date
//! on one of the driver's trucks lands in the bucket for its current status.
//! Fuel logs and expenses are never touched.

use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use shared::models::{
    DailySheet, JobBucket, SheetGenerationFailure, SheetGenerationSummary, TaskKind,
};
use sqlx::SqlitePool;

use super::{employee_not_found, load_sheet, recompute_sheets};
use crate::db::repository::{RepoError, begin_write, daily_sheet, employee, task, tipping, truck};
use crate::utils::time::{date_key, day_end_millis, day_start_millis};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Sheet generator bound to a pool and business timezone
#[derive(Clone)]
pub struct SheetBuilder {
    pool: SqlitePool,
    tz: Tz,
    item_timeout: Duration,
}

impl SheetBuilder {
    pub fn new(pool: SqlitePool, tz: Tz, item_timeout: Duration) -> Self {
        Self {
            pool,
            tz,
            item_timeout,
        }
    }

    /// Generate the sheet of every seated driver for `date`.
    ///
    /// A failing or slow driver is recorded in `failed`; the others proceed.
    pub async fn generate_all(&self, date: NaiveDate) -> AppResult<SheetGenerationSummary> {
        let drivers = truck::driver_ids(&self.pool).await?;
        let mut summary = SheetGenerationSummary {
            date,
            generated: Vec::with_capacity(drivers.len()),
            failed: Vec::new(),
        };

        for driver_id in drivers {
            let outcome = tokio::time::timeout(self.item_timeout, self.generate_for_driver(driver_id, date)).await;
            match outcome {
                Ok(Ok(_)) => summary.generated.push(driver_id),
                Ok(Err(e)) => {
                    tracing::error!(driver_id, date = %date_key(date), error = %e, "Sheet generation failed");
                    summary.failed.push(SheetGenerationFailure {
                        driver_id,
                        error: e.message,
                    });
                }
                Err(_) => {
                    tracing::error!(
                        driver_id,
                        date = %date_key(date),
                        timeout_ms = self.item_timeout.as_millis() as u64,
                        "Sheet generation timed out"
                    );
                    summary.failed.push(SheetGenerationFailure {
                        driver_id,
                        error: format!("timed out after {}ms", self.item_timeout.as_millis()),
                    });
                }
            }
        }

        tracing::info!(
            date = %date_key(date),
            generated = summary.generated.len(),
            failed = summary.failed.len(),
            "Daily sheets generated"
        );
        Ok(summary)
    }

    /// Rebuild one driver's sheet for `date`
    pub async fn generate_for_driver(&self, driver_id: i64, date: NaiveDate) -> AppResult<DailySheet> {
        let driver = employee::find_by_id(&self.pool, driver_id)
            .await?
            .ok_or_else(|| employee_not_found(driver_id))?;
        if !driver.is_active {
            return Err(AppError::with_message(
                ErrorCode::EmployeeInactive,
                format!("Employee {driver_id} is inactive"),
            )
            .with_detail("employee_id", driver_id));
        }

        let mut tx = begin_write(&self.pool).await?;
        let refs = truck::refs_for_driver_date(&mut *tx, driver_id, date).await?;

        let task_ids: Vec<i64> = refs
            .iter()
            .filter(|r| r.kind == TaskKind::Task)
            .map(|r| r.task_id)
            .collect();
        let found = task::find_by_ids(&mut *tx, &task_ids).await?;
        let jobs: Vec<(i64, JobBucket)> = task_ids
            .iter()
            .filter_map(|id| {
                let t = found.iter().find(|t| t.id == *id);
                if t.is_none() {
                    tracing::warn!(driver_id, task_id = id, "Indexed task missing, skipped");
                }
                t.map(|t| (t.id, t.task_status.bucket()))
            })
            .collect();

        let mut tipping_ids: Vec<i64> = refs
            .iter()
            .filter(|r| r.kind == TaskKind::TippingRequest)
            .map(|r| r.task_id)
            .collect();
        let created_that_day = tipping::find_ids_by_driver_between(
            &mut *tx,
            driver_id,
            day_start_millis(date, self.tz),
            day_end_millis(date, self.tz),
        )
        .await?;
        for id in created_that_day {
            if !tipping_ids.contains(&id) {
                tipping_ids.push(id);
            }
        }

        let sheet_id = daily_sheet::upsert(&mut *tx, driver_id, date).await?;
        let mut touched = daily_sheet::replace_jobs(&mut tx, sheet_id, &jobs).await?;
        daily_sheet::replace_tipping(&mut tx, sheet_id, &tipping_ids).await?;
        touched.push(sheet_id);
        recompute_sheets(&mut tx, &touched).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::debug!(
            driver_id,
            sheet_id,
            date = %date_key(date),
            jobs = jobs.len(),
            tipping = tipping_ids.len(),
            "Daily sheet rebuilt"
        );
        load_sheet(&self.pool, driver_id, date).await
    }
}
