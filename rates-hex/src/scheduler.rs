//! Cron-driven broadcasts.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{error, info};

use rates_types::{Mailer, RateSource, Repository};

use crate::notifier::{BroadcastReport, Notifier};

/// Default schedule: once a day at midnight UTC.
pub const DEFAULT_SCHEDULE: &str = "@daily";

/// Runs [`Notifier::broadcast_now`] on a cron schedule.
///
/// Accepts the `@hourly`/`@daily`/`@weekly`/`@monthly`/`@yearly` shortcuts and
/// six or seven field expressions (seconds first).
pub struct BroadcastScheduler<R: Repository, S: RateSource, M: Mailer> {
    notifier: Arc<Notifier<R, S, M>>,
    schedule: Schedule,
}

impl<R: Repository, S: RateSource, M: Mailer> BroadcastScheduler<R, S, M> {
    pub fn new(notifier: Arc<Notifier<R, S, M>>, expression: &str) -> anyhow::Result<Self> {
        let schedule = Schedule::from_str(expression)
            .with_context(|| format!("invalid broadcast schedule {expression:?}"))?;
        Ok(Self { notifier, schedule })
    }

    /// First fire time strictly after `after`.
    pub fn next_fire_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    /// Runs one broadcast and logs the outcome. Errors never escape.
    pub async fn tick(&self) -> Option<BroadcastReport> {
        match self.notifier.broadcast_now().await {
            Ok(report) => {
                info!(
                    attempted = report.attempted,
                    delivered = report.delivered,
                    "Scheduled broadcast done"
                );
                Some(report)
            }
            Err(e) => {
                error!(error = %e, "Scheduled broadcast failed");
                None
            }
        }
    }

    /// Sleeps until each fire time and broadcasts. Returns only when the
    /// schedule has no further fire times.
    pub async fn run(self) {
        loop {
            let now = Utc::now();
            let Some(next) = self.next_fire_after(now) else {
                info!("Broadcast schedule exhausted");
                return;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            info!(next = %next, "Next broadcast scheduled");
            tokio::time::sleep(wait).await;
            self.tick().await;
        }
    }

    /// Spawns [`run`](Self::run) on the runtime. Abort the handle to stop it.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
