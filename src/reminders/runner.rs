use std::{future::Future, sync::Arc, time::Duration};

use anyhow::Context;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use super::{dispatch, Clock, Notifier, Reminder, ReminderSession, SystemClock};
use crate::{
    client::{ApiClient, ClientError, DashboardStats},
    config::ClientConfig,
    schedules::Schedule,
};

/// Logs in, then ticks reminders until Ctrl-C while a separate task keeps
/// the schedule snapshot fresh.
pub async fn run(config: ClientConfig, notifier: Arc<dyn Notifier>) -> anyhow::Result<()> {
    let mut client = ApiClient::with_timeout(&config.api_url, config.request_timeout)?;
    let user = client
        .login(&config.email, &config.password)
        .await
        .context("login")?;
    info!(user_id = %user.id, api = %config.api_url, "reminder client started");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.utc_offset));
    let mut session = ReminderSession::new(clock, notifier, config.utc_offset);
    let mut fetcher = ScheduleFetcher::new(client, config.email.clone(), config.password.clone());
    match fetcher.fetch().await {
        Ok(list) => session.refresh(list),
        Err(e) => warn!(error = %e, "initial schedule fetch failed"),
    }
    match dashboard(fetcher.client()).await {
        Ok(stats) => info!(
            total = stats.total_medicines,
            success_rate = stats.success_rate,
            "dashboard"
        ),
        Err(e) => warn!(error = %e, "dashboard stats unavailable"),
    }

    let (refresher, updates) = spawn_fetcher(fetcher, config.refresh);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    drive(&mut session, config.tick, updates, shutdown).await;
    refresher.abort();
    info!("reminder client stopping");
    Ok(())
}

/// Sends one sample reminder through `notifier`; returns how many
/// notifications were shown.
pub fn send_test(notifier: &dyn Notifier, clock: &dyn Clock) -> usize {
    let shown = dispatch(notifier, &[Reminder::test(clock.now())]);
    if shown == 0 {
        warn!("notifications unavailable; allow them to receive reminders");
    }
    shown
}

async fn dashboard(client: &ApiClient) -> Result<DashboardStats, ClientError> {
    let (schedules, logs) = tokio::try_join!(client.list_schedules(), client.history())?;
    Ok(DashboardStats::compute(&schedules, &logs))
}

/// Owns the API client on behalf of the refresh task.
pub struct ScheduleFetcher {
    client: ApiClient,
    email: String,
    password: String,
}

impl ScheduleFetcher {
    pub fn new(client: ApiClient, email: String, password: String) -> Self {
        Self {
            client,
            email,
            password,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Lists the user's schedules. A rejected token costs one login and one
    /// retry; any other failure is returned as is.
    pub async fn fetch(&mut self) -> Result<Vec<Schedule>, ClientError> {
        match self.client.list_schedules().await {
            Err(e) if e.is_unauthorized() => {
                debug!("token rejected, logging in again");
                self.client.login(&self.email, &self.password).await?;
                self.client.list_schedules().await
            }
            other => other,
        }
    }
}

/// Fetches every `period` on its own task and forwards each successful list.
/// Failures are logged and the receiver simply hears nothing that round.
pub fn spawn_fetcher(
    mut fetcher: ScheduleFetcher,
    period: Duration,
) -> (JoinHandle<()>, mpsc::Receiver<Vec<Schedule>>) {
    let (tx, rx) = mpsc::channel(1);
    let handle = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match fetcher.fetch().await {
                Ok(list) => {
                    info!(count = list.len(), "schedules refreshed");
                    if tx.send(list).await.is_err() {
                        return;
                    }
                }
                Err(e) => warn!(error = %e, "schedule refresh failed; keeping previous snapshot"),
            }
        }
    });
    (handle, rx)
}

/// Ticks `session` every `tick` and applies snapshots from `updates` as they
/// arrive, until `shutdown` resolves.
pub async fn drive(
    session: &mut ReminderSession,
    tick: Duration,
    mut updates: mpsc::Receiver<Vec<Schedule>>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = &mut shutdown => return,
            _ = ticker.tick() => {
                session.tick();
            }
            Some(list) = updates.recv() => session.refresh(list),
        }
    }
}
