use crate::carrier::CarrierClient;
use crate::config::Config;
use crate::models::{InboundKind, InboundUpdate};
use crate::monitor::{self, SweepReport};
use crate::store::TrackingStore;
use crate::telegram::messenger::{Messenger, send_best_effort};
use crate::telegram::router;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Single-threaded driver: command intake on every iteration, a shipment
/// sweep whenever the check interval has elapsed. Neither activity ever runs
/// while the other is in progress.
pub struct PollLoop<C, M> {
    store: TrackingStore,
    carrier: C,
    messenger: M,
    chat_id: i64,
    check_interval: Duration,
    poll_interval: Duration,
    /// Highest update id handled so far. Kept in memory only.
    cursor: u32,
    last_sweep: Option<Instant>,
}

impl<C: CarrierClient, M: Messenger> PollLoop<C, M> {
    pub fn new(config: &Config, store: TrackingStore, carrier: C, messenger: M) -> Self {
        Self {
            store,
            carrier,
            messenger,
            chat_id: config.chat_id,
            check_interval: config.check_interval(),
            poll_interval: config.command_poll_interval(),
            cursor: 0,
            last_sweep: None,
        }
    }

    pub fn store(&self) -> &TrackingStore {
        &self.store
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Poll until `cancel` fires, then flush state. The iteration in progress
    /// when the signal arrives always runs to completion.
    pub async fn run(mut self, cancel: CancellationToken) -> TrackingStore {
        tracing::info!(
            check_interval_secs = self.check_interval.as_secs(),
            tracked = self.store.list().len(),
            "Polling started"
        );

        loop {
            self.tick(Instant::now()).await;

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        tracing::info!("Shutdown requested, saving tracking data");
        if let Err(e) = self.store.flush() {
            tracing::error!(path = %self.store.path().display(), "Failed to save tracking data: {e}");
        }
        self.store
    }

    /// One loop iteration: drain inbound updates, then sweep if due.
    pub async fn tick(&mut self, now: Instant) -> Option<SweepReport> {
        self.process_updates().await;

        if !self.sweep_due(now) {
            return None;
        }
        let report = monitor::sweep(&mut self.store, &self.carrier, &self.messenger).await;
        self.last_sweep = Some(now);
        Some(report)
    }

    fn sweep_due(&self, now: Instant) -> bool {
        self.last_sweep
            .is_none_or(|last| now.saturating_duration_since(last) >= self.check_interval)
    }

    async fn process_updates(&mut self) {
        let offset = (self.cursor > 0)
            .then(|| i32::try_from(self.cursor.saturating_add(1)).unwrap_or(i32::MAX));

        let updates = match self.messenger.fetch_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!("Failed to fetch Telegram updates: {e}");
                return;
            }
        };

        for update in updates {
            if update.id <= self.cursor {
                continue;
            }
            self.cursor = update.id;
            self.dispatch(update).await;
        }
    }

    async fn dispatch(&mut self, update: InboundUpdate) {
        if matches!(update.kind, InboundKind::Other) {
            return;
        }
        if update.chat_id != self.chat_id {
            tracing::warn!(
                update_id = update.id,
                chat_id = update.chat_id,
                "Ignoring update from unauthorized chat"
            );
            return;
        }

        match update.kind {
            InboundKind::Callback {
                callback_id,
                data,
                message_id,
            } => {
                router::handle_callback(
                    &callback_id,
                    &data,
                    message_id,
                    &mut self.store,
                    &self.messenger,
                )
                .await;
            }
            InboundKind::Text(text) => {
                if let Some(reply) = router::handle_text(&text, &mut self.store, &self.carrier).await
                {
                    send_best_effort(&self.messenger, &reply, None).await;
                }
            }
            InboundKind::Other => {}
        }
    }
}

pub fn spawn_signal_handler(cancel_token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut sigterm =
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(signal) => signal,
                    Err(e) => {
                        tracing::warn!("Failed to register SIGTERM handler: {e}");
                        if let Err(e) = ctrl_c.await {
                            tracing::error!("Failed to listen for Ctrl+C: {e}");
                        }
                        cancel_token.cancel();
                        return;
                    }
                };
            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("Received SIGINT, shutting down...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, shutting down...");
                }
            }
        }
        #[cfg(not(unix))]
        {
            if let Err(e) = ctrl_c.await {
                tracing::error!("Failed to listen for Ctrl+C: {e}");
            }
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        cancel_token.cancel();
    });
}
