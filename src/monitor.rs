use crate::carrier::{CarrierClient, events_or_empty};
use crate::classifier::is_delivered;
use crate::store::TrackingStore;
use crate::telegram::formatter;
use crate::telegram::keyboard::make_remove_keyboard;
use crate::telegram::messenger::{Messenger, send_best_effort};

/// Counters for one pass over the tracked shipments.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub skipped: usize,
    pub changed: usize,
    pub delivered: usize,
}

/// Check every tracked shipment once and notify about changes.
///
/// The tracked list is snapshotted up front. A shipment with no data this
/// cycle is skipped without affecting the others.
pub async fn sweep(
    store: &mut TrackingStore,
    carrier: &dyn CarrierClient,
    messenger: &dyn Messenger,
) -> SweepReport {
    let mut report = SweepReport::default();

    for tracking_number in store.list() {
        report.checked += 1;

        let mut events = events_or_empty(carrier, &tracking_number).await;
        let Some(latest) = events.pop() else {
            report.skipped += 1;
            continue;
        };

        let unchanged = store
            .latest_known_event(&tracking_number)
            .is_some_and(|known| known.same_moment(&latest));
        if unchanged {
            continue;
        }

        report.changed += 1;
        let delivered = is_delivered(&latest);
        let update_text = formatter::format_update(&tracking_number, &latest);
        tracing::info!(
            tracking_number = %tracking_number,
            date = %latest.event_date,
            time = %latest.event_time,
            delivered,
            "Shipment status changed"
        );

        // Persist before notifying: a crash may repeat a notification, never lose one.
        store.record_latest(&tracking_number, latest);
        send_best_effort(messenger, &update_text, None).await;

        if delivered {
            report.delivered += 1;
            send_best_effort(
                messenger,
                &formatter::format_delivered_prompt(&tracking_number),
                make_remove_keyboard(&tracking_number),
            )
            .await;
        }
    }

    tracing::debug!(?report, "Sweep finished");
    report
}
