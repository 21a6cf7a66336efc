use crate::classifier::is_delivered;
use crate::models::Event;

/// Telegram rejects messages above 4096 characters; keep headroom for the
/// truncation marker.
const MAX_TOTAL_CHARS: usize = 4000;

pub const NOTHING_TRACKED: &str = "No shipments are being tracked.";

pub fn help_text() -> &'static str {
    "Available commands:\n\
     /add NUMBER - Start tracking a shipment\n\
     /remove NUMBER - Stop tracking a shipment\n\
     /status NUMBER - Show the current status of a shipment\n\
     /list - List tracked shipments\n\
     /help - Show this help"
}

pub fn format_full_status(tracking_number: &str, events: &[Event]) -> String {
    let number = escape_html(tracking_number);
    let Some(latest) = events.last() else {
        return format!("\u{1f4e6} No information available for shipment <code>{number}</code>");
    };

    let icon = if is_delivered(latest) {
        "\u{1f4ec}"
    } else {
        "\u{1f4cd}"
    };

    let mut lines = vec![
        format!("\u{1f4e6} Shipment status: <code>{number}</code>\n"),
        format!("{icon} Current status: {}", escape_html(&latest.summary_text)),
        format!(
            "\u{1f4c5} Last update: {} {}",
            escape_html(&latest.event_date),
            escape_html(&latest.event_time)
        ),
        format!("\u{2139}\u{fe0f} Detail: {}", escape_html(&latest.extended_text)),
        format!("\u{1f3f7}\u{fe0f} Phase: {}\n", escape_html(&latest.des_phase)),
        "\u{1f4cb} Event history:".to_string(),
    ];

    for event in events.iter().rev() {
        lines.push(format!(
            "- {} {}: {}",
            escape_html(&event.event_date),
            escape_html(&event.event_time),
            escape_html(&event.summary_text)
        ));
    }

    join_capped(&lines, MAX_TOTAL_CHARS)
}

pub fn format_update(tracking_number: &str, event: &Event) -> String {
    let icon = if is_delivered(event) {
        "\u{1f4ec}"
    } else {
        "\u{1f4e6}"
    };

    format!(
        "{icon} Shipment update: <code>{number}</code>\n\
         \u{1f4c5} Date: {date} {time}\n\
         \u{1f4cd} Status: {summary}\n\
         \u{2139}\u{fe0f} Detail: {detail}\n\
         \u{1f3f7}\u{fe0f} Phase: {phase}",
        number = escape_html(tracking_number),
        date = escape_html(&event.event_date),
        time = escape_html(&event.event_time),
        summary = escape_html(&event.summary_text),
        detail = escape_html(&event.extended_text),
        phase = escape_html(&event.des_phase),
    )
}

pub fn format_tracked_list<S: AsRef<str>>(numbers: &[S]) -> String {
    if numbers.is_empty() {
        return NOTHING_TRACKED.to_string();
    }

    let mut sorted: Vec<&str> = numbers.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();

    let mut lines = vec!["\u{1f4cb} Tracked shipments:".to_string()];
    lines.extend(
        sorted
            .into_iter()
            .map(|number| format!("- <code>{}</code>", escape_html(number))),
    );
    join_capped(&lines, MAX_TOTAL_CHARS)
}

pub fn format_added(tracking_number: &str, events: &[Event]) -> String {
    format!(
        "\u{2705} Shipment added to tracking:\n\n{}",
        format_full_status(tracking_number, events)
    )
}

pub fn format_already_tracked(tracking_number: &str) -> String {
    format!(
        "Shipment <code>{}</code> is already being tracked.",
        escape_html(tracking_number)
    )
}

pub fn format_not_found(tracking_number: &str) -> String {
    format!(
        "\u{274c} Could not get information for shipment <code>{}</code>",
        escape_html(tracking_number)
    )
}

pub fn format_removed(tracking_number: &str) -> String {
    format!(
        "\u{2705} Shipment <code>{}</code> has been removed from tracking.",
        escape_html(tracking_number)
    )
}

pub fn format_not_tracked(tracking_number: &str) -> String {
    format!(
        "\u{274c} Shipment <code>{}</code> was not being tracked.",
        escape_html(tracking_number)
    )
}

pub fn format_delivered_prompt(tracking_number: &str) -> String {
    format!(
        "\u{1f4ec} Shipment <code>{}</code> has been delivered!\n\nDo you want to stop tracking it?",
        escape_html(tracking_number)
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

const TRUNCATED_MARKER: &str = "... (truncated)";

/// Join whole lines, dropping the tail once `max` bytes would be exceeded.
/// Lines are never split, so escaped entities and tags stay intact.
fn join_capped(lines: &[String], max: usize) -> String {
    let mut out = String::new();
    for line in lines {
        let needed = if out.is_empty() { line.len() } else { line.len() + 1 };
        if out.len() + needed > max {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(TRUNCATED_MARKER);
            return out;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(date: &str, time: &str, summary: &str, phase: &str) -> Event {
        Event {
            event_date: date.to_string(),
            event_time: time.to_string(),
            summary_text: summary.to_string(),
            extended_text: format!("{summary} (detail)"),
            phase: phase.to_string(),
            des_phase: format!("Phase {phase}"),
        }
    }

    #[test]
    fn full_status_without_events_reports_no_information() {
        let msg = format_full_status("ABC123", &[]);
        assert!(msg.contains("No information available"));
        assert!(msg.contains("<code>ABC123</code>"));
    }

    #[test]
    fn full_status_header_uses_latest_event() {
        let events = vec![
            event("01/01/2024", "09:00", "Admitido", "1"),
            event("02/01/2024", "11:30", "En tránsito", "2"),
        ];
        let msg = format_full_status("ABC123", &events);
        assert!(msg.contains("Current status: En tránsito"));
        assert!(msg.contains("Last update: 02/01/2024 11:30"));
        assert!(msg.contains("Detail: En tránsito (detail)"));
        assert!(msg.contains("Phase: Phase 2"));
        assert!(msg.contains("\u{1f4cd} Current status"));
    }

    #[test]
    fn full_status_history_is_most_recent_first() {
        let events = vec![
            event("01/01/2024", "09:00", "Admitido", "1"),
            event("02/01/2024", "11:30", "En tránsito", "2"),
            event("03/01/2024", "08:00", "En reparto", "2"),
        ];
        let msg = format_full_status("ABC123", &events);
        let newest = msg.find("- 03/01/2024 08:00: En reparto").unwrap();
        let middle = msg.find("- 02/01/2024 11:30: En tránsito").unwrap();
        let oldest = msg.find("- 01/01/2024 09:00: Admitido").unwrap();
        assert!(newest < middle && middle < oldest);
    }

    #[test]
    fn full_status_marks_delivered_header() {
        let events = vec![event("02/01/2024", "11:30", "Entregado", "4")];
        let msg = format_full_status("ABC123", &events);
        assert!(msg.contains("\u{1f4ec} Current status: Entregado"));
    }

    #[test]
    fn update_icon_depends_on_delivery() {
        let in_transit = format_update("ABC123", &event("01/01/2024", "09:00", "En tránsito", "2"));
        assert!(in_transit.starts_with("\u{1f4e6} Shipment update"));

        let delivered = format_update("ABC123", &event("01/01/2024", "09:00", "Reparto", "3"));
        assert!(delivered.starts_with("\u{1f4ec} Shipment update"));
        assert!(delivered.contains("Date: 01/01/2024 09:00"));
    }

    #[test]
    fn tracked_list_empty_is_fixed_message() {
        let empty: [&str; 0] = [];
        assert_eq!(format_tracked_list(&empty), NOTHING_TRACKED);
    }

    #[test]
    fn tracked_list_is_sorted_regardless_of_input_order() {
        let msg = format_tracked_list(&["B2", "A1"]);
        let lines: Vec<&str> = msg.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "- <code>A1</code>");
        assert_eq!(lines[2], "- <code>B2</code>");
    }

    #[test]
    fn user_supplied_numbers_are_escaped() {
        let msg = format_removed("<b>x</b>");
        assert!(msg.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(!msg.contains("<b>x</b>"));
    }

    #[test]
    fn carrier_text_is_escaped() {
        let mut e = event("01/01/2024", "09:00", "A & B", "1");
        e.extended_text = "<script>".to_string();
        let msg = format_update("N1", &e);
        assert!(msg.contains("A &amp; B"));
        assert!(msg.contains("&lt;script&gt;"));
    }

    #[test]
    fn long_history_is_truncated() {
        let events: Vec<Event> = (0..300)
            .map(|i| event("01/01/2024", &format!("{i:05}"), "Clasificado en centro logístico", "2"))
            .collect();
        let msg = format_full_status("ABC123", &events);
        assert!(msg.ends_with(TRUNCATED_MARKER));
        assert!(msg.len() <= MAX_TOTAL_CHARS + 1 + TRUNCATED_MARKER.len());
        assert!(msg.contains("Event history:"));
    }

    #[test]
    fn truncated_history_keeps_escaped_entities_whole() {
        let events: Vec<Event> = (0..200)
            .map(|i| event("01/01/2024", &format!("{i:05}"), "&&&&&&&&&&", "2"))
            .collect();
        let msg = format_full_status("ABC123", &events);
        let body = msg.strip_suffix(TRUNCATED_MARKER).unwrap();
        for line in body.lines().filter(|l| l.starts_with("- ")) {
            assert!(line.ends_with(&"&amp;".repeat(10)), "broken line: {line}");
        }
        assert!(!msg.replace("&amp;", "").contains('&'));
    }

    #[test]
    fn join_capped_never_splits_multibyte_lines() {
        let lines = vec![
            "\u{1f600}\u{1f601}".to_string(),
            "\u{1f602}\u{1f603}".to_string(),
        ];
        assert_eq!(join_capped(&lines, 10), format!("\u{1f600}\u{1f601}\n{TRUNCATED_MARKER}"));
        assert_eq!(join_capped(&lines, 17), "\u{1f600}\u{1f601}\n\u{1f602}\u{1f603}");
        assert_eq!(join_capped(&lines, 3), TRUNCATED_MARKER);
    }

    #[test]
    fn help_lists_every_command() {
        for command in ["/add", "/remove", "/status", "/list", "/help"] {
            assert!(help_text().contains(command));
        }
    }

    #[test]
    fn delivered_prompt_asks_to_stop_tracking() {
        let msg = format_delivered_prompt("ABC123");
        assert!(msg.contains("<code>ABC123</code>"));
        assert!(msg.contains("stop tracking"));
    }
}
