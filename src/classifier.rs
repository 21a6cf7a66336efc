use crate::models::Event;

/// Correos phase codes that mean the parcel reached its recipient.
const TERMINAL_PHASES: &[&str] = &["3", "4"];

const DELIVERY_PHRASES: &[&str] = &["ENTREGADO", "ENTREGA EFECTUADA", "ENTREGADO AL DESTINATARIO"];

pub fn is_delivered(event: &Event) -> bool {
    TERMINAL_PHASES.contains(&event.phase.trim())
        || mentions_delivery(&event.summary_text)
        || mentions_delivery(&event.extended_text)
}

fn mentions_delivery(text: &str) -> bool {
    let upper = text.to_uppercase();
    DELIVERY_PHRASES.iter().any(|phrase| upper.contains(phrase))
}
