use crate::carrier::{CarrierClient, events_or_empty};
use crate::store::{AddOutcome, RemoveOutcome, TrackingStore};
use crate::telegram::callback_data::CallbackAction;
use crate::telegram::formatter;
use crate::telegram::messenger::Messenger;
use teloxide::types::MessageId;

const REMOVED_TOAST: &str = "Shipment removed from tracking";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Add(String),
    Remove(String),
    Status(String),
    List,
}

impl Command {
    /// Parse a chat message. Unknown verbs and missing arguments yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }
        let (verb, args) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        // "/add@SomeBot" is how group chats address a specific bot.
        let verb = verb.split_once('@').map_or(verb, |(verb, _)| verb);
        Self::from_parts(&verb.to_lowercase(), args)
    }

    pub fn from_parts(verb: &str, args: &str) -> Option<Self> {
        let args = args.trim();
        let required = || (!args.is_empty()).then(|| args.to_string());
        match verb {
            "/help" => Some(Self::Help),
            "/add" => required().map(Self::Add),
            "/remove" => required().map(Self::Remove),
            "/status" => required().map(Self::Status),
            "/list" => Some(Self::List),
            _ => None,
        }
    }
}

/// Run a text command and return the reply, if any.
pub async fn handle_text(
    text: &str,
    store: &mut TrackingStore,
    carrier: &dyn CarrierClient,
) -> Option<String> {
    let command = Command::parse(text)?;
    Some(execute(command, store, carrier).await)
}

pub async fn execute(
    command: Command,
    store: &mut TrackingStore,
    carrier: &dyn CarrierClient,
) -> String {
    match command {
        Command::Help => formatter::help_text().to_string(),
        Command::Add(number) => match store.add(&number, carrier).await {
            AddOutcome::AlreadyTracked => formatter::format_already_tracked(&number),
            AddOutcome::NotFound => formatter::format_not_found(&number),
            AddOutcome::Added(events) => formatter::format_added(&number, &events),
        },
        Command::Remove(number) => match store.remove(&number) {
            RemoveOutcome::Removed => formatter::format_removed(&number),
            RemoveOutcome::NotPresent => formatter::format_not_tracked(&number),
        },
        Command::Status(number) => {
            let events = events_or_empty(carrier, &number).await;
            formatter::format_full_status(&number, &events)
        }
        Command::List => formatter::format_tracked_list(&store.list()),
    }
}

/// Handle an inline button press: stop tracking, acknowledge it, and rewrite
/// the originating message in place.
pub async fn handle_callback(
    callback_id: &str,
    data: &str,
    message_id: Option<MessageId>,
    store: &mut TrackingStore,
    messenger: &dyn Messenger,
) {
    let Some(CallbackAction::Remove(number)) = CallbackAction::parse(data) else {
        tracing::debug!(data = %data, "Ignoring unknown callback payload");
        return;
    };

    if store.remove(&number) == RemoveOutcome::NotPresent {
        tracing::debug!(tracking_number = %number, "Remove button pressed for untracked shipment");
    }

    if let Err(e) = messenger.answer_callback(callback_id, REMOVED_TOAST).await {
        tracing::warn!("Failed to answer callback query: {e}");
    }

    if let Some(message_id) = message_id
        && let Err(e) = messenger
            .edit_text(message_id, &formatter::format_removed(&number))
            .await
    {
        tracing::warn!(message_id = message_id.0, "Failed to edit message: {e}");
    }
}
