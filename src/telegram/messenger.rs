use crate::config::Config;
use crate::error::MessagingError;
use crate::models::{InboundKind, InboundUpdate};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, InlineKeyboardMarkup, MessageId, ParseMode, UpdateKind};

/// The chat operations the tracker relies on.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Pending inbound updates, starting at `offset` when given.
    async fn fetch_updates(&self, offset: Option<i32>) -> Result<Vec<InboundUpdate>, MessagingError>;

    async fn send_text(
        &self,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), MessagingError>;

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), MessagingError>;

    async fn edit_text(&self, message_id: MessageId, text: &str) -> Result<(), MessagingError>;
}

/// Send a message, logging instead of propagating failures.
pub async fn send_best_effort(
    messenger: &dyn Messenger,
    text: &str,
    keyboard: Option<InlineKeyboardMarkup>,
) {
    if let Err(e) = messenger.send_text(text, keyboard).await {
        tracing::warn!("Failed to send message: {e}");
    }
}

pub struct TelegramMessenger {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramMessenger {
    pub fn new(config: &Config) -> Self {
        Self {
            bot: Bot::new(&config.telegram_bot_token),
            chat_id: ChatId(config.chat_id),
        }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn fetch_updates(&self, offset: Option<i32>) -> Result<Vec<InboundUpdate>, MessagingError> {
        let mut request = self.bot.get_updates();
        if let Some(offset) = offset {
            request = request.offset(offset);
        }
        let updates = request.await?;
        Ok(updates.into_iter().map(to_inbound).collect())
    }

    async fn send_text(
        &self,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), MessagingError> {
        let mut request = self
            .bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), MessagingError> {
        self.bot
            .answer_callback_query(CallbackQueryId(callback_id.to_owned()))
            .text(text)
            .await?;
        Ok(())
    }

    async fn edit_text(&self, message_id: MessageId, text: &str) -> Result<(), MessagingError> {
        self.bot
            .edit_message_text(self.chat_id, message_id, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}

fn to_inbound(update: Update) -> InboundUpdate {
    let id = update.id.0;
    match update.kind {
        UpdateKind::Message(msg) => InboundUpdate {
            id,
            chat_id: msg.chat.id.0,
            kind: msg
                .text()
                .map_or(InboundKind::Other, |text| InboundKind::Text(text.to_string())),
        },
        UpdateKind::CallbackQuery(query) => {
            // Private chats share the user's id when the message is gone.
            let chat_id = query.message.as_ref().map_or_else(
                || i64::try_from(query.from.id.0).unwrap_or_default(),
                |m| m.chat().id.0,
            );
            InboundUpdate {
                id,
                chat_id,
                kind: InboundKind::Callback {
                    callback_id: query.id.to_string(),
                    data: query.data.clone().unwrap_or_default(),
                    message_id: query.message.as_ref().map(|m| m.id()),
                },
            }
        }
        _ => InboundUpdate {
            id,
            chat_id: 0,
            kind: InboundKind::Other,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Messenger whose sends always fail.
    #[derive(Default)]
    struct OfflineMessenger {
        attempts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Messenger for OfflineMessenger {
        async fn fetch_updates(&self, _offset: Option<i32>) -> Result<Vec<InboundUpdate>, MessagingError> {
            Ok(Vec::new())
        }

        async fn send_text(
            &self,
            text: &str,
            _keyboard: Option<InlineKeyboardMarkup>,
        ) -> Result<(), MessagingError> {
            self.attempts.lock().unwrap().push(text.to_string());
            Err(teloxide::RequestError::Io(std::io::Error::other("offline").into()).into())
        }

        async fn answer_callback(&self, _callback_id: &str, _text: &str) -> Result<(), MessagingError> {
            Ok(())
        }

        async fn edit_text(&self, _message_id: MessageId, _text: &str) -> Result<(), MessagingError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn send_failure_is_absorbed() {
        let messenger = OfflineMessenger::default();
        send_best_effort(&messenger, "hello", None).await;
        assert_eq!(messenger.attempts.lock().unwrap().as_slice(), &["hello".to_string()]);
    }

    #[tokio::test]
    async fn answer_callback_accepts_plain_string_ids() {
        let messenger = TelegramMessenger {
            bot: Bot::new("123:ABC").set_api_url("http://127.0.0.1:9/".parse().unwrap()),
            chat_id: ChatId(1),
        };
        // Nothing listens on port 9; the call must fail with a transport error
        // rather than panic while building the request.
        assert!(messenger.answer_callback("cb-1", "done").await.is_err());
    }
}
