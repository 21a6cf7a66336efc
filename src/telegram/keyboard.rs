use crate::telegram::callback_data::CallbackAction;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Telegram limits `callback_data` to 64 bytes.
const MAX_CALLBACK_DATA_BYTES: usize = 64;

/// Single-row keyboard offering to stop tracking a delivered shipment.
///
/// Returns `None` when the tracking number is too long to fit in a callback
/// payload; the caller then sends the prompt without a button.
pub fn make_remove_keyboard(tracking_number: &str) -> Option<InlineKeyboardMarkup> {
    let payload = CallbackAction::Remove(tracking_number.to_string()).encode();
    if payload.len() > MAX_CALLBACK_DATA_BYTES {
        return None;
    }

    let button = InlineKeyboardButton::callback("\u{1f5d1}\u{fe0f} Stop tracking", payload);
    Some(InlineKeyboardMarkup::new(vec![vec![button]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn keyboard_has_single_remove_button() {
        let kb = make_remove_keyboard("ABC123").unwrap();
        assert_eq!(kb.inline_keyboard.len(), 1);
        let buttons = &kb.inline_keyboard[0];
        assert_eq!(buttons.len(), 1);
        match &buttons[0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "remove_ABC123"),
            _ => panic!("Expected CallbackData button kind"),
        }
    }

    #[test]
    fn oversized_number_gets_no_keyboard() {
        let number = "X".repeat(60);
        assert!(make_remove_keyboard(&number).is_none());
    }
}
