pub mod callback_data;
pub mod formatter;
pub mod keyboard;
pub mod messenger;
pub mod router;
