pub mod format;
pub mod telegram;

pub use format::{apology_message, format_message};
pub use telegram::{truncate_message, TelegramClient, MAX_MESSAGE_CHARS, TRUNCATION_MARKER};
