pub mod chat;
pub mod prompt;
pub mod transcript;

pub use chat::ChatRelay;
pub use transcript::format_messages;
