//! Command handlers for the counsel CLI.

pub mod ask;
pub mod chat;
pub mod index;
pub mod info;
mod services;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use index::IndexCommand;
pub use info::InfoCommand;
