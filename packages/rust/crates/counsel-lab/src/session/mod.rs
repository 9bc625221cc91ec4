//! Session namespace: transcript message types.

mod message;

pub use message::{ChatMessage, Role};
