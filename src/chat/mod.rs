pub mod client;

pub use client::{ChatClient, ChatMessage};
