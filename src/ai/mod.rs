pub mod client;
pub mod http_client;
pub mod prompts;

pub use client::*;
