mod client;
mod notification_sink;

pub use client::*;
pub use notification_sink::*;
