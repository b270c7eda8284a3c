//! Telegram Gateway - TCP gateway for field sensor telegrams
//!
//! Terminals push binary telegrams (wind, rain, soil) over long-lived TCP
//! connections. Each connection reassembles frames from the byte stream,
//! validates them, decodes the payload and routes the result to a reading
//! sink or a diagnostic sink.

pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod sink;
pub mod telegram;
