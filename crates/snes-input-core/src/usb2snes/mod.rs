//! Usb2Snes protocol client.
//!
//! One JSON request per WebSocket message. Replies carry no request id, so
//! every call completes before the next one is sent.

mod client;
mod protocol;

pub use client::{Client, DeviceInfo, Transport, WsStream};
pub use protocol::{Opcode, Reply, Request, Space};
