//! Error types for the Usb2Snes client.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::usb2snes::Opcode;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the bridge.
#[derive(Error, Debug)]
pub enum Error {
    /// The WebSocket endpoint could not be reached.
    #[error("Could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    /// DeviceList returned no devices.
    #[error("No device connected")]
    NoDevice,

    /// The bridge closed the connection.
    #[error("Connection to the bridge was closed")]
    ConnectionClosed,

    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// A reply could not be parsed as JSON.
    #[error("Malformed reply: {0}")]
    Json(#[from] serde_json::Error),

    /// A reply arrived in a frame type the request does not produce.
    #[error("Unexpected {frame} reply to {opcode}")]
    UnexpectedReply { opcode: Opcode, frame: &'static str },

    /// GetAddress returned a different number of bytes than requested.
    #[error("Read length mismatch: expected {expected} bytes, got {actual}")]
    ReadLength { expected: usize, actual: usize },

    /// Info returned fewer fields than firmware version, type and game.
    #[error("Incomplete device info: {0:?}")]
    InvalidInfo(Vec<String>),
}
