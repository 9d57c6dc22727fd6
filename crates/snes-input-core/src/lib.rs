//! SNES Input Core
//!
//! Talks to a Usb2Snes bridge (QUsb2Snes, SNI) over its JSON-over-WebSocket
//! protocol and decodes the controller input word read from console memory.

pub mod error;
pub mod input;
pub mod usb2snes;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Error, Result};
pub use input::{decode_inputs, Button, InputSnapshot, MemoryRegion, CONTROLLER_1_INPUT};
pub use usb2snes::{Client, DeviceInfo, Transport};

/// Usb2Snes bridge endpoint. QUsb2Snes and SNI both listen here.
pub const USB2SNES_URI: &str = "ws://localhost:8080";
