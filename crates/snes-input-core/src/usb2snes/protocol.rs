//! Usb2Snes request and reply envelopes.
//!
//! Request: `{"Opcode": "...", "Space": "SNES", "Operands": ["..."]}`
//! Reply:   `{"Results": ["..."]}` for DeviceList and Info. GetAddress answers
//! with binary frames instead; Attach and Name send nothing back.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::input::MemoryRegion;

/// Protocol command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Opcode {
    /// List attached devices.
    DeviceList,
    /// Attach to a device by id (no reply).
    Attach,
    /// Announce the client name (no reply).
    Name,
    /// Firmware version, device type and running game.
    Info,
    /// Read a memory range.
    GetAddress,
}

impl Opcode {
    /// Returns whether the bridge answers this command.
    pub fn has_reply(&self) -> bool {
        !matches!(self, Opcode::Attach | Opcode::Name)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::DeviceList => "DeviceList",
            Opcode::Attach => "Attach",
            Opcode::Name => "Name",
            Opcode::Info => "Info",
            Opcode::GetAddress => "GetAddress",
        };
        f.write_str(name)
    }
}

/// Address space selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Space {
    /// Console memory.
    #[default]
    #[serde(rename = "SNES")]
    Snes,
}

/// Request envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    pub opcode: Opcode,
    pub space: Space,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operands: Vec<String>,
}

impl Request {
    /// Creates a request without operands.
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            space: Space::Snes,
            operands: Vec::new(),
        }
    }

    pub fn device_list() -> Self {
        Self::new(Opcode::DeviceList)
    }

    pub fn attach(device: &str) -> Self {
        Self {
            operands: vec![device.to_string()],
            ..Self::new(Opcode::Attach)
        }
    }

    pub fn name(name: &str) -> Self {
        Self {
            operands: vec![name.to_string()],
            ..Self::new(Opcode::Name)
        }
    }

    pub fn info() -> Self {
        Self::new(Opcode::Info)
    }

    pub fn get_address(region: MemoryRegion) -> Self {
        Self {
            operands: region.operands(),
            ..Self::new(Opcode::GetAddress)
        }
    }
}

/// Reply envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Reply {
    #[serde(default)]
    pub results: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_list_omits_operands() {
        let value = serde_json::to_value(Request::device_list()).unwrap();
        assert_eq!(value, json!({"Opcode": "DeviceList", "Space": "SNES"}));
    }

    #[test]
    fn test_attach_request() {
        let value = serde_json::to_value(Request::attach("SD2SNES COM3")).unwrap();
        assert_eq!(
            value,
            json!({"Opcode": "Attach", "Space": "SNES", "Operands": ["SD2SNES COM3"]})
        );
    }

    #[test]
    fn test_get_address_request() {
        let request = Request::get_address(MemoryRegion::new(0xF5_008B, 2));
        let value = serde_json::to_value(request).unwrap();
        assert_eq!(
            value,
            json!({"Opcode": "GetAddress", "Space": "SNES", "Operands": ["F5008B", "2"]})
        );
    }

    #[test]
    fn test_reply_parsing() {
        let reply: Reply = serde_json::from_str(r#"{"Results": ["device-1"]}"#).unwrap();
        assert_eq!(reply.results, vec!["device-1"]);

        let reply: Reply = serde_json::from_str("{}").unwrap();
        assert!(reply.results.is_empty());
    }

    #[test]
    fn test_has_reply() {
        assert!(Opcode::DeviceList.has_reply());
        assert!(Opcode::GetAddress.has_reply());
        assert!(!Opcode::Attach.has_reply());
        assert!(!Opcode::Name.has_reply());
    }
}
