//! BusFrame - Dispatcher input
//!
//! Encoded outgoing bus frame.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Raw frame ready for the bus transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusFrame {
    /// Arbitration address
    pub address: u32,
    /// Bus index on the transport
    pub bus: u8,
    /// Payload bytes (zero-copy)
    pub data: Bytes,
}

impl BusFrame {
    pub fn new(address: u32, bus: u8, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            bus,
            data: data.into(),
        }
    }

    /// Payload as uppercase hex without separators
    pub fn data_hex(&self) -> String {
        self.data.iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl fmt::Display for BusFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03X}#{}", self.address, self.data_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_display() {
        let frame = BusFrame::new(0x750, 0, vec![0x41, 0x02, 0x21, 0x69, 0, 0, 0, 0]);
        assert_eq!(frame.to_string(), "750#4102216900000000");
    }
}
