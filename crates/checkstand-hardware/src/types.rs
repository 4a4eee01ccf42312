//! Types describing scanner devices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Barcode symbology a scanner can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Symbology {
    /// One-dimensional retail and industrial codes (EAN, UPC, Code 128).
    Linear,

    /// Stacked 2-D code used on identity cards.
    Pdf417,

    /// QR code.
    QrCode,
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "1D"),
            Self::Pdf417 => write!(f, "PDF417"),
            Self::QrCode => write!(f, "QR"),
        }
    }
}

/// Scanner device information.
///
/// Reported by [`ScannerDevice::get_info`](crate::traits::ScannerDevice::get_info)
/// and logged when capture starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Mock Scanner").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional device serial number.
    pub serial_number: Option<String>,

    /// Symbologies the device decodes.
    pub symbologies: Vec<Symbology>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with no declared symbologies.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            serial_number: None,
            symbologies: Vec::new(),
        }
    }

    /// Set the serial number.
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Set the decoded symbologies.
    pub fn with_symbologies(mut self, symbologies: impl IntoIterator<Item = Symbology>) -> Self {
        self.symbologies = symbologies.into_iter().collect();
        self
    }

    /// Returns `true` if the device can read identity cards.
    pub fn reads_identity_cards(&self) -> bool {
        self.symbologies.contains(&Symbology::Pdf417)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("Lane 3", "MS-100")
            .with_serial_number("SN-0042")
            .with_symbologies([Symbology::Linear, Symbology::Pdf417]);

        assert_eq!(info.serial_number.as_deref(), Some("SN-0042"));
        assert!(info.reads_identity_cards());
    }

    #[test]
    fn test_linear_only_scanner() {
        let info = DeviceInfo::new("Handheld", "HH-1").with_symbologies([Symbology::Linear]);
        assert!(!info.reads_identity_cards());
    }

    #[test]
    fn test_device_info_serde() {
        let info = DeviceInfo::new("Mock", "mock").with_symbologies([Symbology::QrCode]);
        let json = serde_json::to_string(&info).unwrap();
        let back: DeviceInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn test_symbology_display() {
        assert_eq!(Symbology::Pdf417.to_string(), "PDF417");
        assert_eq!(Symbology::Linear.to_string(), "1D");
    }
}
