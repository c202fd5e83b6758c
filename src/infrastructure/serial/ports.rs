use crate::domain::error::TermResult;
use serde::Serialize;
use serialport::SerialPortType;
use tracing::debug;

/// An available serial port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    pub name: String,
    pub kind: String,
    pub description: String,
}

impl From<serialport::SerialPortInfo> for PortInfo {
    fn from(info: serialport::SerialPortInfo) -> Self {
        let (kind, description) = match info.port_type {
            SerialPortType::UsbPort(usb) => {
                let mut parts = vec![format!("{:04x}:{:04x}", usb.vid, usb.pid)];
                parts.extend(usb.manufacturer);
                parts.extend(usb.product);
                ("usb", parts.join(" "))
            }
            SerialPortType::PciPort => ("pci", String::new()),
            SerialPortType::BluetoothPort => ("bluetooth", String::new()),
            SerialPortType::Unknown => ("unknown", String::new()),
        };

        Self {
            name: info.port_name,
            kind: kind.to_string(),
            description,
        }
    }
}

/// Available serial ports sorted by name
pub fn list_ports() -> TermResult<Vec<PortInfo>> {
    let mut ports: Vec<PortInfo> = serialport::available_ports()?
        .into_iter()
        .map(PortInfo::from)
        .collect();
    ports.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Found {} serial ports", ports.len());
    Ok(ports)
}

/// Name of the first available port, if any
pub fn first_port() -> Option<String> {
    list_ports().ok()?.into_iter().next().map(|port| port.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::{SerialPortInfo, UsbPortInfo};

    #[test]
    fn test_usb_port_info() {
        let info = SerialPortInfo {
            port_name: "/dev/ttyUSB0".to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x0403,
                pid: 0x6001,
                serial_number: None,
                manufacturer: Some("FTDI".to_string()),
                product: Some("FT232R".to_string()),
            }),
        };

        let port = PortInfo::from(info);
        assert_eq!(port.kind, "usb");
        assert_eq!(port.description, "0403:6001 FTDI FT232R");
    }

    #[test]
    fn test_unknown_port_info() {
        let port = PortInfo::from(SerialPortInfo {
            port_name: "COM1".to_string(),
            port_type: SerialPortType::Unknown,
        });
        assert_eq!(port.name, "COM1");
        assert_eq!(port.kind, "unknown");
        assert!(port.description.is_empty());
    }

    #[test]
    fn test_list_ports_is_sorted() {
        // Enumeration may fail in sandboxed environments
        if let Ok(ports) = list_ports() {
            let mut names: Vec<_> = ports.iter().map(|p| p.name.clone()).collect();
            let listed = names.clone();
            names.sort();
            assert_eq!(names, listed);
        }
    }
}
