use std::time::Duration;
use log::{info, warn};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use crate::drivers::ScopeError;
/// Common rates offered in the baud dropdown.
pub const BAUD_RATES: [u32; 8] = [1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200];
pub const DEFAULT_BAUD: u32 = 9600;
/// Largest rate accepted when the user types one in.
pub const MAX_CUSTOM_BAUD: u32 = 999_999;
const READ_TIMEOUT: Duration = Duration::from_millis(50);
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSettings {
    pub port_name: String,
    pub baud_rate: u32,
}
impl PortSettings {
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
        }
    }
}
/// Parses a baud rate typed into the editable dropdown.
pub fn parse_baud(input: &str) -> Result<u32, ScopeError> {
    let trimmed = input.trim();
    match trimmed.parse::<u32>() {
        Ok(rate) if (1..=MAX_CUSTOM_BAUD).contains(&rate) => Ok(rate),
        _ => Err(ScopeError::InvalidBaud(trimmed.to_string())),
    }
}
/// Names of the serial ports the OS currently reports.
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(err) => {
            warn!("port enumeration failed: {err}");
            Vec::new()
        }
    }
}
/// Checks the selected port against the last enumeration.
pub fn resolve_port(selected: &str, available: &[String]) -> Result<(), ScopeError> {
    if selected.is_empty() {
        return Err(ScopeError::NoPortSelected);
    }
    if available.iter().any(|name| name == selected) {
        Ok(())
    } else {
        Err(ScopeError::PortUnavailable(selected.to_string()))
    }
}
/// Opens the port as 8 data bits, 1 stop bit, no parity, no flow control.
pub fn open_port(settings: &PortSettings) -> Result<Box<dyn SerialPort>, ScopeError> {
    let port = serialport::new(settings.port_name.as_str(), settings.baud_rate)
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::One)
        .parity(Parity::None)
        .flow_control(FlowControl::None)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(|err| open_error(&settings.port_name, err))?;
    info!(
        "opened {} at {} baud (8N1)",
        settings.port_name, settings.baud_rate
    );
    Ok(port)
}
fn open_error(port: &str, err: serialport::Error) -> ScopeError {
    match err.kind() {
        serialport::ErrorKind::NoDevice => ScopeError::PortUnavailable(port.to_string()),
        _ => ScopeError::PortInUse {
            port: port.to_string(),
            reason: err.to_string(),
        },
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn empty_selection_is_rejected() {
        let err = resolve_port("", &["COM3".to_string()]).unwrap_err();
        assert!(matches!(err, ScopeError::NoPortSelected));
        assert_eq!(err.to_string(), "Must Select A Port To Connect To");
    }
    #[test]
    fn vanished_port_is_rejected() {
        let err = resolve_port("COM9", &["COM3".to_string()]).unwrap_err();
        assert!(matches!(err, ScopeError::PortUnavailable(ref p) if p == "COM9"));
        assert_eq!(err.to_string(), "Chosen Port No Longer Available");
    }
    #[test]
    fn first_listed_port_is_valid() {
        let ports = vec!["/dev/ttyUSB0".to_string(), "/dev/ttyUSB1".to_string()];
        assert!(resolve_port("/dev/ttyUSB0", &ports).is_ok());
        assert!(resolve_port("/dev/ttyUSB1", &ports).is_ok());
    }
    #[test]
    fn baud_parsing_accepts_custom_range() {
        assert_eq!(parse_baud("9600").unwrap(), 9600);
        assert_eq!(parse_baud(" 250000 ").unwrap(), 250_000);
        assert_eq!(parse_baud("999999").unwrap(), MAX_CUSTOM_BAUD);
        assert!(BAUD_RATES.contains(&DEFAULT_BAUD));
    }
    #[test]
    fn baud_parsing_rejects_out_of_range() {
        for bad in ["0", "1000000", "", "fast", "-9600", "96.5"] {
            assert!(
                matches!(parse_baud(bad), Err(ScopeError::InvalidBaud(_))),
                "accepted {bad:?}"
            );
        }
    }
    #[test]
    fn missing_device_maps_to_unavailable() {
        let err = serialport::Error::new(serialport::ErrorKind::NoDevice, "gone");
        assert!(matches!(open_error("COM4", err), ScopeError::PortUnavailable(_)));
        let err = serialport::Error::new(
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied),
            "busy",
        );
        let mapped = open_error("COM4", err);
        assert_eq!(mapped.to_string(), "Port Already In Use");
    }
}
