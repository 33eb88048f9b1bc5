//! Link-layer (MAC) address handed to the device on interface creation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a MAC address string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid MAC address: {0}")]
pub struct ParseMacError(pub String);

/// A 48-bit Ethernet MAC address.
///
/// Parses colon- or hyphen-separated hex and always prints lowercase with
/// colons, which is the form the device expects in its requests.
///
/// ```
/// use ifagent_dataplane::MacAddress;
///
/// let mac: MacAddress = "02-FE-00-00-00-01".parse().unwrap();
/// assert_eq!(mac.to_string(), "02:fe:00:00:00:01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// The all-zero address; the device treats it as "pick one for me".
    pub const ZERO: MacAddress = MacAddress([0; 6]);

    /// Creates a MAC address from raw bytes.
    pub const fn new(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }

    /// Returns the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Returns true for group (multicast or broadcast) addresses.
    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Returns true for the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }

    /// Returns true if the address can be assigned to an interface.
    pub fn is_assignable(&self) -> bool {
        !self.is_zero() && !self.is_multicast()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let separator = if s.contains(':') { ':' } else { '-' };

        let mut bytes = [0u8; 6];
        let mut count = 0;
        for part in s.split(separator) {
            if count == 6 || part.len() != 2 {
                return Err(ParseMacError(s.to_string()));
            }
            bytes[count] =
                u8::from_str_radix(part, 16).map_err(|_| ParseMacError(s.to_string()))?;
            count += 1;
        }
        if count != 6 {
            return Err(ParseMacError(s.to_string()));
        }

        Ok(MacAddress(bytes))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = ParseMacError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> String {
        mac.to_string()
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_both_separators() {
        let colon: MacAddress = "02:fe:0a:0b:0c:0d".parse().unwrap();
        let hyphen: MacAddress = "02-FE-0A-0B-0C-0D".parse().unwrap();
        assert_eq!(colon, hyphen);
        assert_eq!(colon.as_bytes(), &[0x02, 0xfe, 0x0a, 0x0b, 0x0c, 0x0d]);
    }

    #[test]
    fn test_display_is_lowercase_colon() {
        let mac = MacAddress::new([0xAA, 0xBB, 0xCC, 0x00, 0x11, 0x22]);
        assert_eq!(mac.to_string(), "aa:bb:cc:00:11:22");
    }

    #[test]
    fn test_assignable() {
        assert!(!MacAddress::ZERO.is_assignable());
        assert!(!"01:00:5e:00:00:01".parse::<MacAddress>().unwrap().is_assignable());
        assert!("02:00:00:00:00:01".parse::<MacAddress>().unwrap().is_assignable());
    }

    #[test]
    fn test_invalid_format() {
        assert!("".parse::<MacAddress>().is_err());
        assert!("00:11:22:33:44".parse::<MacAddress>().is_err());
        assert!("00:11:22:33:44:55:66".parse::<MacAddress>().is_err());
        assert!("gg:11:22:33:44:55".parse::<MacAddress>().is_err());
        assert!("0:11:22:33:44:55".parse::<MacAddress>().is_err());
    }
}
