/*!
 * Device/Partition Tokens
 * Parsing of `dev[:part]` arguments
 */

use std::fmt;
use std::str::FromStr;

use crate::core::FsError;

/// Which partition of a device to bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartSelector {
    /// First declared partition, falling back to the whole disk
    Auto,
    /// The whole disk (`dev:0`)
    WholeDisk,
    /// Partition with the given index
    Index(u32),
}

/// Parsed `dev[:part]` token
///
/// The device number is hexadecimal, the partition number decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevicePartSpec {
    pub device: u32,
    pub partition: PartSelector,
}

impl DevicePartSpec {
    pub const fn new(device: u32, partition: PartSelector) -> Self {
        Self { device, partition }
    }

    /// Spec used when the caller omits the token
    pub const fn default_device() -> Self {
        Self::new(0, PartSelector::Auto)
    }

    /// Parse an optional token, treating a missing or empty one as the default device
    pub fn parse_opt(token: Option<&str>) -> Result<Self, FsError> {
        match token.map(str::trim) {
            None | Some("") => Ok(Self::default_device()),
            Some(s) => s.parse(),
        }
    }
}

impl FromStr for DevicePartSpec {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (dev_str, part_str) = match s.split_once(':') {
            Some((dev, part)) => (dev, Some(part)),
            None => (s, None),
        };

        let dev_digits = dev_str
            .strip_prefix("0x")
            .or_else(|| dev_str.strip_prefix("0X"))
            .unwrap_or(dev_str);
        let device = u32::from_str_radix(dev_digits, 16)
            .map_err(|_| FsError::DeviceResolution(format!("bad device specification {}", s)))?;

        let partition = match part_str {
            None | Some("") | Some("auto") => PartSelector::Auto,
            Some(p) => match p.parse::<u32>() {
                Ok(0) => PartSelector::WholeDisk,
                Ok(n) => PartSelector::Index(n),
                Err(_) => {
                    return Err(FsError::DeviceResolution(format!(
                        "bad partition specification {}",
                        s
                    )))
                }
            },
        };

        Ok(Self { device, partition })
    }
}

impl fmt::Display for DevicePartSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.partition {
            PartSelector::Auto => write!(f, "{:x}", self.device),
            PartSelector::WholeDisk => write!(f, "{:x}:0", self.device),
            PartSelector::Index(n) => write!(f, "{:x}:{}", self.device, n),
        }
    }
}
