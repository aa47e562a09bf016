//! Why a wallet manager's network connection ended.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::wire::{impl_wire_conversions, parse_name};
use crate::{TypeError, WireEnum};

/// Disconnect reason tag, as exchanged on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisconnectReasonType {
    Requested,
    Unknown,
    Posix,
}

impl DisconnectReasonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Unknown => "unknown",
            Self::Posix => "posix",
        }
    }
}

impl WireEnum for DisconnectReasonType {
    const KIND: &'static str = "disconnect reason";

    const ALL: &'static [Self] = &[Self::Requested, Self::Unknown, Self::Posix];

    fn to_wire(self) -> u32 {
        match self {
            Self::Requested => 0,
            Self::Unknown => 1,
            Self::Posix => 2,
        }
    }
}

impl_wire_conversions!(DisconnectReasonType);

impl FromStr for DisconnectReasonType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(s.trim(), |t: Self| t.as_str())
    }
}

impl fmt::Display for DisconnectReasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disconnect reason with its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DisconnectReason {
    Requested,
    Unknown,
    /// The platform reported an error; `errno` is the raw OS error number.
    Posix { errno: i32 },
}

impl DisconnectReason {
    pub fn reason_type(&self) -> DisconnectReasonType {
        match self {
            Self::Requested => DisconnectReasonType::Requested,
            Self::Unknown => DisconnectReasonType::Unknown,
            Self::Posix { .. } => DisconnectReasonType::Posix,
        }
    }

    /// The OS error behind a `Posix` reason.
    pub fn os_error(&self) -> Option<std::io::Error> {
        match self {
            Self::Posix { errno } => Some(std::io::Error::from_raw_os_error(*errno)),
            _ => None,
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posix { errno } => write!(f, "posix error {errno}"),
            other => f.write_str(other.reason_type().as_str()),
        }
    }
}
