//! Lifecycle tags for transfers and wallet managers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::wire::{impl_wire_conversions, parse_name};
use crate::{TypeError, WireEnum};

/// The lifecycle phase of a transfer.
///
/// Payload such as a failure reason or block position travels in the
/// surrounding bundle, never in the tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStateType {
    /// Built locally, not yet signed.
    Created,
    /// Signed, not yet handed to the network.
    Signed,
    /// Handed to the network, awaiting inclusion.
    Submitted,
    /// Included in a block.
    Included,
    /// Failed.
    Errored,
    /// Removed by the wallet.
    Deleted,
}

impl TransferStateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Signed => "signed",
            Self::Submitted => "submitted",
            Self::Included => "included",
            Self::Errored => "errored",
            Self::Deleted => "deleted",
        }
    }
}

impl WireEnum for TransferStateType {
    const KIND: &'static str = "transfer state";

    const ALL: &'static [Self] = &[
        Self::Created,
        Self::Signed,
        Self::Submitted,
        Self::Included,
        Self::Errored,
        Self::Deleted,
    ];

    fn to_wire(self) -> u32 {
        match self {
            Self::Created => 0,
            Self::Signed => 1,
            Self::Submitted => 2,
            Self::Included => 3,
            Self::Errored => 4,
            Self::Deleted => 5,
        }
    }
}

impl_wire_conversions!(TransferStateType);

impl FromStr for TransferStateType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("failed") => Ok(Self::Errored),
            s => parse_name(s, |t: Self| t.as_str()),
        }
    }
}

impl fmt::Display for TransferStateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The connection state of a wallet manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletManagerStateType {
    Created,
    Disconnected,
    Connected,
    Syncing,
    Deleted,
}

impl WalletManagerStateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Syncing => "syncing",
            Self::Deleted => "deleted",
        }
    }
}

impl WireEnum for WalletManagerStateType {
    const KIND: &'static str = "wallet manager state";

    const ALL: &'static [Self] = &[
        Self::Created,
        Self::Disconnected,
        Self::Connected,
        Self::Syncing,
        Self::Deleted,
    ];

    fn to_wire(self) -> u32 {
        match self {
            Self::Created => 0,
            Self::Disconnected => 1,
            Self::Connected => 2,
            Self::Syncing => 3,
            Self::Deleted => 4,
        }
    }
}

impl_wire_conversions!(WalletManagerStateType);

impl FromStr for WalletManagerStateType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(s.trim(), |t: Self| t.as_str())
    }
}

impl fmt::Display for WalletManagerStateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_state_wire_order() {
        let wires: Vec<u32> = TransferStateType::ALL.iter().map(|t| t.to_wire()).collect();
        assert_eq!(wires, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn failed_is_an_alias_for_errored() {
        assert_eq!("failed".parse::<TransferStateType>(), Ok(TransferStateType::Errored));
        assert_eq!("Errored".parse::<TransferStateType>(), Ok(TransferStateType::Errored));
    }

    #[test]
    fn unknown_transfer_state_is_rejected() {
        assert!(matches!(
            TransferStateType::from_wire(6),
            Err(TypeError::UnrecognizedTag { value: 6, .. })
        ));
    }

    #[test]
    fn manager_state_round_trip() {
        for tag in WalletManagerStateType::ALL {
            assert_eq!(WalletManagerStateType::try_from(u32::from(*tag)), Ok(*tag));
        }
        assert!(WalletManagerStateType::try_from(5).is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&TransferStateType::Submitted).unwrap();
        assert_eq!(json, "\"submitted\"");
    }
}
