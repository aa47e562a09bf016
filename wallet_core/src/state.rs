//! Wallet manager connection state.

use serde::{Deserialize, Serialize};
use std::fmt;

use walletkit_types::{DisconnectReason, WalletManagerStateType};

/// Connection state of a wallet manager, with the disconnect reason attached
/// to the state it explains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WalletManagerState {
    Created,
    Disconnected { reason: DisconnectReason },
    Connected,
    Syncing,
    Deleted,
}

impl WalletManagerState {
    pub fn state_type(&self) -> WalletManagerStateType {
        match self {
            Self::Created => WalletManagerStateType::Created,
            Self::Disconnected { .. } => WalletManagerStateType::Disconnected,
            Self::Connected => WalletManagerStateType::Connected,
            Self::Syncing => WalletManagerStateType::Syncing,
            Self::Deleted => WalletManagerStateType::Deleted,
        }
    }

    pub fn can_connect(&self) -> bool {
        matches!(self, Self::Created | Self::Disconnected { .. })
    }

    pub fn can_disconnect(&self) -> bool {
        matches!(self, Self::Created | Self::Connected | Self::Syncing)
    }
}

impl fmt::Display for WalletManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { reason } => write!(f, "disconnected ({reason})"),
            other => f.write_str(other.state_type().as_str()),
        }
    }
}
