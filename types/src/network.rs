//! Network type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::wire::{impl_wire_conversions, parse_name};
use crate::{TypeError, WireEnum};

/// Identifies which blockchain a wallet or network instance targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Bitcoin.
    Btc,
    /// Bitcoin Cash.
    Bch,
    /// Bitcoin SV.
    Bsv,
    /// Ethereum.
    Eth,
    /// Ripple.
    Xrp,
    /// Hedera.
    Hbar,
    /// Tezos.
    Xtz,
}

impl NetworkType {
    /// Lowercase code of the network's native currency.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Btc => "btc",
            Self::Bch => "bch",
            Self::Bsv => "bsv",
            Self::Eth => "eth",
            Self::Xrp => "xrp",
            Self::Hbar => "hbar",
            Self::Xtz => "xtz",
        }
    }

    /// Decimal places between the native base unit and the default unit.
    pub fn decimals(&self) -> u8 {
        match self {
            Self::Btc | Self::Bch | Self::Bsv | Self::Hbar => 8,
            Self::Eth => 18,
            Self::Xrp | Self::Xtz => 6,
        }
    }

    /// Confirmations after which an included transfer is considered final.
    pub fn confirmations_until_final(&self) -> u32 {
        match self {
            Self::Btc | Self::Bch | Self::Bsv | Self::Eth => 6,
            Self::Xrp => 1,
            Self::Hbar => 0,
            Self::Xtz => 3,
        }
    }

    /// Metadata keys this chain recovers as transfer attributes.
    pub fn transfer_attribute_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Xrp => &["DestinationTag", "InvoiceId"],
            Self::Hbar => &["Memo"],
            Self::Btc | Self::Bch | Self::Bsv | Self::Eth | Self::Xtz => &[],
        }
    }
}

impl WireEnum for NetworkType {
    const KIND: &'static str = "network type";

    const ALL: &'static [Self] = &[
        Self::Btc,
        Self::Bch,
        Self::Bsv,
        Self::Eth,
        Self::Xrp,
        Self::Hbar,
        Self::Xtz,
    ];

    fn to_wire(self) -> u32 {
        match self {
            Self::Btc => 0,
            Self::Bch => 1,
            Self::Bsv => 2,
            Self::Eth => 3,
            Self::Xrp => 4,
            Self::Hbar => 5,
            Self::Xtz => 6,
        }
    }
}

impl_wire_conversions!(NetworkType);

impl FromStr for NetworkType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(s.trim(), |n: Self| n.as_str())
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}
