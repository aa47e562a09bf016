use thiserror::Error;

use walletkit_types::{TypeError, WalletManagerStateType};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transfer not found: {0}")]
    NotFound(u64),

    #[error("storage lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum WalletCoreError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot {action} a wallet manager that is {from}")]
    InvalidStateTransition {
        from: WalletManagerStateType,
        action: &'static str,
    },

    #[error("transfer {sender} -> {recipient} involves none of the wallet's addresses")]
    UnrelatedTransfer { sender: String, recipient: String },

    #[error("amount {value} {currency} cannot be expressed in base units")]
    Amount { currency: String, value: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("wallet manager lock poisoned")]
    Poisoned,
}
