//! Wallet manager core for walletkit.
//!
//! Takes transfer bundles observed by a synchronization source and merges
//! them into persistent transfer records:
//! - Rich transfer state derived from each bundle
//! - Transfer store trait with an in-memory implementation
//! - Wallet manager connection lifecycle and change events
//! - Balance computation over reconciled transfers
//! - TOML configuration

pub mod config;
pub mod error;
pub mod manager;
pub mod state;
pub mod store;
pub mod transfer;

pub use config::WalletKitConfig;
pub use error::{StoreError, WalletCoreError};
pub use manager::{Reconciled, WalletManager, WalletManagerEvent};
pub use state::WalletManagerState;
pub use store::{MemoryTransferStore, TransferId, TransferStore};
pub use transfer::{TransferDirection, TransferRecord, TransferState};
