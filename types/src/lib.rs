//! Fundamental types for walletkit.
//!
//! This crate defines the values exchanged between synchronization sources and
//! the reconciliation core: the transfer bundle snapshot, decimal amounts, and
//! the closed enumerations with their stable wire values.

pub mod amount;
pub mod bundle;
pub mod disconnect;
pub mod error;
pub mod network;
pub mod state;
pub mod wire;

pub use amount::DecimalAmount;
pub use bundle::{ClientTransferRecord, TransferBundle, TransferBundleBuilder};
pub use disconnect::{DisconnectReason, DisconnectReasonType};
pub use error::TypeError;
pub use network::NetworkType;
pub use state::{TransferStateType, WalletManagerStateType};
pub use wire::WireEnum;
