//! The wallet manager: connection lifecycle and transfer reconciliation for
//! one network.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use walletkit_types::{DecimalAmount, DisconnectReason, NetworkType, TransferBundle, TransferStateType};

use crate::config::WalletKitConfig;
use crate::error::WalletCoreError;
use crate::state::WalletManagerState;
use crate::store::{MemoryTransferStore, TransferId, TransferStore};
use crate::transfer::{TransferDirection, TransferRecord, TransferState};

/// Changes announced by a wallet manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletManagerEvent {
    Created {
        network: NetworkType,
    },
    StateChanged {
        old: WalletManagerState,
        new: WalletManagerState,
    },
    BlockHeightUpdated {
        height: u64,
    },
    TransferAdded {
        id: TransferId,
        record: TransferRecord,
    },
    TransferChanged {
        id: TransferId,
        old: TransferState,
        new: TransferState,
    },
}

/// What reconciling one bundle did to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciled {
    Added(TransferId),
    Updated(TransferId),
    /// The bundle repeated what the store already held.
    Unchanged(TransferId),
}

impl Reconciled {
    pub fn id(&self) -> TransferId {
        match self {
            Self::Added(id) | Self::Updated(id) | Self::Unchanged(id) => *id,
        }
    }
}

struct Inner {
    state: WalletManagerState,
    block_height: u64,
}

/// Owns synchronization state and transfer records for one network.
///
/// Methods take `&self`; share a manager across threads with `Arc`.
pub struct WalletManager<S = MemoryTransferStore> {
    network: NetworkType,
    addresses: BTreeSet<String>,
    confirmations_until_final: u32,
    store: S,
    inner: Mutex<Inner>,
    events: UnboundedSender<WalletManagerEvent>,
}

impl WalletManager<MemoryTransferStore> {
    /// Create a manager backed by an in-memory store.
    pub fn in_memory(
        config: &WalletKitConfig,
    ) -> (Self, UnboundedReceiver<WalletManagerEvent>) {
        Self::new(config, MemoryTransferStore::new())
    }
}

impl<S: TransferStore> WalletManager<S> {
    /// Create a manager and the receiver for its events.
    pub fn new(config: &WalletKitConfig, store: S) -> (Self, UnboundedReceiver<WalletManagerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let manager = Self {
            network: config.network,
            addresses: config.addresses.iter().cloned().collect(),
            confirmations_until_final: config.confirmations_until_final(),
            store,
            inner: Mutex::new(Inner {
                state: WalletManagerState::Created,
                block_height: 0,
            }),
            events,
        };
        info!(network = %manager.network, addresses = manager.addresses.len(), "wallet manager created");
        manager.emit(WalletManagerEvent::Created {
            network: manager.network,
        });
        (manager, receiver)
    }

    pub fn network(&self) -> NetworkType {
        self.network
    }

    pub fn addresses(&self) -> &BTreeSet<String> {
        &self.addresses
    }

    pub fn confirmations_until_final(&self) -> u32 {
        self.confirmations_until_final
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> Result<WalletManagerState, WalletCoreError> {
        Ok(self.lock()?.state)
    }

    pub fn block_height(&self) -> Result<u64, WalletCoreError> {
        Ok(self.lock()?.block_height)
    }

    // ── Connection lifecycle ────────────────────────────────────────────

    pub fn connect(&self) -> Result<(), WalletCoreError> {
        self.transition("connect", WalletManagerState::can_connect, WalletManagerState::Connected)
    }

    pub fn disconnect(&self, reason: DisconnectReason) -> Result<(), WalletCoreError> {
        self.transition(
            "disconnect",
            WalletManagerState::can_disconnect,
            WalletManagerState::Disconnected { reason },
        )
    }

    /// Begin a sync; only a connected manager can sync.
    pub fn sync(&self) -> Result<(), WalletCoreError> {
        self.transition(
            "sync",
            |s| *s == WalletManagerState::Connected,
            WalletManagerState::Syncing,
        )
    }

    /// Finish a sync at the given chain height.
    pub fn sync_completed(&self, height: u64) -> Result<(), WalletCoreError> {
        self.transition(
            "complete a sync of",
            |s| *s == WalletManagerState::Syncing,
            WalletManagerState::Connected,
        )?;
        self.set_block_height(height)
    }

    /// Delete the manager. Deleted is terminal.
    pub fn delete(&self) -> Result<(), WalletCoreError> {
        self.transition(
            "delete",
            |s| *s != WalletManagerState::Deleted,
            WalletManagerState::Deleted,
        )
    }

    /// Record a new chain height; heights never move backwards.
    pub fn set_block_height(&self, height: u64) -> Result<(), WalletCoreError> {
        let mut inner = self.lock()?;
        if height <= inner.block_height {
            return Ok(());
        }
        inner.block_height = height;
        drop(inner);
        debug!(network = %self.network, height, "block height updated");
        self.emit(WalletManagerEvent::BlockHeightUpdated { height });
        Ok(())
    }

    fn transition(
        &self,
        action: &'static str,
        allowed: impl FnOnce(&WalletManagerState) -> bool,
        next: WalletManagerState,
    ) -> Result<(), WalletCoreError> {
        let mut inner = self.lock()?;
        let old = inner.state;
        if !allowed(&old) {
            return Err(WalletCoreError::InvalidStateTransition {
                from: old.state_type(),
                action,
            });
        }
        inner.state = next;
        drop(inner);

        info!(network = %self.network, from = %old, to = %next, "wallet manager state changed");
        self.emit(WalletManagerEvent::StateChanged { old, new: next });
        Ok(())
    }

    // ── Reconciliation ──────────────────────────────────────────────────

    /// Merge one observed bundle into the transfer store.
    ///
    /// The bundle is matched to an existing record by target plus hash or
    /// uids. Re-delivering a bundle the store already reflects is a no-op. A
    /// new bundle with neither end among the wallet's addresses is rejected
    /// with [`WalletCoreError::UnrelatedTransfer`].
    pub fn recover_transfer(&self, bundle: TransferBundle) -> Result<Reconciled, WalletCoreError> {
        // Held for the whole merge so concurrent bundles for one transfer
        // cannot both miss the lookup and insert twice.
        let inner = self.lock()?;
        if inner.state == WalletManagerState::Deleted {
            return Err(WalletCoreError::InvalidStateTransition {
                from: inner.state.state_type(),
                action: "reconcile transfers for",
            });
        }

        let existing = self.store.find_by_hash_or_uids_and_target(
            bundle.hash(),
            bundle.uids(),
            bundle.to_address(),
        )?;
        let unplaced =
            bundle.status() == TransferStateType::Included && bundle.block_height().is_none();

        let outcome = match existing {
            Some((id, record)) => {
                let mut merged = record.clone();
                merged.merge(&bundle, self.network);
                if merged == record {
                    debug!(id = id.0, hash = ?bundle.hash(), "transfer unchanged");
                    Reconciled::Unchanged(id)
                } else {
                    self.store.update(id, merged.clone())?;
                    if unplaced {
                        warn_unplaced(id, bundle.hash());
                    }
                    debug!(
                        id = id.0,
                        hash = ?merged.hash,
                        state = %merged.state.state_type(),
                        "transfer updated"
                    );
                    if merged.state != record.state {
                        self.emit(WalletManagerEvent::TransferChanged {
                            id,
                            old: record.state,
                            new: merged.state,
                        });
                    }
                    Reconciled::Updated(id)
                }
            }
            None => {
                let Some(direction) = TransferDirection::find(
                    &self.addresses,
                    bundle.from_address(),
                    bundle.to_address(),
                ) else {
                    warn!(
                        network = %self.network,
                        hash = ?bundle.hash(),
                        from = bundle.from_address(),
                        to = bundle.to_address(),
                        "transfer involves none of the wallet's addresses; rejected"
                    );
                    return Err(WalletCoreError::UnrelatedTransfer {
                        sender: bundle.from_address().to_string(),
                        recipient: bundle.to_address().to_string(),
                    });
                };
                let record = TransferRecord::from_bundle(bundle, self.network, direction);
                let id = self.store.insert(record.clone())?;
                if unplaced {
                    warn_unplaced(id, record.hash.as_deref());
                }
                debug!(
                    id = id.0,
                    hash = ?record.hash,
                    uids = ?record.uids,
                    direction = ?record.direction,
                    "transfer added"
                );
                self.emit(WalletManagerEvent::TransferAdded { id, record });
                Reconciled::Added(id)
            }
        };
        drop(inner);
        Ok(outcome)
    }

    pub fn transfers(&self) -> Result<Vec<TransferRecord>, WalletCoreError> {
        Ok(self.store.iter()?.into_iter().map(|(_, r)| r).collect())
    }

    /// Confirmations of a transfer at the manager's current height.
    pub fn confirmations(&self, record: &TransferRecord) -> Result<Option<u64>, WalletCoreError> {
        Ok(record.state.confirmations(self.block_height()?))
    }

    pub fn is_final(&self, record: &TransferRecord) -> Result<bool, WalletCoreError> {
        Ok(record
            .state
            .is_final(self.block_height()?, self.confirmations_until_final))
    }

    // ── Balances ────────────────────────────────────────────────────────

    /// Balance of the network's native currency, in base units.
    pub fn balance(&self) -> Result<u128, WalletCoreError> {
        self.token_balance(self.network.as_str(), self.network.decimals())
    }

    /// Balance of `currency`, in base units with `decimals` places.
    ///
    /// Fees are paid in the native currency, so they only reduce the native
    /// balance. Pending transfers count; failed ones only cost their fee.
    pub fn token_balance(&self, currency: &str, decimals: u8) -> Result<u128, WalletCoreError> {
        let native = currency.eq_ignore_ascii_case(self.network.as_str());
        let native_decimals = self.network.decimals();
        let mut credits: u128 = 0;
        let mut debits: u128 = 0;

        for (_, record) in self.store.iter()? {
            if record.currency.eq_ignore_ascii_case(currency) && record.state.moves_amount() {
                let amount = base_units(&record.amount, currency, decimals)?;
                match record.direction {
                    TransferDirection::Received => credits = credits.saturating_add(amount),
                    TransferDirection::Sent => debits = debits.saturating_add(amount),
                    TransferDirection::Recovered => {}
                }
            }
            if native && record.direction != TransferDirection::Received && record.state.charges_fee() {
                if let Some(fee) = &record.fee {
                    debits = debits.saturating_add(base_units(fee, currency, native_decimals)?);
                }
            }
        }
        Ok(credits.saturating_sub(debits))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, WalletCoreError> {
        self.inner.lock().map_err(|_| WalletCoreError::Poisoned)
    }

    fn emit(&self, event: WalletManagerEvent) {
        if self.events.send(event).is_err() {
            warn!(network = %self.network, "wallet manager event dropped: receiver closed");
        }
    }
}

fn warn_unplaced(id: TransferId, hash: Option<&str>) {
    warn!(id = id.0, hash = ?hash, "included transfer has no block height; treating as submitted");
}

fn base_units(amount: &DecimalAmount, currency: &str, decimals: u8) -> Result<u128, WalletCoreError> {
    amount
        .to_base_units(decimals)
        .ok_or_else(|| WalletCoreError::Amount {
            currency: currency.to_string(),
            value: amount.to_string(),
        })
}
