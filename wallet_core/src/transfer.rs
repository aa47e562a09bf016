//! Persistent transfer records and the state derived from bundles.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use walletkit_types::{DecimalAmount, NetworkType, TransferBundle, TransferStateType};

/// Error text used when the source reports failure without a reason.
const UNKNOWN_ERROR: &str = "unknown";

/// Transfer state with the payload the bare tag leaves out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransferState {
    Created,
    Signed,
    Submitted,
    /// In a block. `success` is false for transactions that were mined but
    /// failed on chain; their fee is still spent.
    Included {
        block_height: u64,
        transaction_index: u64,
        timestamp: u64,
        fee: Option<DecimalAmount>,
        success: bool,
        error: Option<String>,
    },
    Errored {
        reason: String,
    },
    Deleted,
}

impl TransferState {
    /// Derive the state a bundle describes.
    ///
    /// An `errored` bundle that carries a block height and timestamp was
    /// mined and failed, so it is reported as an unsuccessful inclusion. An
    /// `included` bundle without a block height cannot be placed and is
    /// treated as submitted.
    pub fn from_bundle(bundle: &TransferBundle) -> Self {
        let mined = match bundle.status() {
            TransferStateType::Included => bundle.block_height().is_some(),
            TransferStateType::Errored => {
                bundle.block_height().is_some() && bundle.block_timestamp().is_some()
            }
            _ => false,
        };

        if mined {
            let success = bundle.status() == TransferStateType::Included;
            return Self::Included {
                block_height: bundle.block_height().unwrap_or_default(),
                transaction_index: bundle.block_transaction_index().unwrap_or_default(),
                timestamp: bundle.block_timestamp().unwrap_or_default(),
                fee: bundle.fee().cloned(),
                success,
                error: (!success).then(|| UNKNOWN_ERROR.to_string()),
            };
        }

        match bundle.status() {
            TransferStateType::Created => Self::Created,
            TransferStateType::Signed => Self::Signed,
            TransferStateType::Submitted | TransferStateType::Included => Self::Submitted,
            TransferStateType::Errored => Self::Errored {
                reason: bundle
                    .metadata_value("error")
                    .unwrap_or(UNKNOWN_ERROR)
                    .to_string(),
            },
            TransferStateType::Deleted => Self::Deleted,
        }
    }

    pub fn state_type(&self) -> TransferStateType {
        match self {
            Self::Created => TransferStateType::Created,
            Self::Signed => TransferStateType::Signed,
            Self::Submitted => TransferStateType::Submitted,
            Self::Included { .. } => TransferStateType::Included,
            Self::Errored { .. } => TransferStateType::Errored,
            Self::Deleted => TransferStateType::Deleted,
        }
    }

    /// Confirmations at `current_height`; the including block counts as one.
    pub fn confirmations(&self, current_height: u64) -> Option<u64> {
        match self {
            Self::Included { block_height, .. } if current_height >= *block_height => {
                Some(current_height - block_height + 1)
            }
            Self::Included { .. } => Some(0),
            _ => None,
        }
    }

    pub fn is_final(&self, current_height: u64, confirmations_until_final: u32) -> bool {
        self.confirmations(current_height)
            .is_some_and(|c| c >= u64::from(confirmations_until_final))
    }

    /// Whether the transfer's amount moves funds.
    pub fn moves_amount(&self) -> bool {
        match self {
            Self::Included { success, .. } => *success,
            Self::Errored { .. } | Self::Deleted => false,
            Self::Created | Self::Signed | Self::Submitted => true,
        }
    }

    /// Whether the sender pays the fee.
    pub fn charges_fee(&self) -> bool {
        !matches!(self, Self::Errored { .. } | Self::Deleted)
    }
}

/// Direction of a transfer relative to the wallet's own addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Sent,
    Received,
    /// Both ends belong to the wallet.
    Recovered,
}

impl TransferDirection {
    /// `None` when neither end belongs to the wallet.
    pub fn find(addresses: &BTreeSet<String>, source: &str, target: &str) -> Option<Self> {
        match (addresses.contains(source), addresses.contains(target)) {
            (true, true) => Some(Self::Recovered),
            (true, false) => Some(Self::Sent),
            (false, true) => Some(Self::Received),
            (false, false) => None,
        }
    }
}

/// The wallet's persistent view of one transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub uids: Option<String>,
    pub hash: Option<String>,
    pub identifier: Option<String>,
    pub source: String,
    pub target: String,
    pub amount: DecimalAmount,
    pub fee: Option<DecimalAmount>,
    pub currency: String,
    pub direction: TransferDirection,
    pub state: TransferState,
    pub attributes: BTreeMap<String, String>,
}

impl TransferRecord {
    /// Create a record from a bundle the wallet has not seen before.
    pub fn from_bundle(
        bundle: TransferBundle,
        network: NetworkType,
        direction: TransferDirection,
    ) -> Self {
        let state = TransferState::from_bundle(&bundle);
        let attributes = recover_attributes(&bundle, network);
        Self {
            uids: bundle.uids().map(str::to_string),
            hash: bundle.hash().map(str::to_string),
            identifier: bundle.identifier().map(str::to_string),
            source: bundle.from_address().to_string(),
            target: bundle.to_address().to_string(),
            amount: bundle.amount().clone(),
            fee: bundle.fee().cloned(),
            currency: bundle.currency().to_string(),
            direction,
            state,
            attributes,
        }
    }

    /// Merge a later observation of the same transfer into this record.
    ///
    /// Identity fields are only filled in, never cleared; state and fee
    /// follow the newest observation.
    pub fn merge(&mut self, bundle: &TransferBundle, network: NetworkType) {
        if let Some(uids) = bundle.uids() {
            self.uids = Some(uids.to_string());
        }
        if self.hash.is_none() {
            self.hash = bundle.hash().map(str::to_string);
        }
        if self.identifier.is_none() {
            self.identifier = bundle.identifier().map(str::to_string);
        }
        if let Some(fee) = bundle.fee() {
            self.fee = Some(fee.clone());
        }
        self.state = TransferState::from_bundle(bundle);
        self.attributes.extend(recover_attributes(bundle, network));
    }

    /// Whether a bundle identifies this record: same target and a matching
    /// hash or uids.
    pub fn matches(&self, hash: Option<&str>, uids: Option<&str>, target: &str) -> bool {
        let same = |ours: &Option<String>, theirs: Option<&str>| {
            matches!((ours.as_deref(), theirs), (Some(a), Some(b)) if a == b)
        };
        self.target == target && (same(&self.hash, hash) || same(&self.uids, uids))
    }
}

/// Copy the metadata entries the network treats as transfer attributes.
///
/// Keys are matched ignoring ASCII case and stored under the network's
/// canonical spelling.
pub fn recover_attributes(bundle: &TransferBundle, network: NetworkType) -> BTreeMap<String, String> {
    network
        .transfer_attribute_keys()
        .iter()
        .filter_map(|key| {
            bundle
                .metadata_value(key)
                .map(|value| (key.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use walletkit_types::TransferBundleBuilder;

    fn bundle(status: TransferStateType) -> TransferBundleBuilder {
        TransferBundle::builder(status)
            .hash("0xaa")
            .uids("u-1")
            .from("me")
            .to("you")
            .amount("5")
            .currency("eth")
            .fee("0.1")
    }

    fn mine() -> BTreeSet<String> {
        ["me".to_string()].into_iter().collect()
    }

    fn sent(bundle: TransferBundle) -> TransferRecord {
        TransferRecord::from_bundle(bundle, NetworkType::Eth, TransferDirection::Sent)
    }

    #[test]
    fn included_bundle_derives_included_state() {
        let b = bundle(TransferStateType::Included)
            .block_height(10u64)
            .block_transaction_index(3u64)
            .block_timestamp(99u64)
            .build()
            .unwrap();
        let state = TransferState::from_bundle(&b);
        assert_eq!(
            state,
            TransferState::Included {
                block_height: 10,
                transaction_index: 3,
                timestamp: 99,
                fee: Some("0.1".parse().unwrap()),
                success: true,
                error: None,
            }
        );
    }

    #[test]
    fn errored_bundle_in_block_is_failed_inclusion() {
        let b = bundle(TransferStateType::Errored)
            .block_height(10u64)
            .block_timestamp(99u64)
            .build()
            .unwrap();
        match TransferState::from_bundle(&b) {
            TransferState::Included { success, error, .. } => {
                assert!(!success);
                assert_eq!(error.as_deref(), Some("unknown"));
            }
            other => panic!("expected included, got {other:?}"),
        }
    }

    #[test]
    fn errored_bundle_without_block_is_errored() {
        let b = bundle(TransferStateType::Errored).block_height(10u64).build().unwrap();
        assert_eq!(
            TransferState::from_bundle(&b),
            TransferState::Errored { reason: "unknown".into() }
        );

        let b = bundle(TransferStateType::Errored)
            .meta("error", "nonce too low")
            .build()
            .unwrap();
        assert_eq!(
            TransferState::from_bundle(&b),
            TransferState::Errored { reason: "nonce too low".into() }
        );
    }

    #[test]
    fn included_without_height_falls_back_to_submitted() {
        let b = bundle(TransferStateType::Included).build().unwrap();
        assert_eq!(TransferState::from_bundle(&b), TransferState::Submitted);
    }

    #[test]
    fn plain_tags_map_one_to_one() {
        for (tag, expected) in [
            (TransferStateType::Created, TransferState::Created),
            (TransferStateType::Signed, TransferState::Signed),
            (TransferStateType::Submitted, TransferState::Submitted),
            (TransferStateType::Deleted, TransferState::Deleted),
        ] {
            let b = bundle(tag).build().unwrap();
            let state = TransferState::from_bundle(&b);
            assert_eq!(state.state_type(), tag);
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn confirmations_count_the_including_block() {
        let state = TransferState::Included {
            block_height: 100,
            transaction_index: 0,
            timestamp: 0,
            fee: None,
            success: true,
            error: None,
        };
        assert_eq!(state.confirmations(100), Some(1));
        assert_eq!(state.confirmations(105), Some(6));
        assert_eq!(state.confirmations(50), Some(0));
        assert!(state.is_final(105, 6));
        assert!(!state.is_final(104, 6));
        assert_eq!(TransferState::Submitted.confirmations(200), None);
    }

    #[test]
    fn direction_from_own_addresses() {
        let addrs = mine();
        assert_eq!(TransferDirection::find(&addrs, "me", "you"), Some(TransferDirection::Sent));
        assert_eq!(TransferDirection::find(&addrs, "you", "me"), Some(TransferDirection::Received));
        assert_eq!(TransferDirection::find(&addrs, "me", "me"), Some(TransferDirection::Recovered));
    }

    #[test]
    fn transfer_between_strangers_has_no_direction() {
        assert_eq!(TransferDirection::find(&mine(), "stranger", "other"), None);
        assert_eq!(TransferDirection::find(&BTreeSet::new(), "me", "you"), None);
    }

    #[test]
    fn record_matches_on_hash_or_uids_with_same_target() {
        let record = sent(bundle(TransferStateType::Submitted).build().unwrap());
        assert!(record.matches(Some("0xaa"), None, "you"));
        assert!(record.matches(None, Some("u-1"), "you"));
        assert!(!record.matches(Some("0xaa"), Some("u-1"), "someone-else"));
        assert!(!record.matches(None, None, "you"));
    }

    #[test]
    fn attributes_are_filtered_per_network() {
        let b = bundle(TransferStateType::Submitted)
            .meta("destinationtag", "42")
            .meta("unrelated", "x")
            .build()
            .unwrap();
        let xrp = recover_attributes(&b, NetworkType::Xrp);
        assert_eq!(xrp.get("DestinationTag").map(String::as_str), Some("42"));
        assert_eq!(xrp.len(), 1);
        assert!(recover_attributes(&b, NetworkType::Btc).is_empty());
    }

    #[test]
    fn merge_keeps_identity_and_updates_state() {
        let mut record = sent(bundle(TransferStateType::Submitted).hash("").build().unwrap());
        assert!(record.hash.is_none());

        let later = bundle(TransferStateType::Included)
            .block_height(7u64)
            .block_timestamp(1u64)
            .build()
            .unwrap();
        record.merge(&later, NetworkType::Eth);
        assert_eq!(record.hash.as_deref(), Some("0xaa"));
        assert_eq!(record.state.state_type(), TransferStateType::Included);
    }
}
