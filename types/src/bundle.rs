//! Transfer bundles: immutable snapshots of one transfer's observed state.
//!
//! A bundle is built once per observation from a synchronization source,
//! moved into the reconciliation core, and dropped after the merge. It is a
//! transport object: cross-field consistency (status vs. block position) is
//! not checked here and inconsistent source data is preserved as delivered.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{DecimalAmount, TransferStateType, TypeError};

/// One transfer as observed at a point in synchronization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferBundle {
    status: TransferStateType,
    hash: Option<String>,
    identifier: Option<String>,
    uids: Option<String>,
    from: String,
    to: String,
    amount: DecimalAmount,
    currency: String,
    fee: Option<DecimalAmount>,
    transfer_index: u64,
    block_timestamp: Option<u64>,
    block_height: Option<u64>,
    block_confirmations: Option<u64>,
    block_transaction_index: Option<u64>,
    block_hash: Option<String>,
    metadata: BTreeMap<String, String>,
}

impl TransferBundle {
    /// Start building a bundle with the given status.
    pub fn builder(status: TransferStateType) -> TransferBundleBuilder {
        TransferBundleBuilder::new(status)
    }

    pub fn status(&self) -> TransferStateType {
        self.status
    }

    /// Chain transaction identifier.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Correlation id assigned by the synchronization source.
    pub fn uids(&self) -> Option<&str> {
        self.uids.as_deref()
    }

    /// Source address.
    pub fn from_address(&self) -> &str {
        &self.from
    }

    /// Target address.
    pub fn to_address(&self) -> &str {
        &self.to
    }

    pub fn amount(&self) -> &DecimalAmount {
        &self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn fee(&self) -> Option<&DecimalAmount> {
        self.fee.as_ref()
    }

    /// Position within a block or submission.
    pub fn transfer_index(&self) -> u64 {
        self.transfer_index
    }

    pub fn block_timestamp(&self) -> Option<u64> {
        self.block_timestamp
    }

    pub fn block_height(&self) -> Option<u64> {
        self.block_height
    }

    pub fn block_confirmations(&self) -> Option<u64> {
        self.block_confirmations
    }

    pub fn block_transaction_index(&self) -> Option<u64> {
        self.block_transaction_index
    }

    pub fn block_hash(&self) -> Option<&str> {
        self.block_hash.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Metadata lookup ignoring ASCII case of the key.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for [`TransferBundle`].
///
/// Setters never fail; the first invalid input is remembered and reported by
/// [`TransferBundleBuilder::build`].
#[derive(Clone, Debug)]
pub struct TransferBundleBuilder {
    status: TransferStateType,
    hash: String,
    identifier: String,
    uids: String,
    from: String,
    to: String,
    amount: String,
    currency: String,
    fee: String,
    transfer_index: u64,
    block_timestamp: Option<u64>,
    block_height: Option<u64>,
    block_confirmations: Option<u64>,
    block_transaction_index: Option<u64>,
    block_hash: String,
    metadata: BTreeMap<String, String>,
    error: Option<TypeError>,
}

impl TransferBundleBuilder {
    pub fn new(status: TransferStateType) -> Self {
        Self {
            status,
            hash: String::new(),
            identifier: String::new(),
            uids: String::new(),
            from: String::new(),
            to: String::new(),
            amount: String::new(),
            currency: String::new(),
            fee: String::new(),
            transfer_index: 0,
            block_timestamp: None,
            block_height: None,
            block_confirmations: None,
            block_transaction_index: None,
            block_hash: String::new(),
            metadata: BTreeMap::new(),
            error: None,
        }
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn uids(mut self, uids: impl Into<String>) -> Self {
        self.uids = uids.into();
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = amount.into();
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn fee(mut self, fee: impl Into<String>) -> Self {
        self.fee = fee.into();
        self
    }

    pub fn transfer_index<N: TryInto<u64>>(mut self, index: N) -> Self {
        self.transfer_index = self.number("transfer_index", index).unwrap_or(0);
        self
    }

    pub fn block_timestamp<N: TryInto<u64>>(mut self, timestamp: N) -> Self {
        self.block_timestamp = self.number("block_timestamp", timestamp);
        self
    }

    pub fn block_height<N: TryInto<u64>>(mut self, height: N) -> Self {
        self.block_height = self.number("block_height", height);
        self
    }

    pub fn block_confirmations<N: TryInto<u64>>(mut self, confirmations: N) -> Self {
        self.block_confirmations = self.number("block_confirmations", confirmations);
        self
    }

    pub fn block_transaction_index<N: TryInto<u64>>(mut self, index: N) -> Self {
        self.block_transaction_index = self.number("block_transaction_index", index);
        self
    }

    pub fn block_hash(mut self, block_hash: impl Into<String>) -> Self {
        self.block_hash = block_hash.into();
        self
    }

    /// Add one metadata entry; a repeated key replaces the earlier value.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn metadata<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.metadata
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add metadata given as parallel arrays of raw key and value bytes.
    pub fn raw_metadata(mut self, keys: &[&[u8]], values: &[&[u8]]) -> Self {
        if keys.len() != values.len() {
            self.fail(TypeError::MetadataCountMismatch {
                keys: keys.len(),
                values: values.len(),
            });
            return self;
        }
        for (key, value) in keys.iter().zip(values) {
            match (decode_text("metadata key", key), decode_text("metadata value", value)) {
                (Ok(k), Ok(v)) => {
                    self.metadata.insert(k, v);
                }
                (Err(e), _) | (_, Err(e)) => {
                    self.fail(e);
                    break;
                }
            }
        }
        self
    }

    /// Validate the collected fields and produce the bundle.
    pub fn build(self) -> Result<TransferBundle, TypeError> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let text_fields = [
            ("hash", &self.hash),
            ("identifier", &self.identifier),
            ("uids", &self.uids),
            ("from", &self.from),
            ("to", &self.to),
            ("amount", &self.amount),
            ("currency", &self.currency),
            ("fee", &self.fee),
            ("block_hash", &self.block_hash),
        ];
        for (field, value) in text_fields {
            reject_nul(field, value)?;
        }
        for (key, value) in &self.metadata {
            reject_nul("metadata key", key)?;
            reject_nul("metadata value", value)?;
        }

        let hash = non_empty(self.hash);
        let uids = non_empty(self.uids);
        if hash.is_none() && uids.is_none() {
            return Err(TypeError::MissingIdentity);
        }

        let amount = DecimalAmount::parse("amount", &self.amount)?;
        let fee = match self.fee.as_str() {
            "" => None,
            fee => Some(DecimalAmount::parse("fee", fee)?),
        };

        Ok(TransferBundle {
            status: self.status,
            hash,
            identifier: non_empty(self.identifier),
            uids,
            from: self.from,
            to: self.to,
            amount,
            currency: self.currency,
            fee,
            transfer_index: self.transfer_index,
            block_timestamp: self.block_timestamp,
            block_height: self.block_height,
            block_confirmations: self.block_confirmations,
            block_transaction_index: self.block_transaction_index,
            block_hash: non_empty(self.block_hash),
            metadata: self.metadata,
        })
    }

    fn number<N: TryInto<u64>>(&mut self, field: &'static str, value: N) -> Option<u64> {
        match value.try_into() {
            Ok(v) => Some(v),
            Err(_) => {
                self.fail(TypeError::OutOfRange { field });
                None
            }
        }
    }

    fn fail(&mut self, error: TypeError) {
        self.error.get_or_insert(error);
    }
}

/// Decode raw bytes as a text field.
pub fn decode_text(field: &'static str, bytes: &[u8]) -> Result<String, TypeError> {
    let text = std::str::from_utf8(bytes).map_err(|_| TypeError::Encoding { field })?;
    reject_nul(field, text)?;
    Ok(text.to_string())
}

fn reject_nul(field: &'static str, value: &str) -> Result<(), TypeError> {
    if value.contains('\0') {
        Err(TypeError::EmbeddedNul { field })
    } else {
        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// A transfer as delivered by a block-explorer client.
///
/// Absence is explicit: empty strings for missing text, zero for missing
/// numbers. A zero `block_height` means the transfer is not in a block yet,
/// and the whole block position is dropped on conversion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTransferRecord {
    pub status: TransferStateType,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub uids: String,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub currency: String,
    #[serde(default)]
    pub fee: String,
    #[serde(default)]
    pub transfer_index: i64,
    #[serde(default)]
    pub block_timestamp: i64,
    #[serde(default)]
    pub block_height: i64,
    #[serde(default)]
    pub block_confirmations: i64,
    #[serde(default)]
    pub block_transaction_index: i64,
    #[serde(default)]
    pub block_hash: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl TryFrom<ClientTransferRecord> for TransferBundle {
    type Error = TypeError;

    fn try_from(record: ClientTransferRecord) -> Result<Self, Self::Error> {
        let transfer_index = non_negative("transfer_index", record.transfer_index)?;
        let block_height = non_negative("block_height", record.block_height)?;
        let block_timestamp = non_negative("block_timestamp", record.block_timestamp)?;
        let block_confirmations =
            non_negative("block_confirmations", record.block_confirmations)?;
        let block_transaction_index =
            non_negative("block_transaction_index", record.block_transaction_index)?;

        let mut builder = TransferBundle::builder(record.status)
            .hash(record.hash)
            .identifier(record.identifier)
            .uids(record.uids)
            .from(record.from)
            .to(record.to)
            .amount(record.amount)
            .currency(record.currency)
            .fee(record.fee)
            .transfer_index(transfer_index)
            .block_hash(record.block_hash)
            .metadata(record.meta);

        if block_height != 0 {
            builder = builder
                .block_height(block_height)
                .block_timestamp(block_timestamp)
                .block_confirmations(block_confirmations)
                .block_transaction_index(block_transaction_index);
        }
        builder.build()
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u64, TypeError> {
    u64::try_from(value).map_err(|_| TypeError::OutOfRange { field })
}
