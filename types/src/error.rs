//! Error type shared by bundle construction and wire decoding.

use thiserror::Error;

/// Errors raised while building bundles or decoding wire values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("unrecognized {kind} tag: {value}")]
    UnrecognizedTag { kind: &'static str, value: u32 },

    #[error("unrecognized {kind} name: {name:?}")]
    UnrecognizedName { kind: &'static str, name: String },

    #[error("transfer has neither a hash nor uids")]
    MissingIdentity,

    #[error("field `{field}` is out of range for a non-negative 64-bit integer")]
    OutOfRange { field: &'static str },

    #[error("field `{field}` contains an embedded NUL")]
    EmbeddedNul { field: &'static str },

    #[error("field `{field}` is not valid UTF-8")]
    Encoding { field: &'static str },

    #[error("invalid decimal amount in `{field}`: {value:?}")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("metadata has {keys} keys but {values} values")]
    MetadataCountMismatch { keys: usize, values: usize },
}
