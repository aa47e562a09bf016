//! Stable integer encoding for closed enumerations.
//!
//! Wire values are a versioned contract: existing tags are never renumbered
//! and new tags are only appended.

use crate::TypeError;

/// A closed enumeration with a stable small-integer wire value per tag.
pub trait WireEnum: Copy + Eq + Sized + 'static {
    /// Name used in error messages.
    const KIND: &'static str;

    /// Every tag, in wire order.
    const ALL: &'static [Self];

    /// Wire value of this tag.
    fn to_wire(self) -> u32;

    /// Look up the tag for a wire value.
    ///
    /// Fails with [`TypeError::UnrecognizedTag`] for any value outside the
    /// known set; there is no fallback tag.
    fn from_wire(value: u32) -> Result<Self, TypeError> {
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.to_wire() == value)
            .ok_or(TypeError::UnrecognizedTag {
                kind: Self::KIND,
                value,
            })
    }
}

/// Case-insensitive name lookup over a tag table.
pub(crate) fn parse_name<T: WireEnum>(
    name: &str,
    as_str: impl Fn(T) -> &'static str,
) -> Result<T, TypeError> {
    T::ALL
        .iter()
        .copied()
        .find(|tag| as_str(*tag).eq_ignore_ascii_case(name))
        .ok_or_else(|| TypeError::UnrecognizedName {
            kind: T::KIND,
            name: name.to_string(),
        })
}

/// Implements `TryFrom<u32>` and `From<T> for u32` in terms of [`WireEnum`].
macro_rules! impl_wire_conversions {
    ($ty:ty) => {
        impl TryFrom<u32> for $ty {
            type Error = $crate::TypeError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                <$ty as $crate::WireEnum>::from_wire(value)
            }
        }

        impl From<$ty> for u32 {
            fn from(tag: $ty) -> u32 {
                $crate::WireEnum::to_wire(tag)
            }
        }
    };
}

pub(crate) use impl_wire_conversions;
