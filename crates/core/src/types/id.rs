//! Integer ids for catalog products and accounts.
//!
//! Each id is its own type so a `UserId` can never be passed where a
//! `ProductId` is expected. Ids serialize as plain JSON numbers, which is
//! how saved carts and catalog records carry them.

/// Declare an `i64` id newtype.
///
/// The generated type is `Copy`, ordered, hashable, and transparent to serde,
/// with `new`, `as_i64`, `Display`, and conversions to and from `i64`.
///
/// ```rust
/// # use pocketshop_core::define_id;
/// define_id!(CategoryId);
///
/// let id = CategoryId::new(12);
/// assert_eq!(id.to_string(), "12");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(UserId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_transparently() {
        let id = ProductId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let parsed: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_display_and_conversions() {
        let id = UserId::from(1_700_000_000_000);
        assert_eq!(id.to_string(), "1700000000000");
        assert_eq!(i64::from(id), 1_700_000_000_000);
        assert_eq!(id.as_i64(), 1_700_000_000_000);
    }
}
