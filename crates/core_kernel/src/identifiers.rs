//! Strongly-typed identifiers for ledger entities
//!
//! Identifiers are opaque strings issued by the external data store. Newtype
//! wrappers keep customer, account and record ids from being mixed up.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from store-issued text
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into().trim().to_string())
            }

            /// Returns the identifier text
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true when the store supplied no identifier
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(RecordId, "Identifier of a single transaction record");
define_id!(CustomerId, "Identifier of a customer (party)");
define_id!(AccountId, "Identifier of a cash or bank account");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_trimmed() {
        assert_eq!(CustomerId::new("  c-1 ").as_str(), "c-1");
    }

    #[test]
    fn test_empty_id() {
        assert!(AccountId::new("").is_empty());
    }
}
