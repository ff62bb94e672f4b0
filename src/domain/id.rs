//! Strongly-typed identifiers for ledger entities.
//!
//! The vault and registries expose `uint256` identifiers, but every id in
//! practice fits in 64 bits. Newtypes keep deposit, position and agent ids
//! from being mixed up at call sites.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw numeric id.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Return the raw numeric value.
            #[must_use]
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a user deposit held by the vault.
    DepositId
);

numeric_id!(
    /// Identifier of a concentrated-liquidity position (the pool's position token id).
    PositionId
);

numeric_id!(
    /// Identifier of an agent in the identity registry.
    AgentId
);
