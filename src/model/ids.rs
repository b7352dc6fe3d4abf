// Strongly typed identifiers for the publishing workflow

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_u128(value: u128) -> Self {
                Self(Uuid::from_u128(value))
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Stable identity shared by every version of a logical entity
    UnificRootId
);

uuid_id!(
    /// Identity of a single version record
    VersionId
);

uuid_id!(
    /// Identity of an organization node in the hierarchy.
    ///
    /// Equal to the `UnificRootId` of the organization entity it names.
    OrganizationId
);

impl From<UnificRootId> for OrganizationId {
    fn from(value: UnificRootId) -> Self {
        Self(value.0)
    }
}

impl From<OrganizationId> for UnificRootId {
    fn from(value: OrganizationId) -> Self {
        Self(value.0)
    }
}
