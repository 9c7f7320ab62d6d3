// Path: crates/types/src/app/mod.rs
//! Core application-level data structures: identifiers, identities, data contracts,
//! documents and the state transitions that create or mutate them.

/// Declares a fieldless enum that travels on the wire as a `u8`.
///
/// Generates `TryFrom<u8>`, `From<Enum> for u8` and serde support through those
/// conversions, so JSON carries the bare number.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Encode,
            Decode,
            Serialize,
            Deserialize,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Debug,
            Hash,
        )]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(Self::$variant), )+
                    other => Err(format!("unknown {} value {}", stringify!($name), other)),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value as u8
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $( Self::$variant => f.write_str(stringify!($variant)), )+
                }
            }
        }
    };
}

/// Data contracts, document types and index definitions.
pub mod data_contract;
/// Documents as committed to state.
pub mod document;
/// The 256-bit content-derived identifier and its derivation functions.
pub mod identifier;
/// Identities, their public keys and asset lock proofs.
pub mod identity;
/// The six state transition kinds and their shared envelope.
pub mod state_transition;

pub use data_contract::{DataContract, DocumentType, Index, IndexDirection, IndexProperty};
pub use document::Document;
pub use identifier::{data_contract_id, document_id, sha256, sha256d, Identifier};
pub use identity::{
    AssetLockOutput, AssetLockProof, Identity, IdentityPublicKey, KeyId, KeyType, PublicKeyHash,
    Purpose, SecurityLevel,
};
pub use state_transition::{
    DataContractCreateTransition, DataContractUpdateTransition, DocumentCreateTransition,
    DocumentDeleteTransition, DocumentReplaceTransition, DocumentTransition,
    DocumentsBatchTransition, IdentityCreateTransition, IdentityTopUpTransition,
    IdentityUpdateTransition, StateTransition, StateTransitionType,
};
