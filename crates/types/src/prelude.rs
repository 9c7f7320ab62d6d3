// Path: crates/types/src/prelude.rs

//! The names almost every validator needs.

pub use crate::app::{DataContract, Identifier, StateTransition, StateTransitionType};
pub use crate::error::{BasicError, ConsensusError, ErrorCode, ProtocolError, StateError};
pub use crate::validation::{ValidationResult, ValidationResultBuilder};

/// Turns an absent lookup result into the consensus error it stands for.
pub trait OptionExt<T> {
    /// Returns the value, or `err` when the option is `None`.
    fn required<E>(self, err: E) -> Result<T, E>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required<E>(self, err: E) -> Result<T, E> {
        self.ok_or(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_maps_absence_to_the_given_error() {
        let missing: Option<DataContract> = None;
        let err = missing
            .required(BasicError::DataContractNotPresentError {
                data_contract_id: Identifier([1u8; 32]),
            })
            .unwrap_err();
        assert_eq!(err.code(), 1018);
        assert_eq!(Some(3).required(()), Ok(3));
    }
}
