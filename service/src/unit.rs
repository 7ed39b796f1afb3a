use std::fmt;
use std::str::FromStr;

use alloy::{
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
};

use crate::address::{parse_address, to_display, to_native};
use crate::bindings::AxieContract;
use crate::error::TransferError;

/// One Axie moving from one account to another. Addresses are kept in
/// native `0x` form.
#[derive(Clone, PartialEq, Eq)]
pub struct TransferUnit {
    pub source: String,
    pub source_key: String,
    pub destination: String,
    pub axie_id: u64,
}

impl TransferUnit {
    pub fn new(source: &str, source_key: &str, destination: &str, axie_id: u64) -> Self {
        Self {
            source: to_native(source),
            source_key: source_key.to_string(),
            destination: to_native(destination),
            axie_id,
        }
    }

    pub fn source_address(&self) -> Result<Address, TransferError> {
        parse_address(&self.source)
    }

    /// Signer for the source account. Fails if the key is malformed or
    /// belongs to another account.
    pub fn signer(&self) -> Result<PrivateKeySigner, TransferError> {
        let signer = PrivateKeySigner::from_str(&self.source_key)
            .map_err(|e| TransferError::InvalidKey(e.to_string()))?;
        if signer.address() != self.source_address()? {
            return Err(TransferError::KeyMismatch(to_display(&self.source)));
        }
        Ok(signer)
    }
}

impl TryInto<AxieContract::safeTransferFromCall> for &TransferUnit {
    type Error = TransferError;
    fn try_into(self) -> Result<AxieContract::safeTransferFromCall, Self::Error> {
        Ok(AxieContract::safeTransferFromCall {
            from: parse_address(&self.source)?,
            to: parse_address(&self.destination)?,
            tokenId: U256::from(self.axie_id),
        })
    }
}

impl fmt::Display for TransferUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Axie Transfer of axie ({}) from account ({}) to account ({})",
            self.axie_id,
            to_display(&self.source),
            to_display(&self.destination)
        )
    }
}

// Keeps the key out of debug output.
impl fmt::Debug for TransferUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferUnit")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("axie_id", &self.axie_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolCall;

    const KEY: &str = "0x0101010101010101010101010101010101010101010101010101010101010101";

    fn owner() -> String {
        let signer = PrivateKeySigner::from_str(KEY).unwrap();
        to_display(&signer.address().to_string())
    }

    #[test]
    fn display_uses_ronin_form() {
        let unit = TransferUnit::new(
            "ronin:1111111111111111111111111111111111111111",
            KEY,
            "ronin:2222222222222222222222222222222222222222",
            7,
        );
        assert_eq!(unit.source, "0x1111111111111111111111111111111111111111");
        assert_eq!(
            unit.to_string(),
            "Axie Transfer of axie (7) from account (ronin:1111111111111111111111111111111111111111) \
             to account (ronin:2222222222222222222222222222222222222222)"
        );
        assert!(!format!("{unit:?}").contains(KEY));
    }

    #[test]
    fn call_carries_addresses_and_id() {
        let unit = TransferUnit::new(&owner(), KEY, "ronin:2222222222222222222222222222222222222222", 9);
        let call: AxieContract::safeTransferFromCall = (&unit).try_into().unwrap();
        assert_eq!(call.from, unit.source_address().unwrap());
        assert_eq!(call.tokenId, U256::from(9));
        // selector + three words
        assert_eq!(call.abi_encode().len(), 4 + 3 * 32);
    }

    #[test]
    fn signer_must_own_source() {
        let good = TransferUnit::new(&owner(), KEY, "ronin:2222222222222222222222222222222222222222", 1);
        assert!(good.signer().is_ok());

        let wrong = TransferUnit::new(
            "ronin:1111111111111111111111111111111111111111",
            KEY,
            "ronin:2222222222222222222222222222222222222222",
            1,
        );
        assert!(matches!(wrong.signer(), Err(TransferError::KeyMismatch(_))));

        let bad_key = TransferUnit::new(&owner(), "0xzz", "ronin:2222222222222222222222222222222222222222", 1);
        assert!(matches!(bad_key.signer(), Err(TransferError::InvalidKey(_))));
    }
}
