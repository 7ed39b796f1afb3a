use alloy::primitives::TxHash;
use thiserror::Error;

/// Per-unit execution errors. On-chain failure and timeout are not errors,
/// they are `TransferStatus` values.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid address {0}")]
    InvalidAddress(String),
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("private key does not belong to {0}")]
    KeyMismatch(String),
    #[error("could not fetch nonce: {0}")]
    Nonce(eyre::Report),
    #[error("could not sign transaction: {0}")]
    Signing(String),
    #[error("submission of {hash} rejected: {reason}")]
    Submission { hash: TxHash, reason: eyre::Report },
    #[error("cancelled before submission")]
    Aborted,
    #[error("cancelled while waiting for {0}")]
    Cancelled(TxHash),
}
