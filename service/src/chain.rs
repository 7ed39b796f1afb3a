use std::marker::PhantomData;

use alloy::{
    network::Ethereum,
    primitives::{Address, TxHash},
    providers::Provider,
    transports::Transport,
};

/// Next usable sequence number for an account, pending transactions included.
pub trait NonceProvider {
    async fn pending_nonce(&self, account: Address) -> eyre::Result<u64>;
}

/// The node calls a transfer needs beyond the nonce.
pub trait ChainClient: NonceProvider {
    async fn send_raw(&self, raw: &[u8]) -> eyre::Result<()>;

    /// `None` while the transaction is unknown to the node or not yet mined,
    /// otherwise the receipt status flag.
    async fn receipt_status(&self, hash: TxHash) -> eyre::Result<Option<bool>>;
}

/// JSON-RPC node behind an alloy provider.
pub struct RpcChain<P, T> {
    provider: P,
    _phantom: PhantomData<T>,
}

impl<P, T> RpcChain<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _phantom: PhantomData,
        }
    }
}

impl<P, T> NonceProvider for RpcChain<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    async fn pending_nonce(&self, account: Address) -> eyre::Result<u64> {
        Ok(self.provider.get_transaction_count(account).pending().await?)
    }
}

impl<P, T> ChainClient for RpcChain<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    async fn send_raw(&self, raw: &[u8]) -> eyre::Result<()> {
        let _pending = self.provider.send_raw_transaction(raw).await?;
        Ok(())
    }

    async fn receipt_status(&self, hash: TxHash) -> eyre::Result<Option<bool>> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|r| r.status()))
    }
}
