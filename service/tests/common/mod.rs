#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::{
    consensus::{TxEnvelope, TxLegacy},
    eips::eip2718::Decodable2718,
    primitives::{Address, TxHash},
    signers::local::PrivateKeySigner,
};
use axie_transfers::{
    address::to_display, ChainClient, ExecutorSettings, MemoryReporter, NonceProvider,
    OwnershipOracle, TransferExecutor,
};

pub const KEY_A: &str = "0x0101010101010101010101010101010101010101010101010101010101010101";
pub const KEY_B: &str = "0x0202020202020202020202020202020202020202020202020202020202020202";
pub const STRANGER: &str = "ronin:9999999999999999999999999999999999999999";
pub const AXIE_CONTRACT: &str = "0x32950db2a7164ae833121501c797d79e7b79d74c";

/// `ronin:` address owning the given key.
pub fn account(key: &str) -> String {
    let signer = PrivateKeySigner::from_str(key).unwrap();
    to_display(&signer.address().to_string())
}

pub fn settings() -> ExecutorSettings {
    ExecutorSettings {
        contract: AXIE_CONTRACT.parse().unwrap(),
        chain_id: 2020,
        gas_limit: 500_000,
        poll_interval: Duration::from_secs(10),
        timeout: Duration::from_secs(600),
        explorer_url: "https://explorer.roninchain.com/tx".into(),
    }
}

/// Chain whose receipts follow a script. Once the script runs out every
/// lookup answers `fallback`.
#[derive(Default)]
pub struct ScriptedChain {
    receipts: Mutex<VecDeque<eyre::Result<Option<bool>>>>,
    fallback: Option<bool>,
    reject_send: bool,
    pub sent: Mutex<Vec<Vec<u8>>>,
    pub receipt_queries: Mutex<Vec<TxHash>>,
}

impl ScriptedChain {
    pub fn scripted(receipts: Vec<Option<bool>>) -> Self {
        Self::flaky(receipts.into_iter().map(Ok).collect())
    }

    /// Like `scripted`, with lookups that can fail at the transport level.
    pub fn flaky(receipts: Vec<eyre::Result<Option<bool>>>) -> Self {
        Self {
            receipts: Mutex::new(receipts.into()),
            ..Self::default()
        }
    }

    pub fn always(status: Option<bool>) -> Self {
        Self {
            fallback: status,
            ..Self::default()
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject_send: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn receipt_queries(&self) -> usize {
        self.receipt_queries.lock().unwrap().len()
    }

    /// Decodes everything submitted so far.
    pub fn sent_transactions(&self) -> Vec<(Address, TxLegacy)> {
        self.sent()
            .iter()
            .map(|raw| match TxEnvelope::decode_2718(&mut raw.as_slice()).unwrap() {
                TxEnvelope::Legacy(signed) => {
                    (signed.recover_signer().unwrap(), signed.tx().clone())
                }
                other => panic!("expected a legacy transaction, got {other:?}"),
            })
            .collect()
    }
}

impl NonceProvider for ScriptedChain {
    async fn pending_nonce(&self, account: Address) -> eyre::Result<u64> {
        let sent = self.sent_transactions();
        Ok(sent.iter().filter(|(from, _)| *from == account).count() as u64)
    }
}

impl ChainClient for ScriptedChain {
    async fn send_raw(&self, raw: &[u8]) -> eyre::Result<()> {
        if self.reject_send {
            eyre::bail!("nonce too low");
        }
        self.sent.lock().unwrap().push(raw.to_vec());
        Ok(())
    }

    async fn receipt_status(&self, hash: TxHash) -> eyre::Result<Option<bool>> {
        self.receipt_queries.lock().unwrap().push(hash);
        let next = self.receipts.lock().unwrap().pop_front();
        next.unwrap_or(Ok(self.fallback))
    }
}

/// Ownership lookups answered from a fixed table.
#[derive(Default)]
pub struct FixedOracle {
    owned: BTreeMap<String, BTreeSet<u64>>,
    pub queries: Mutex<Vec<String>>,
}

impl FixedOracle {
    pub fn with(mut self, account: &str, ids: &[u64]) -> Self {
        self.owned.insert(account.to_string(), ids.iter().copied().collect());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl OwnershipOracle for &FixedOracle {
    async fn owned_assets(&self, account: &str) -> eyre::Result<BTreeSet<u64>> {
        self.queries.lock().unwrap().push(account.to_string());
        match self.owned.get(account) {
            Some(ids) => Ok(ids.clone()),
            None => eyre::bail!("unknown owner {account}"),
        }
    }
}

pub fn executor(chain: ScriptedChain) -> (Arc<MemoryReporter>, TransferExecutor<ScriptedChain>) {
    let reporter = Arc::new(MemoryReporter::new());
    let executor = TransferExecutor::new(chain, settings(), reporter.clone());
    (reporter, executor)
}
