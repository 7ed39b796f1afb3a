//! Single transfer lifecycle:
//! `Building -> Signed -> Submitted -> {Polling <-> Waiting} -> {Succeeded | Failed | TimedOut}`.

use std::sync::Arc;
use std::time::Duration;

use alloy::{
    consensus::{SignableTransaction, TxEnvelope, TxLegacy},
    eips::eip2718::Encodable2718,
    network::TxSignerSync,
    primitives::{keccak256, Address, TxHash, TxKind, U256},
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
};
use tokio::{
    sync::watch,
    time::{sleep, Instant},
};

use crate::bindings::AxieContract;
use crate::chain::ChainClient;
use crate::configure::AppConfig;
use crate::error::TransferError;
use crate::report::Reporter;
use crate::unit::TransferUnit;

#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub contract: Address,
    pub chain_id: u64,
    pub gas_limit: u64,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub explorer_url: String,
}

impl ExecutorSettings {
    pub fn from_config(config: &AppConfig) -> eyre::Result<Self> {
        Ok(Self {
            contract: config.axie_contract.parse()?,
            chain_id: config.chain_id,
            gas_limit: config.gas_limit,
            poll_interval: config.poll_interval(),
            timeout: config.timeout(),
            explorer_url: config.explorer_url.clone(),
        })
    }

    pub fn explorer_link(&self, hash: &TxHash) -> String {
        format!("{}/{hash}", self.explorer_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Succeeded,
    Failed,
    /// We stopped waiting. The transaction may still be mined later.
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub unit: TransferUnit,
    pub hash: TxHash,
    pub status: TransferStatus,
}

/// Stops a transfer before it is submitted, or while it waits between
/// receipt polls. Without a sender it never fires.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Option<watch::Receiver<bool>>);

impl CancelSignal {
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self(Some(rx)))
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.as_ref().is_some_and(|rx| *rx.borrow())
    }

    async fn cancelled(&self) {
        if let Some(rx) = &self.0 {
            let mut rx = rx.clone();
            if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
                return;
            }
        }
        // sender gone or never attached
        std::future::pending::<()>().await
    }
}

pub struct TransferExecutor<C> {
    chain: C,
    settings: ExecutorSettings,
    reporter: Arc<dyn Reporter>,
    cancel: CancelSignal,
}

impl<C> TransferExecutor<C>
where
    C: ChainClient,
{
    pub fn new(chain: C, settings: ExecutorSettings, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            chain,
            settings,
            reporter,
            cancel: CancelSignal::default(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs one transfer to a terminal state and logs exactly one important
    /// record for it. On-chain failure and timeout come back as `Ok`.
    pub async fn execute(&self, unit: TransferUnit) -> Result<TransferOutcome, TransferError> {
        match self.run(&unit).await {
            Ok((hash, status)) => {
                self.report_outcome(&unit, &hash, status);
                Ok(TransferOutcome { unit, hash, status })
            }
            Err(e) => {
                self.reporter.important(&format!("{unit} failed: {e}"));
                Err(e)
            }
        }
    }

    /// Single receipt lookup for a hash we stopped waiting on.
    pub async fn recheck(&self, hash: TxHash) -> eyre::Result<Option<bool>> {
        self.chain.receipt_status(hash).await
    }

    async fn run(&self, unit: &TransferUnit) -> Result<(TxHash, TransferStatus), TransferError> {
        if self.is_cancelled() {
            return Err(TransferError::Aborted);
        }
        let signer = unit.signer()?;
        let nonce = self
            .chain
            .pending_nonce(unit.source_address()?)
            .await
            .map_err(TransferError::Nonce)?;

        let raw = self.sign(unit, &signer, nonce)?;
        // Known before submission, so a lost response still leaves us a handle.
        let hash = keccak256(&raw);

        // last point where nothing has left the process
        if self.is_cancelled() {
            return Err(TransferError::Aborted);
        }
        self.chain
            .send_raw(&raw)
            .await
            .map_err(|reason| TransferError::Submission { hash, reason })?;

        let status = self.confirm(unit, hash, nonce).await?;
        Ok((hash, status))
    }

    /// Builds and signs the legacy `safeTransferFrom` transaction, returning
    /// its network encoding.
    pub fn sign(
        &self,
        unit: &TransferUnit,
        signer: &PrivateKeySigner,
        nonce: u64,
    ) -> Result<Vec<u8>, TransferError> {
        let call: AxieContract::safeTransferFromCall = unit.try_into()?;
        let mut tx = TxLegacy {
            chain_id: Some(self.settings.chain_id),
            nonce,
            gas_price: 0,
            gas_limit: self.settings.gas_limit,
            to: TxKind::Call(self.settings.contract),
            value: U256::ZERO,
            input: call.abi_encode().into(),
        };
        let signature = signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| TransferError::Signing(e.to_string()))?;
        let envelope = TxEnvelope::from(tx.into_signed(signature));

        Ok(envelope.encoded_2718())
    }

    async fn confirm(
        &self,
        unit: &TransferUnit,
        hash: TxHash,
        nonce: u64,
    ) -> Result<TransferStatus, TransferError> {
        let started = Instant::now();
        loop {
            if started.elapsed() > self.settings.timeout {
                return Ok(TransferStatus::TimedOut);
            }

            match self.chain.receipt_status(hash).await {
                Ok(Some(true)) => return Ok(TransferStatus::Succeeded),
                Ok(Some(false)) => return Ok(TransferStatus::Failed),
                Ok(None) => self.reporter.routine(&format!(
                    "Waiting for transfer '{unit}' to finish (Nonce:{nonce})..."
                )),
                // the transaction is already out, keep polling until the budget runs out
                Err(e) => self.reporter.routine(&format!(
                    "Receipt lookup for '{unit}' failed, retrying: {e}"
                )),
            }

            tokio::select! {
                _ = sleep(self.settings.poll_interval) => {}
                _ = self.cancel.cancelled() => return Err(TransferError::Cancelled(hash)),
            }
        }
    }

    fn report_outcome(&self, unit: &TransferUnit, hash: &TxHash, status: TransferStatus) {
        let message = match status {
            TransferStatus::Succeeded => format!(
                "{unit} completed! Hash: {hash} - Explorer: {}",
                self.settings.explorer_link(hash)
            ),
            TransferStatus::Failed => format!("{unit} failed"),
            TransferStatus::TimedOut => format!("Transfer {unit}, timed out! Hash: {hash}"),
        };
        self.reporter.important(&message);
    }
}
