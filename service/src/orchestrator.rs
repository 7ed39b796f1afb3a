use std::fmt;
use std::sync::Arc;

use crate::chain::ChainClient;
use crate::error::TransferError;
use crate::executor::{TransferExecutor, TransferOutcome, TransferStatus};
use crate::model::{SecretStore, TransferBatch};
use crate::ownership::OwnershipOracle;
use crate::report::Reporter;
use crate::unit::TransferUnit;

pub type UnitResult = Result<TransferOutcome, TransferError>;

pub struct TransferOrchestrator<O, C> {
    oracle: O,
    executor: TransferExecutor<C>,
    reporter: Arc<dyn Reporter>,
    secure: bool,
}

impl<O, C> TransferOrchestrator<O, C>
where
    O: OwnershipOracle,
    C: ChainClient,
{
    pub fn new(oracle: O, executor: TransferExecutor<C>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            oracle,
            executor,
            reporter,
            secure: false,
        }
    }

    /// Only send to receivers whose key is in the secret store.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn executor(&self) -> &TransferExecutor<C> {
        &self.executor
    }

    pub async fn run(&self, batch: &TransferBatch, secrets: &SecretStore) -> Vec<UnitResult> {
        let units = self.prepare(batch, secrets).await;
        self.execute_all(units).await
    }

    /// Expands the batch into units in batch order, dropping directives for
    /// Axies the account does not hold and, in secure mode, directives to
    /// receivers we hold no key for.
    pub async fn prepare(&self, batch: &TransferBatch, secrets: &SecretStore) -> Vec<TransferUnit> {
        self.reporter.routine("Preparing transfers");
        let mut units = Vec::new();

        for account in batch {
            let Some(key) = secrets.get(&account.account_address) else {
                self.reporter.important(&format!(
                    "No private key for account ({}), skipping its transfers.",
                    account.account_address
                ));
                continue;
            };

            let owned = match self.oracle.owned_assets(&account.account_address).await {
                Ok(owned) => owned,
                Err(e) => {
                    self.reporter.important(&format!(
                        "Could not fetch axies of account ({}), skipping its transfers: {e}",
                        account.account_address
                    ));
                    continue;
                }
            };

            for directive in &account.transfers {
                if self.secure && !secrets.contains_key(&directive.receiver_address) {
                    continue;
                }
                if !owned.contains(&directive.axie_id) {
                    self.reporter.routine(&format!(
                        "Axie ({}) not in account ({}), skipping.",
                        directive.axie_id, account.account_address
                    ));
                    continue;
                }
                units.push(TransferUnit::new(
                    &account.account_address,
                    key,
                    &directive.receiver_address,
                    directive.axie_id,
                ));
            }
        }

        units
    }

    /// One unit at a time. Units of the same source account run in batch
    /// order, which keeps their nonces in sequence. Cancellation stops the
    /// batch before the next unit is signed; every other per-unit error is
    /// recorded and skipped past.
    pub async fn execute_all(&self, units: Vec<TransferUnit>) -> Vec<UnitResult> {
        self.reporter.routine("Starting to transfer axies");
        let mut results = Vec::with_capacity(units.len());

        'groups: for group in group_by_account(units) {
            for unit in group {
                if self.executor.is_cancelled() {
                    self.reporter.important("Transfers cancelled, remaining units were not sent");
                    break 'groups;
                }
                let result = self.executor.execute(unit).await;
                let cancelled = matches!(
                    result,
                    Err(TransferError::Cancelled(_) | TransferError::Aborted)
                );
                results.push(result);
                if cancelled {
                    self.reporter.important("Transfers cancelled, remaining units were not sent");
                    break 'groups;
                }
            }
        }

        self.reporter.routine("Axie Transfers Finished");
        self.reporter.routine(&BatchSummary::from_results(&results).to_string());
        results
    }

    /// Looks once more at every timed out hash. Late results are logged and
    /// never change the recorded outcome.
    pub async fn reconcile(&self, results: &[UnitResult]) {
        let timed_out = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .filter(|o| o.status == TransferStatus::TimedOut);

        for outcome in timed_out {
            let hash = outcome.hash;
            match self.executor.recheck(hash).await {
                Ok(Some(true)) => self.reporter.important(&format!(
                    "Reconciled: {} completed after timing out! Hash: {hash} - Explorer: {}",
                    outcome.unit,
                    self.executor.settings().explorer_link(&hash)
                )),
                Ok(Some(false)) => self.reporter.important(&format!(
                    "Reconciled: {} failed after timing out. Hash: {hash}",
                    outcome.unit
                )),
                Ok(None) => self
                    .reporter
                    .routine(&format!("{} still pending. Hash: {hash}", outcome.unit)),
                Err(e) => self
                    .reporter
                    .routine(&format!("Could not reconcile {hash}: {e}")),
            }
        }
    }
}

/// Splits units by source account, keeping first-appearance order of the
/// accounts and batch order inside each group.
pub fn group_by_account(units: Vec<TransferUnit>) -> Vec<Vec<TransferUnit>> {
    let mut groups: Vec<Vec<TransferUnit>> = Vec::new();
    for unit in units {
        match groups.iter_mut().find(|g| g[0].source == unit.source) {
            Some(group) => group.push(unit),
            None => groups.push(vec![unit]),
        }
    }
    groups
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub errored: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[UnitResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result {
                Ok(o) if o.status == TransferStatus::Succeeded => summary.succeeded += 1,
                Ok(o) if o.status == TransferStatus::Failed => summary.failed += 1,
                Ok(_) => summary.timed_out += 1,
                Err(_) => summary.errored += 1,
            }
        }
        summary
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfers: {} succeeded, {} failed, {} timed out, {} errored",
            self.succeeded, self.failed, self.timed_out, self.errored
        )
    }
}
