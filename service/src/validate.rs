//! Checks run before anything is signed. Every problem is collected so one
//! run reports them all.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::address::NATIVE_PREFIX;
use crate::model::{SecretStore, TransferBatch};
use crate::report::Reporter;

pub const PRIVATE_KEY_LEN: usize = 66;

pub const DOCS_HINT: &str = "Please make sure your transfers.json file looks like the one in the README.md\n\
     Find it here: https://ferranmarin.github.io/axie-scholar-utilities/";
pub const SECRETS_HINT: &str = "If your problem is with secrets.json, \
     delete it and re-generate the file starting with an empty secrets file.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Problem {
    #[error("Transfers file failed validation. Please review it. Error given: {message}. For attribute in: {path}")]
    Schema { path: String, message: String },
    #[error("Account '{0}' is not present in secret file, please add it.")]
    MissingSecret(String),
    #[error("Private key for account {0} is not valid, please review it!")]
    InvalidKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub problems: Vec<Problem>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} problem(s) found in the input files", self.problems.len())
    }
}

impl std::error::Error for ValidationReport {}

pub struct BatchValidator {
    reporter: Arc<dyn Reporter>,
}

impl BatchValidator {
    pub fn new(reporter: Arc<dyn Reporter>) -> Self {
        Self { reporter }
    }

    /// Returns the typed batch when both files are sound. On failure every
    /// problem has already been reported as critical, followed by the
    /// documentation pointers.
    pub fn validate(
        &self,
        batch: &Value,
        secrets: &SecretStore,
    ) -> Result<TransferBatch, ValidationReport> {
        self.reporter.routine("Validating file inputs...");

        let mut problems = Vec::new();
        check_schema(batch, &mut problems);
        check_accounts(batch, secrets, &mut problems);
        check_keys(secrets, &mut problems);

        if problems.is_empty() {
            match serde_json::from_value::<TransferBatch>(batch.clone()) {
                Ok(batch) => {
                    self.reporter.routine("Files correctly validated!");
                    return Ok(batch);
                }
                Err(e) => problems.push(Problem::Schema {
                    path: "$".to_string(),
                    message: e.to_string(),
                }),
            }
        }

        for problem in &problems {
            self.reporter.critical(&problem.to_string());
        }
        self.reporter.critical(DOCS_HINT);
        self.reporter.critical(SECRETS_HINT);
        Err(ValidationReport { problems })
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn schema(problems: &mut Vec<Problem>, path: String, message: String) {
    problems.push(Problem::Schema { path, message });
}

fn check_schema(batch: &Value, problems: &mut Vec<Problem>) {
    let Some(entries) = batch.as_array() else {
        schema(problems, "$".into(), format!("{batch} is not of type 'array'"));
        return;
    };

    for (i, entry) in entries.iter().enumerate() {
        let path = format!("$[{i}]");
        let Some(entry) = entry.as_object() else {
            schema(problems, path, format!("{entry} is not of type 'object'"));
            continue;
        };

        match entry.get("AccountAddress") {
            None => schema(problems, path.clone(), "'AccountAddress' is a required property".into()),
            Some(Value::String(_)) => {}
            Some(other) => schema(
                problems,
                format!("{path}.AccountAddress"),
                format!("{other} is not of type 'string'"),
            ),
        }

        let transfers = match entry.get("Transfers") {
            None => {
                schema(problems, path, "'Transfers' is a required property".into());
                continue;
            }
            Some(Value::Array(transfers)) => transfers,
            Some(other) => {
                schema(
                    problems,
                    format!("{path}.Transfers"),
                    format!("{other} is not of type 'array'"),
                );
                continue;
            }
        };

        for (j, transfer) in transfers.iter().enumerate() {
            check_directive(transfer, format!("{path}.Transfers[{j}]"), problems);
        }
    }
}

fn check_directive(transfer: &Value, path: String, problems: &mut Vec<Problem>) {
    let Some(transfer) = transfer.as_object() else {
        schema(problems, path, format!("{transfer} is not of type 'object'"));
        return;
    };

    match transfer.get("ReceiverAddress") {
        None => schema(problems, path.clone(), "'ReceiverAddress' is a required property".into()),
        Some(Value::String(_)) => {}
        Some(other) => schema(
            problems,
            format!("{path}.ReceiverAddress"),
            format!("{other} is not of type 'string'"),
        ),
    }

    match transfer.get("AxieId") {
        None => schema(problems, path, "'AxieId' is a required property".into()),
        Some(id) if id.is_u64() => {}
        Some(other) => schema(
            problems,
            format!("{path}.AxieId"),
            format!("{other} is not a non-negative integer ({})", type_name(other)),
        ),
    }
}

/// Runs on the raw value so accounts are checked even when the schema
/// check failed elsewhere.
fn check_accounts(batch: &Value, secrets: &SecretStore, problems: &mut Vec<Problem>) {
    let accounts = batch
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("AccountAddress")?.as_str());

    for account in accounts {
        if !secrets.contains_key(account) {
            problems.push(Problem::MissingSecret(account.to_string()));
        }
    }
}

fn check_keys(secrets: &SecretStore, problems: &mut Vec<Problem>) {
    for (account, key) in secrets {
        if key.len() != PRIVATE_KEY_LEN || !key.starts_with(NATIVE_PREFIX) {
            problems.push(Problem::InvalidKey(account.clone()));
        }
    }
}
