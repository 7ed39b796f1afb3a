use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account address (`ronin:` form) to `0x`-prefixed private key.
pub type SecretStore = BTreeMap<String, String>;

pub type TransferBatch = Vec<AccountTransfers>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountTransfers {
    pub account_address: String,
    pub transfers: Vec<TransferDirective>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransferDirective {
    pub receiver_address: String,
    pub axie_id: u64,
}

pub fn load_json(path: impl AsRef<Path>) -> eyre::Result<Value> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("parsing {}", path.display()))
}

pub fn load_secrets(path: impl AsRef<Path>) -> eyre::Result<SecretStore> {
    let value = load_json(path.as_ref())?;
    serde_json::from_value(value).wrap_err("secrets file must map account addresses to keys")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn batch_uses_pascal_case_fields() {
        let batch: TransferBatch = serde_json::from_value(json!([
            {
                "AccountAddress": "ronin:abc",
                "Transfers": [{ "ReceiverAddress": "ronin:def", "AxieId": 42 }]
            }
        ]))
        .unwrap();

        assert_eq!(batch[0].account_address, "ronin:abc");
        assert_eq!(batch[0].transfers[0].receiver_address, "ronin:def");
        assert_eq!(batch[0].transfers[0].axie_id, 42);
    }
}
