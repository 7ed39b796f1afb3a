use std::collections::BTreeSet;

use eyre::OptionExt;
use serde::Deserialize;
use serde_json::json;

use crate::address::to_native;

/// Asset IDs an account holds right now.
pub trait OwnershipOracle {
    async fn owned_assets(&self, account: &str) -> eyre::Result<BTreeSet<u64>>;
}

const PAGE_SIZE: u64 = 100;

const AXIE_LIST_QUERY: &str = "query GetAxieBriefList($owner: String, $from: Int, $size: Int) {\
    axies(owner: $owner, from: $from, size: $size) { total results { id } } }";

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<AxiesData>,
}

#[derive(Debug, Deserialize)]
struct AxiesData {
    axies: AxiePage,
}

#[derive(Debug, Deserialize)]
struct AxiePage {
    total: u64,
    results: Vec<AxieBrief>,
}

#[derive(Debug, Deserialize)]
struct AxieBrief {
    id: String,
}

/// Axie GraphQL gateway.
pub struct AxieGraphql {
    client: reqwest::Client,
    url: String,
}

impl AxieGraphql {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn page(&self, owner: &str, from: u64) -> eyre::Result<AxiePage> {
        let body = json!({
            "operationName": "GetAxieBriefList",
            "variables": { "owner": owner, "from": from, "size": PAGE_SIZE },
            "query": AXIE_LIST_QUERY,
        });

        let response: GraphqlResponse = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.data.ok_or_eyre("graphql response has no data")?.axies)
    }
}

impl OwnershipOracle for AxieGraphql {
    async fn owned_assets(&self, account: &str) -> eyre::Result<BTreeSet<u64>> {
        let owner = to_native(account);
        let mut owned = BTreeSet::new();
        let mut from = 0;

        loop {
            let page = self.page(&owner, from).await?;
            if page.results.is_empty() {
                break;
            }
            for axie in &page.results {
                owned.insert(axie.id.parse()?);
            }
            from += page.results.len() as u64;
            if from >= page.total {
                break;
            }
        }

        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gateway_page() {
        let raw = r#"{"data":{"axies":{"total":2,"results":[{"id":"11"},{"id":"12"}]}}}"#;
        let response: GraphqlResponse = serde_json::from_str(raw).unwrap();
        let page = response.data.unwrap().axies;

        assert_eq!(page.total, 2);
        let ids: Vec<u64> = page.results.iter().map(|a| a.id.parse().unwrap()).collect();
        assert_eq!(ids, vec![11, 12]);
    }
}
