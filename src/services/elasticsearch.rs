use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::traits::{CandidateIndex, StoreError};
use crate::models::{CandidateQuery, User};

/// Elasticsearch client for the discoverable-users index
///
/// Talks to the REST `_search` endpoint directly; documents in the index have
/// the same JSON shape as [`User`].
pub struct ElasticsearchClient {
    base_url: String,
    index: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: User,
}

impl ElasticsearchClient {
    pub fn new(base_url: String, index: String, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            index,
            client,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/{}/_search", self.base_url.trim_end_matches('/'), self.index)
    }
}

/// Build the bool query for a candidate lookup
///
/// Exclusions become a single `terms` clause under `must_not`; age bounds and
/// gender are non-scoring filters.
pub fn build_search_body(query: &CandidateQuery) -> Value {
    let excluded: Vec<i64> = query.exclude.iter().collect();

    let mut filter = Vec::new();

    if query.min_age.is_some() || query.max_age.is_some() {
        let mut range = serde_json::Map::new();
        if let Some(min) = query.min_age {
            range.insert("gte".to_string(), json!(min));
        }
        if let Some(max) = query.max_age {
            range.insert("lte".to_string(), json!(max));
        }
        filter.push(json!({ "range": { "age": range } }));
    }

    if let Some(gender) = query.gender {
        filter.push(json!({ "term": { "gender": gender.as_str() } }));
    }

    json!({
        "size": query.limit,
        "query": {
            "bool": {
                "must_not": [ { "terms": { "id": excluded } } ],
                "filter": filter,
            }
        }
    })
}

#[async_trait]
impl CandidateIndex for ElasticsearchClient {
    async fn query(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError> {
        let body = build_search_body(query);

        tracing::debug!("Searching index {} excluding {} users", self.index, query.exclude.len());

        let response = self.client.post(self.search_url()).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Candidate search failed: {} - {}", status, text);
            return Err(StoreError::BackendError(format!(
                "search query failed: {}",
                status
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to decode hits: {}", e)))?;

        let users: Vec<User> = parsed.hits.hits.into_iter().map(|hit| hit.source).collect();

        tracing::debug!("Index returned {} candidates", users.len());

        Ok(users)
    }
}
