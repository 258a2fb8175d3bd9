use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use candidates_core::api::{
    GetCandidateData, GetCandidateVariables, GraphQlRequest, GraphQlResponse, ListCandidatesData,
    ListCandidatesVariables, GET_CANDIDATE_OPERATION, GET_CANDIDATE_QUERY,
    LIST_CANDIDATES_OPERATION, LIST_CANDIDATES_QUERY,
};
use candidates_core::{CandidateDetail, FetchError, FetchRequest, Page};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::GraphQlConfig;

/// Remote source of candidate pages.
pub trait CandidateGateway: Send + Sync + 'static {
    fn list_candidates(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<Page, FetchError>> + Send;

    /// `Ok(None)` when the id does not exist.
    fn get_candidate(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<CandidateDetail>, FetchError>> + Send;
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid GraphQL endpoint {endpoint:?}: {message}")]
    Endpoint { endpoint: String, message: String },
    #[error("build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// GraphQL-over-HTTP gateway.
#[derive(Debug, Clone)]
pub struct GraphQlGateway {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GraphQlGateway {
    pub fn new(config: &GraphQlConfig) -> Result<Self, GatewayError> {
        let endpoint = Url::parse(config.endpoint.trim()).map_err(|e| GatewayError::Endpoint {
            endpoint: config.endpoint.clone(),
            message: e.to_string(),
        })?;
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn execute<V, D>(&self, operation: &str, query: &str, variables: V) -> Result<D, FetchError>
    where
        V: Serialize + Send,
        D: DeserializeOwned + Send,
    {
        let request_id = Uuid::new_v4();
        let body = GraphQlRequest::new(operation, query, variables);
        debug!(operation, %request_id, "graphql request");

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", self.api_key.as_str())
            .header("x-request-id", request_id.to_string())
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(operation, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(network_error(
                operation,
                format!("Response not successful: Received status code {}", status.as_u16()),
            ));
        }

        let envelope: GraphQlResponse<D> = resp
            .json()
            .await
            .map_err(|e| network_error(operation, format!("invalid response body: {e}")))?;
        for error in envelope.errors() {
            warn!(operation, message = %error.message, path = ?error.path, "graphql error");
        }
        envelope.into_result()
    }
}

fn network_error(operation: &str, message: String) -> FetchError {
    warn!(operation, error = %message, "network error");
    FetchError::Network(message)
}

impl CandidateGateway for GraphQlGateway {
    async fn list_candidates(&self, request: &FetchRequest) -> Result<Page, FetchError> {
        let data: ListCandidatesData = self
            .execute(
                LIST_CANDIDATES_OPERATION,
                LIST_CANDIDATES_QUERY,
                ListCandidatesVariables::from(request),
            )
            .await?;
        Ok(data.list_candidates)
    }

    async fn get_candidate(&self, id: &str) -> Result<Option<CandidateDetail>, FetchError> {
        let data: GetCandidateData = self
            .execute(
                GET_CANDIDATE_OPERATION,
                GET_CANDIDATE_QUERY,
                GetCandidateVariables { id: id.to_string() },
            )
            .await?;
        Ok(data.get_candidate)
    }
}

/// In-process gateway serving a fixed candidate set.
///
/// Continuation tokens are decimal offsets. Name filters match
/// case-insensitively as substrings. Failures and latency can be scripted
/// per call, and every list request is recorded.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    candidates: Vec<CandidateDetail>,
    script: Mutex<Script>,
}

#[derive(Debug, Default)]
struct Script {
    failures: VecDeque<Option<FetchError>>,
    delays: VecDeque<Duration>,
    requests: Vec<FetchRequest>,
}

impl InMemoryGateway {
    pub fn new(candidates: Vec<CandidateDetail>) -> Self {
        Self {
            candidates,
            script: Mutex::default(),
        }
    }

    /// The next list call fails with `error`.
    pub fn fail_next(&self, error: FetchError) {
        self.script().failures.push_back(Some(error));
    }

    /// The next list call succeeds (used to interleave scripted failures).
    pub fn succeed_next(&self) {
        self.script().failures.push_back(None);
    }

    /// The next list call answers after `delay`.
    pub fn delay_next(&self, delay: Duration) {
        self.script().delays.push_back(delay);
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.script().requests.clone()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn page_for(&self, request: &FetchRequest) -> Result<Page, FetchError> {
        let offset = match request.cursor.token() {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| FetchError::remote(format!("invalid nextToken {token:?}")))?,
        };
        let matches = |value: &Option<String>, wanted: &Option<String>| match wanted {
            None => true,
            Some(wanted) => value
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&wanted.to_lowercase())),
        };
        let filtered: Vec<_> = self
            .candidates
            .iter()
            .filter(|c| matches(&c.first_name, &request.names.first_name))
            .filter(|c| matches(&c.last_name, &request.names.last_name))
            .collect();
        let end = offset.saturating_add(request.limit).min(filtered.len());
        let items = filtered
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|c| c.summary())
            .collect();
        let next_token = (end < filtered.len()).then(|| end.to_string());
        Ok(Page { items, next_token })
    }
}

impl CandidateGateway for InMemoryGateway {
    async fn list_candidates(&self, request: &FetchRequest) -> Result<Page, FetchError> {
        let (failure, delay) = {
            let mut script = self.script();
            script.requests.push(request.clone());
            (
                script.failures.pop_front().flatten(),
                script.delays.pop_front(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(error) => Err(error),
            None => self.page_for(request),
        }
    }

    async fn get_candidate(&self, id: &str) -> Result<Option<CandidateDetail>, FetchError> {
        Ok(self.candidates.iter().find(|c| c.id == id).cloned())
    }
}
