//! GraphQL wire shapes for the candidate API.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::coordinator::FetchRequest;
use crate::error::FetchError;
use crate::model::{CandidateDetail, Page};

/// Operation name of the page query.
pub const LIST_CANDIDATES_OPERATION: &str = "ListCandidates";

/// Paged candidate list, optionally narrowed by name on the server.
pub const LIST_CANDIDATES_QUERY: &str = r#"query ListCandidates(
  $limit: Int
  $nextToken: String
  $firstName: String
  $lastName: String
) {
  listCandidates(
    limit: $limit
    nextToken: $nextToken
    firstName: $firstName
    lastName: $lastName
  ) {
    items {
      id
      firstName
      lastName
      email
      role
      appliedDate
      status
    }
    nextToken
  }
}"#;

/// Operation name of the detail query.
pub const GET_CANDIDATE_OPERATION: &str = "GetCandidate";

/// Full record for one candidate id.
pub const GET_CANDIDATE_QUERY: &str = r#"query GetCandidate($id: ID!) {
  getCandidate(id: $id) {
    id
    firstName
    lastName
    email
    role
    appliedDate
    experience
    status
    phone
    address
    city
    state
    zipCode
    country
  }
}"#;

/// Request body posted to the GraphQL endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<V> {
    /// Query document.
    pub query: String,
    /// Which operation in `query` to run.
    pub operation_name: String,
    /// Operation variables.
    pub variables: V,
}

impl<V> GraphQlRequest<V> {
    /// Request for `operation_name` in `query`.
    pub fn new(operation_name: &str, query: &str, variables: V) -> Self {
        Self {
            query: query.to_string(),
            operation_name: operation_name.to_string(),
            variables,
        }
    }
}

/// Variables of `ListCandidates`. Absent values are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCandidatesVariables {
    /// Page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Continuation token from the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    /// Server-side first name filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Server-side last name filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl From<&FetchRequest> for ListCandidatesVariables {
    fn from(request: &FetchRequest) -> Self {
        Self {
            limit: Some(request.limit),
            next_token: request.cursor.token().map(str::to_string),
            first_name: request.names.first_name.clone(),
            last_name: request.names.last_name.clone(),
        }
    }
}

/// Variables of `GetCandidate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCandidateVariables {
    /// Candidate id.
    pub id: String,
}

/// `data` of a `ListCandidates` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCandidatesData {
    /// The requested page.
    pub list_candidates: Page,
}

/// `data` of a `GetCandidate` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCandidateData {
    /// `None` when no candidate has the id.
    #[serde(default)]
    pub get_candidate: Option<CandidateDetail>,
}

/// One entry of the GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// Human-readable message.
    pub message: String,
    /// Response path of the failing field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<serde_json::Value>>,
    /// Source locations in the query document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<serde_json::Value>>,
    /// Server-specific details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// Response envelope. `data` may be partial or null when `errors` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "D: DeserializeOwned"))]
pub struct GraphQlResponse<D> {
    /// Operation result.
    #[serde(default)]
    pub data: Option<D>,
    /// Errors reported alongside or instead of `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQlError>>,
}

impl<D> GraphQlResponse<D> {
    /// Reported errors; empty when there are none.
    pub fn errors(&self) -> &[GraphQlError] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Any error entry fails the whole call, even when data came back too.
    pub fn into_result(self) -> Result<D, FetchError> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            return Err(FetchError::Remote(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        self.data
            .ok_or_else(|| FetchError::Network("response contained no data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{NameFilter, RequestId};
    use crate::cursor::PageCursor;

    #[test]
    fn test_absent_variables_are_omitted() {
        let request = FetchRequest {
            id: RequestId::new(1),
            page: 0,
            limit: 10,
            cursor: PageCursor::Start,
            names: NameFilter::default(),
        };
        let json = serde_json::to_value(ListCandidatesVariables::from(&request)).unwrap();
        assert_eq!(json, serde_json::json!({ "limit": 10 }));
    }

    #[test]
    fn test_cursor_and_names_are_sent() {
        let request = FetchRequest {
            id: RequestId::new(2),
            page: 1,
            limit: 25,
            cursor: PageCursor::After("tok1".into()),
            names: NameFilter::new("Jo", ""),
        };
        let json = serde_json::to_value(ListCandidatesVariables::from(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "limit": 25, "nextToken": "tok1", "firstName": "Jo" })
        );
    }

    #[test]
    fn test_errors_win_over_partial_data() {
        let body = r#"{
            "data": { "listCandidates": { "items": [{ "id": "1" }], "nextToken": null } },
            "errors": [{ "message": "Not Authorized" }, { "message": "quota" }]
        }"#;
        let response: GraphQlResponse<ListCandidatesData> = serde_json::from_str(body).unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err, FetchError::Remote(vec!["Not Authorized".into(), "quota".into()]));
        assert_eq!(err.to_string(), "Not Authorized; quota");
    }

    #[test]
    fn test_null_data_without_errors_is_a_network_error() {
        let response: GraphQlResponse<ListCandidatesData> =
            serde_json::from_str(r#"{ "data": null }"#).unwrap();
        assert!(matches!(response.into_result(), Err(FetchError::Network(_))));
    }

    #[test]
    fn test_page_decodes_null_token() {
        let body = r#"{ "data": { "listCandidates": {
            "items": [{ "id": "1", "firstName": "John", "status": "active" }],
            "nextToken": null
        } } }"#;
        let response: GraphQlResponse<ListCandidatesData> = serde_json::from_str(body).unwrap();
        let page = response.into_result().unwrap().list_candidates;
        assert_eq!(page.items[0].first_name.as_deref(), Some("John"));
        assert_eq!(page.next_token, None);
    }
}
