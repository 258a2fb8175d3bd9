use candidates_core::DetailView;
use tracing::debug;

use crate::gateway::CandidateGateway;

/// Fetches one candidate for the detail view. A blank id skips the fetch.
pub async fn load_detail<G: CandidateGateway>(gateway: &G, id: &str) -> DetailView {
    let id = id.trim();
    if id.is_empty() {
        return DetailView::Idle;
    }
    debug!(id, "loading candidate detail");
    DetailView::from_result(gateway.get_candidate(id).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;
    use candidates_core::CandidateDetail;

    fn gateway() -> InMemoryGateway {
        InMemoryGateway::new(vec![CandidateDetail {
            id: "7".into(),
            first_name: Some("Ada".into()),
            phone: Some("555-0100".into()),
            ..CandidateDetail::default()
        }])
    }

    #[tokio::test]
    async fn test_blank_id_does_not_fetch() {
        assert_eq!(load_detail(&gateway(), "  ").await, DetailView::Idle);
    }

    #[tokio::test]
    async fn test_known_and_unknown_ids() {
        let gateway = gateway();
        match load_detail(&gateway, "7").await {
            DetailView::Loaded(detail) => assert_eq!(detail.phone.as_deref(), Some("555-0100")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(load_detail(&gateway, "8").await, DetailView::NotFound);
    }
}
