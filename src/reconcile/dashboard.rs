use crate::api::WafApi;
use crate::error::Result;
use crate::normalize::{normalize_stats, StatsSnapshot};

/// Fetch and normalize the dashboard statistics.
pub async fn load_stats<A: WafApi + ?Sized>(api: &A) -> Result<Option<StatsSnapshot>> {
    Ok(api.stats().await?.map(|raw| normalize_stats(&raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::testing::FakeApi;
    use serde_json::json;

    #[tokio::test]
    async fn test_stats_payload_to_block_rate() {
        let api = FakeApi::new();
        api.state.lock().unwrap().stats = json!({"total_requests": 200, "blocked_requests": 50});

        let snapshot = load_stats(&api).await.unwrap().unwrap();
        assert_eq!(snapshot.block_rate(), "25.00%");
    }

    #[tokio::test]
    async fn test_malformed_stats_degrade_to_defaults() {
        let api = FakeApi::new();
        api.state.lock().unwrap().stats = json!([1, 2, 3]);

        let snapshot = load_stats(&api).await.unwrap().unwrap();
        assert_eq!(snapshot, StatsSnapshot::default());
    }
}
