//! Health endpoint integration tests.

#[cfg(test)]
mod tests {
    use crate::{client, url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_health_without_credentials() {
        let resp = client().get(url("/health")).send().await.expect("health");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.expect("health json");
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_health_under_api_prefix() {
        let resp = client().get(url("/api/health")).send().await.expect("health");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
    }
}
