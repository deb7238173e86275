//! Trusted frontend origin integration tests.

#[cfg(test)]
mod tests {
    use crate::{client, frontend_url, url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_allow_unsigned_get_from_frontend() {
        let origin = frontend_url();
        let resp = client()
            .get(url("/api/settings/general"))
            .header("origin", &origin)
            .send()
            .await
            .expect("get general");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some(origin.as_str()),
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_allow_unsigned_get_with_frontend_referer() {
        let resp = client()
            .get(url("/api/seo"))
            .header("referer", format!("{}/admin/seo", frontend_url()))
            .send()
            .await
            .expect("list seo");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.expect("list json");
        assert!(json["data"].is_array());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unsigned_put_from_frontend() {
        let resp = client()
            .put(url("/api/settings/general"))
            .header("origin", frontend_url())
            .json(&serde_json::json!({ "siteName": "Nope" }))
            .send()
            .await
            .expect("put general");
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_lookalike_origin() {
        let resp = client()
            .get(url("/api/settings/general"))
            .header("origin", format!("{}.evil.example", frontend_url()))
            .send()
            .await
            .expect("get general");
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    }
}
