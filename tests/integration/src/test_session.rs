//! Session path integration tests.
//!
//! Without a reachable session service, cookies alone never authorize a
//! request; the other two paths still apply.

#[cfg(test)]
mod tests {
    use reqwest::Method;

    use crate::{client, signed, url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unknown_session_cookie() {
        let resp = client()
            .put(url("/api/settings/email"))
            .header("cookie", "better-auth.session_token=not-a-session")
            .json(&serde_json::json!({ "host": "smtp.example" }))
            .send()
            .await
            .expect("put email");
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fall_back_to_signature_with_unknown_cookie() {
        let client = client();
        let resp = signed(&client, Method::PUT, "/api/settings/email")
            .header("cookie", "better-auth.session_token=not-a-session")
            .json(&serde_json::json!({ "host": "smtp.example" }))
            .send()
            .await
            .expect("put email");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
    }
}
