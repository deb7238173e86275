//! Signed request integration tests.

#[cfg(test)]
mod tests {
    use reqwest::Method;

    use crate::{client, signed, signer, test_page, url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_update_and_read_seo_page_with_signature() {
        let client = client();
        let page = test_page("seo");
        let path = format!("/api/seo/{page}");

        let resp = signed(&client, Method::PUT, &path)
            .json(&serde_json::json!({ "title": "Bridal Makeup", "description": "Glow" }))
            .send()
            .await
            .expect("put seo");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.expect("put json");
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["title"], "Bridal Makeup");
        assert!(json["data"]["updatedAt"].is_string());
        assert!(json["data"].get("lastUpdatedBy").is_none());

        let resp = signed(&client, Method::GET, &path)
            .send()
            .await
            .expect("get seo");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.expect("get json");
        assert_eq!(json["data"]["page"], page.as_str());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_signature_over_differently_cased_path() {
        let client = client();
        let page = test_page("case");
        let signature = signer().signature_headers("POST", &format!("/api/seo/{page}"));

        let mut request = client
            .post(url(&format!("/API/Seo/{}/", page.to_uppercase())))
            .json(&serde_json::json!({ "title": "Case" }));
        for (name, value) in signature.pairs() {
            request = request.header(name, value);
        }
        let resp = request.send().await.expect("post seo");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_signature_for_another_path() {
        let client = client();
        let signature = signer().signature_headers("PUT", "/api/settings/email");

        let mut request = client
            .put(url("/api/settings/general"))
            .json(&serde_json::json!({ "siteName": "Tampered" }));
        for (name, value) in signature.pairs() {
            request = request.header(name, value);
        }
        let resp = request.send().await.expect("put general");
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = resp.json().await.expect("error json");
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Unauthorized: Invalid API signature");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unsigned_mutation() {
        let resp = client()
            .put(url("/api/settings/general"))
            .json(&serde_json::json!({ "siteName": "Nope" }))
            .send()
            .await
            .expect("put general");
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = resp.json().await.expect("error json");
        assert_eq!(json["message"], "Unauthorized: Protected API");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_non_object_update() {
        let client = client();
        let resp = signed(&client, Method::PUT, "/api/settings/email")
            .json(&serde_json::json!(["not", "an", "object"]))
            .send()
            .await
            .expect("put email");
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    }
}
