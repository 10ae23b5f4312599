mod common;

use anyhow::Result;
use axum::http::StatusCode;

use common::{listing_form, test_app};

#[tokio::test]
async fn search_is_public_and_filters() -> Result<()> {
    let app = test_app();
    let a = app.signup("a@example.com", "pw", "owner").await?;
    let b = app.signup("b@example.com", "pw", "owner").await?;

    app.create_listing(&a, &listing_form("Cheap room")).await?;
    let flat = listing_form("Koramangala flat")
        .without("locationString")
        .text("locationString", "Koramangala, Bangalore")
        .without("rent")
        .text("rent", "12000")
        .without("type")
        .text("type", "Flat")
        .without("facilities")
        .text("facilities", r#"["ac"]"#);
    app.create_listing(&b, &flat).await?;

    let all = app.get("/api/search/listings", None).await?;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body.as_array().map(Vec::len), Some(2));

    let titles = |body: &serde_json::Value| -> Vec<String> {
        body.as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .map(|l| l["title"].as_str().unwrap_or_default().to_string())
            .collect()
    };

    let res = app.get("/api/search/listings?location=koramangala", None).await?;
    assert_eq!(titles(&res.body), vec!["Koramangala flat"]);

    let res = app.get("/api/search/listings?rent=5000", None).await?;
    assert_eq!(titles(&res.body), vec!["Cheap room"]);

    let res = app.get("/api/search/listings?facility=ac", None).await?;
    assert_eq!(titles(&res.body), vec!["Koramangala flat"]);

    let res = app.get("/api/search/listings?type=room", None).await?;
    assert_eq!(titles(&res.body), vec!["Cheap room"]);

    let res = app.get("/api/search/listings?type=Flat&rent=5000", None).await?;
    assert!(titles(&res.body).is_empty());
    Ok(())
}

#[tokio::test]
async fn undecodable_query_is_a_json_error() -> Result<()> {
    let app = test_app();
    let res = app.get("/api/search/listings?location=a&location=b", None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], true);
    assert_eq!(res.body["code"], "BAD_REQUEST");
    assert!(res.body["message"].as_str().is_some_and(|m| m.starts_with("Invalid search query")));
    Ok(())
}
