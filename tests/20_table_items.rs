mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::spawn_app;

#[tokio::test]
async fn tables_listing_includes_counts() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;

    let res = app.get("/tables", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let tables = body["data"].as_array().cloned().unwrap_or_default();

    let branch = tables
        .iter()
        .find(|t| t["tableName"] == "branch")
        .expect("branch table listed");
    assert_eq!(branch["itemCount"], 2);
    assert!(tables.iter().any(|t| t["tableName"] == "Users"));

    let names: Value = app.get("/tables/names", &token).await?.json().await?;
    assert_eq!(
        names["data"],
        json!(["Roles", "Tokens", "Users", "account", "borrower", "branch", "customer"])
    );
    Ok(())
}

#[tokio::test]
async fn list_annotates_ids() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;

    let body: Value = app.get("/table/borrower/items", &token).await?.json().await?;
    assert_eq!(body["data"][0]["__id"], "Ana::L-10");

    let body: Value = app.get("/table/branch/items", &token).await?.json().await?;
    let ids: Vec<&str> = body["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["__id"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec!["BR1", "BR2"]);
    Ok(())
}

#[tokio::test]
async fn get_by_simple_and_composite_id() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;

    let res = app.get("/table/branch/item/BR1", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["branch_city"], "SP");

    let res = app.get("/table/borrower/item/Ana::L-10", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["customer_name"], "Ana");
    assert_eq!(body["data"]["loan_number"], "L-10");

    let res = app.get("/table/account/item/1021", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["balance"], 500);

    let missing = app.get("/table/branch/item/BR9", &token).await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn create_generates_missing_keys() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;

    let res = app
        .post("/table/branch/item", &token, json!({ "branch_city": "BH" }))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let id = body["data"]["__id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());
    assert_eq!(body["data"]["branch_name"], id.as_str());

    let fetched = app.get(&format!("/table/branch/item/{}", id), &token).await?;
    assert_eq!(fetched.status(), StatusCode::OK);

    let res = app
        .post("/table/account/item", &token, json!({ "balance": 10 }))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert!(body["data"]["account_number"].is_u64());
    Ok(())
}

#[tokio::test]
async fn create_rejects_empty_payloads() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;

    let empty_object = app.post("/table/branch/item", &token, json!({})).await?;
    assert_eq!(empty_object.status(), StatusCode::BAD_REQUEST);

    let no_body = app
        .client
        .post(format!("{}/table/branch/item", app.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(no_body.status(), StatusCode::BAD_REQUEST);

    let not_an_object = app.post("/table/branch/item", &token, json!([1, 2])).await?;
    assert_eq!(not_an_object.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_overwrites_existing_keys() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;

    let res = app
        .post(
            "/table/branch/item",
            &token,
            json!({ "branch_name": "BR1", "branch_city": "POA" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = app.get("/table/branch/item/BR1", &token).await?.json().await?;
    assert_eq!(body["data"]["branch_city"], "POA");
    assert!(body["data"].get("assets").is_none());
    Ok(())
}

#[tokio::test]
async fn update_keeps_the_id_authoritative() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;

    let res = app
        .put(
            "/table/borrower/item/Ana::L-10",
            &token,
            json!({ "customer_name": "Mallory", "amount": 900 }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["customer_name"], "Ana");
    assert_eq!(body["data"]["__id"], "Ana::L-10");

    let listed: Value = app.get("/table/borrower/items", &token).await?.json().await?;
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(listed["data"][0]["amount"], 900);
    Ok(())
}

#[tokio::test]
async fn delete_twice_succeeds() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;

    let first = app.delete("/table/branch/item/BR2", &token).await?;
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.delete("/table/branch/item/BR2", &token).await?;
    assert_eq!(second.status(), StatusCode::OK);

    let gone = app.get("/table/branch/item/BR2", &token).await?;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn unknown_tables_and_malformed_ids() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;

    let res = app.get("/table/nope/items", &token).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.get("/table/account/item/not-a-number", &token).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
