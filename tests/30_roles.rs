mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::spawn_app;

#[tokio::test]
async fn create_and_fetch_role() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;

    let role_id = app
        .create_role(
            &token,
            "Tellers",
            json!([
                { "table": "customer", "select": true },
                { "tableName": "loan", "allowedView": false }
            ]),
        )
        .await?;
    assert!(role_id.starts_with("role_"));

    let body: Value = app.get(&format!("/role/{}", role_id), &token).await?.json().await?;
    let role = &body["data"];
    assert_eq!(role["name"], "Tellers");
    assert_eq!(role["type"], "CUSTOM");
    assert_eq!(role["isCustom"], true);
    assert_eq!(role["createdBy"], "user_admin_001");
    // The grant-nothing entry is dropped
    assert_eq!(
        role["permissions"],
        json!([{ "tableName": "customer", "allowedView": true, "allowedEdit": false, "allowedDelete": false }])
    );

    let listed: Value = app.get("/role", &token).await?.json().await?;
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn role_names_are_validated_and_unique() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;
    app.create_role(&token, "Auditors", json!([])).await?;

    let duplicate = app
        .post("/role", &token, json!({ "name": "Auditors", "description": "again" }))
        .await?;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    for name in ["ab", "bad/name", ""] {
        let res = app
            .post("/role", &token, json!({ "name": name, "description": "d" }))
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "name {:?}", name);
    }

    let no_description = app.post("/role", &token, json!({ "name": "Managers" })).await?;
    assert_eq!(no_description.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn system_role_cannot_be_changed() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;

    for payload in [json!({ "name": "Root" }), json!({}), json!({ "permissions": [] })] {
        let res = app.put("/role/admin", &token, payload).await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
    let res = app.delete("/role/admin", &token).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn update_replaces_permissions() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;
    let role_id = app
        .create_role(&token, "Tellers", json!([{ "tableName": "customer", "allowedView": true }]))
        .await?;

    let res = app
        .put(
            &format!("/role/{}", role_id),
            &token,
            json!({
                "description": "loans only",
                "permissions": [{ "tableName": "borrower", "allowedView": true, "allowedEdit": true }]
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["description"], "loans only");
    assert_eq!(body["data"]["permissions"][0]["tableName"], "borrower");
    assert_eq!(body["data"]["permissions"].as_array().map(Vec::len), Some(1));

    let missing = app.put("/role/role_missing", &token, json!({})).await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn role_in_use_cannot_be_deleted() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.admin_token().await?;
    let tellers = app.create_role(&token, "Tellers", json!([])).await?;
    let auditors = app.create_role(&token, "Auditors", json!([])).await?;
    let user_id = app.create_user(&token, "ana", &[&tellers]).await?;

    let blocked = app.delete(&format!("/role/{}", tellers), &token).await?;
    assert_eq!(blocked.status(), StatusCode::CONFLICT);

    let res = app
        .put(&format!("/user/{}", user_id), &token, json!({ "roleIds": [auditors] }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.delete(&format!("/role/{}", tellers), &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let gone = app.get(&format!("/role/{}", tellers), &token).await?;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    Ok(())
}
