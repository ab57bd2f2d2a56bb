#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, Response, StatusCode};
use serde_json::{json, Value};

use kv_admin_api::config::AppConfig;
use kv_admin_api::services::bootstrap::{self, Fixture};
use kv_admin_api::store::{MemoryStore, StoreHandle};
use kv_admin_api::{app, AppState};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const PASSWORD: &str = "secret1";

/// A server bound to an ephemeral port with its own in-memory store
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: StoreHandle,
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.bcrypt_cost = 4;
    config.bootstrap.admin_username = ADMIN_USERNAME.to_string();
    config.bootstrap.admin_password = ADMIN_PASSWORD.to_string();
    config.api.enable_request_logging = false;
    config
}

fn bank_fixture() -> Result<Fixture> {
    let fixture = json!({
        "tables": [
            {
                "name": "branch",
                "partitionKey": { "name": "branch_name", "type": "S" },
                "items": [
                    { "branch_name": "BR1", "branch_city": "SP", "assets": 1000 },
                    { "branch_name": "BR2", "branch_city": "RJ", "assets": 2000 }
                ]
            },
            {
                "name": "borrower",
                "partitionKey": { "name": "customer_name", "type": "S" },
                "sortKey": { "name": "loan_number", "type": "S" },
                "items": [{ "customer_name": "Ana", "loan_number": "L-10" }]
            },
            {
                "name": "customer",
                "partitionKey": { "name": "customer_name", "type": "S" },
                "items": [{ "customer_name": "Ana", "customer_city": "SP" }]
            },
            {
                "name": "account",
                "partitionKey": { "name": "account_number", "type": "N" },
                "items": [{ "account_number": 1021, "balance": 500 }]
            }
        ]
    });
    Ok(serde_json::from_value(fixture)?)
}

pub async fn spawn_app() -> Result<TestApp> {
    let config = test_config();
    let store: StoreHandle = Arc::new(MemoryStore::new());
    bootstrap::ensure_system(&store, &config.bootstrap, config.security.bcrypt_cost).await?;
    bootstrap::load_fixture(&store, bank_fixture()?).await?;

    let router = app(AppState::new(store.clone(), &config), &config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        store,
    })
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Response> {
        let mut builder = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        Ok(builder.send().await?)
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<Response> {
        self.request(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<Response> {
        self.request(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<Response> {
        self.request(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<Response> {
        self.request(Method::DELETE, path, Some(token), None).await
    }

    /// Log in and return the bearer token
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let res = self
            .request(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carried no token")
    }

    pub async fn admin_token(&self) -> Result<String> {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Create a role through the API and return its id
    pub async fn create_role(&self, token: &str, name: &str, permissions: Value) -> Result<String> {
        let res = self
            .post(
                "/role",
                token,
                json!({ "name": name, "description": "test role", "permissions": permissions }),
            )
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "role create failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["roleId"]
            .as_str()
            .map(str::to_string)
            .context("role response carried no roleId")
    }

    /// Create a user with password [`PASSWORD`] and return its id
    pub async fn create_user(&self, token: &str, username: &str, role_ids: &[&str]) -> Result<String> {
        let res = self
            .post(
                "/user",
                token,
                json!({
                    "username": username,
                    "name": username,
                    "password": PASSWORD,
                    "roleIds": role_ids
                }),
            )
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "user create failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["userId"]
            .as_str()
            .map(str::to_string)
            .context("user response carried no userId")
    }

    /// A fresh user holding exactly one new role with these grants
    pub async fn user_with_grants(&self, username: &str, permissions: Value) -> Result<String> {
        let admin = self.admin_token().await?;
        let role_id = self
            .create_role(&admin, &format!("{} role", username), permissions)
            .await?;
        self.create_user(&admin, username, &[&role_id]).await?;
        self.login(username, PASSWORD).await
    }
}
