//! Test helpers for integration tests
//!
//! Utilities for spawning test servers, making HTTP requests (with a
//! cookie store for the refresh cookie), seeding catalog data, and
//! reading OTPs back out of Redis.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

use warranty_api::{create_app, create_app_state};
use warranty_cache::RedisPool;
use warranty_common::{AppConfig, RedisConfig};
use warranty_core::KeyValueStore;

/// Check whether the integration environment (PostgreSQL, Redis, JWT
/// secret) is configured; tests return early when it is not.
pub async fn check_test_env() -> bool {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").is_ok()
        && std::env::var("REDIS_URL").is_ok()
        && std::env::var("JWT_SECRET").is_ok()
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server on an ephemeral port
    pub async fn start() -> Result<Self> {
        let config = AppConfig::from_env()?;
        Self::start_with_config(config).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Wait for the server to accept connections
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Cookie store enabled: the refresh token travels in a cookie
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Make a POST request without a body
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).send().await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await?)
    }

    /// Make a multipart POST request with auth token
    pub async fn post_multipart_auth(
        &self,
        path: &str,
        token: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await?)
    }

    /// Make a PATCH request with auth token
    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .patch(&url)
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await?)
    }
}

/// Assert the response status, printing the body on mismatch
pub async fn assert_status(response: Response, expected: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Expected {expected}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert the status and deserialize the JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected: StatusCode,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if status != expected {
        anyhow::bail!("Expected {expected}, got {status}. Body: {body}");
    }
    Ok(serde_json::from_str(&body)?)
}

/// Read the OTP stored for an identifier straight out of Redis
pub async fn fetch_otp(identifier: &str) -> Result<String> {
    let pool = RedisPool::new(&RedisConfig {
        url: std::env::var("REDIS_URL")?,
        max_connections: 2,
    })?;
    KeyValueStore::get(&pool, &format!("otp:{identifier}"))
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?
        .ok_or_else(|| anyhow::anyhow!("No OTP stored for {identifier}"))
}

/// Connect to the test database
pub async fn test_db() -> Result<PgPool> {
    Ok(PgPool::connect(&std::env::var("DATABASE_URL")?).await?)
}

/// Insert an active model (120-month warranty) and source, returning
/// their ids
pub async fn seed_catalog() -> Result<(Uuid, Uuid)> {
    let pool = test_db().await?;
    let model_id = Uuid::new_v4();
    let source_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO mattress_models \
         (id, name, slug, description, warranty_months, released_at, is_active, created_at) \
         VALUES ($1, $2, $3, NULL, 120, NULL, TRUE, NOW())",
    )
    .bind(model_id)
    .bind(format!("Test Model {model_id}"))
    .bind(format!("test-model-{model_id}"))
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO purchase_sources (id, name, source_type, is_active, created_at) \
         VALUES ($1, $2, 'online', TRUE, NOW())",
    )
    .bind(source_id)
    .bind(format!("Test Source {source_id}"))
    .execute(&pool)
    .await?;

    Ok((model_id, source_id))
}

/// Promote a user to the admin role
pub async fn promote_to_admin(user_id: Uuid) -> Result<()> {
    let pool = test_db().await?;
    sqlx::query("UPDATE users SET role = 'ADMIN' WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await?;
    Ok(())
}
