//! Test helpers for integration tests
//!
//! Provides utilities for spawning the API over in-memory repositories,
//! issuing signed tokens, and making HTTP requests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use desk_api::{create_app, AppState};
use desk_common::{
    AppConfig, AppSettings, CorsConfig, DatabaseConfig, Environment, ExportConfig, JwtConfig,
    JwtService, LogFormat, RateLimitConfig, ServerConfig,
};
use desk_core::{Actor, PermissiveTransitions, RestrictedTransitions, TransitionPolicy};
use desk_service::ServiceContextBuilder;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{MemoryRepos, MemoryStore};

/// Signing secret shared by the server under test and `token_for`
const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Configuration the test server runs with
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "desk-api-test".to_string(),
            env: Environment::Development,
            log_format: LogFormat::Text,
        },
        api: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 5,
        },
        // Repositories are in-memory; no connection is ever opened
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: 1,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            issuer: None,
        },
        // High enough that no test trips the limiter
        rate_limit: RateLimitConfig {
            requests_per_second: 1_000,
            burst: 1_000,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        export: ExportConfig { max_rows: 10_000 },
        status_transitions: None,
    }
}

/// Test server instance that manages lifecycle
///
/// Keeps the backing [`MemoryStore`] handle so tests can seed state before
/// requests and inspect what the server wrote afterwards.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: MemoryStore,
    jwt: Arc<JwtService>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start a test server with a status-transition whitelist
    pub async fn start_with_transitions(spec: &str) -> Result<Self> {
        let mut config = test_config();
        config.status_transitions = Some(spec.to_string());
        Self::start_with_config(config).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let store = MemoryStore::new();
        let repos = Arc::new(MemoryRepos::new(store.clone()));
        let jwt = Arc::new(JwtService::new(
            &config.jwt.secret,
            config.jwt.issuer.clone(),
        ));

        let transition_policy: Arc<dyn TransitionPolicy> = match &config.status_transitions {
            Some(spec) => Arc::new(RestrictedTransitions::parse_spec(spec)?),
            None => Arc::new(PermissiveTransitions),
        };

        let context = ServiceContextBuilder::new()
            .thread_repo(repos.clone())
            .tag_repo(repos.clone())
            .flag_repo(repos.clone())
            .audit_repo(repos.clone())
            .moderation_repo(repos.clone())
            .directory_repo(repos.clone())
            .health_probe(repos)
            .jwt_service(jwt.clone())
            .transition_policy(transition_policy)
            .export_max_rows(config.export.max_rows)
            .build()?;

        // Build application
        let app = create_app(AppState::new(context, config));

        // Bind before spawning so requests never race the accept loop
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        // Spawn server task
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Create HTTP client
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            store,
            jwt,
            _handle: handle,
        })
    }

    /// Issue a signed token for the given caller
    pub fn token_for(&self, actor: &Actor) -> String {
        self.jwt.issue(actor).expect("failed to issue test token")
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
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
