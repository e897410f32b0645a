use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::app_config::ServiceConfig;
use crate::errors::ServiceError;
use crate::model::{Brief, ScriptDocument};
use crate::providers::{RefineRequest, RefineResponse, ScriptService};

/// Client for the script generation service's HTTP API
#[derive(Debug, Clone)]
pub struct HttpScriptService {
    /// HTTP client for API requests
    client: Client,
    /// Service base URL without a trailing slash
    endpoint: String,
    /// Path of the generation endpoint
    generate_path: String,
    /// Path of the refinement endpoint
    refine_path: String,
    /// Path of the health check endpoint
    health_path: String,
}

/// Health check response body
#[derive(Debug, serde::Deserialize)]
struct HealthResponse {
    status: String,
}

impl HttpScriptService {
    /// Create a client for the service at `endpoint` using the default API paths
    pub fn new(endpoint: impl AsRef<str>, timeout: Duration) -> Result<Self, ServiceError> {
        let config = ServiceConfig {
            endpoint: endpoint.as_ref().to_string(),
            timeout_secs: timeout.as_secs().max(1),
            ..ServiceConfig::default()
        };
        Self::from_config(&config)
    }

    /// Create a client from the service section of the configuration
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        Url::parse(&endpoint)
            .map_err(|e| ServiceError::RequestFailed(format!("Invalid service endpoint '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            generate_path: config.generate_path.clone(),
            refine_path: config.refine_path.clone(),
            health_path: config.health_path.clone(),
        })
    }

    /// Full URL for an API path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url_for(path);
        debug!("POST {}", url);

        let response = self.client.post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        decode_body(check_status(response).await?).await
    }
}

#[async_trait]
impl ScriptService for HttpScriptService {
    async fn generate(&self, brief: &Brief) -> Result<ScriptDocument, ServiceError> {
        self.post_json(&self.generate_path, brief).await
    }

    async fn refine(&self, request: &RefineRequest) -> Result<RefineResponse, ServiceError> {
        self.post_json(&self.refine_path, request).await
    }

    async fn test_connection(&self) -> Result<(), ServiceError> {
        let url = self.url_for(&self.health_path);
        debug!("GET {}", url);

        let response = self.client.get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let health: HealthResponse = decode_body(check_status(response).await?).await?;
        if health.status != "healthy" {
            return Err(ServiceError::ApiError {
                status_code: 200,
                message: format!("Service reported status '{}'", health.status),
            });
        }
        Ok(())
    }
}

fn transport_error(e: reqwest::Error) -> ServiceError {
    if e.is_connect() || e.is_timeout() {
        ServiceError::ConnectionError(e.to_string())
    } else {
        ServiceError::RequestFailed(e.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    error!("Script service error ({}): {}", status, error_text);
    Err(ServiceError::ApiError {
        status_code: status.as_u16(),
        message: error_text,
    })
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let text = response.text().await
        .map_err(|e| ServiceError::RequestFailed(format!("Failed to read response body: {}", e)))?;

    serde_json::from_str(&text).map_err(|e| {
        let preview: String = text.chars().take(500).collect();
        error!("Failed to parse script service response: {}. Raw response (first 500 chars): {}", e, preview);
        ServiceError::ParseError(e.to_string())
    })
}
