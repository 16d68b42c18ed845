use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use emberforge_core::{GeneratedItem, MaterialCatalog, MaterialCombination};

use crate::convert::response_to_item;
use crate::error::ClientError;
use crate::types::{GenerationRequest, GenerationResponse};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can turn a combination into an item
///
/// The factory is generic over this so tests can script successes, failures,
/// and delays without a network.
pub trait ItemGenerator: Send + Sync {
    fn generate(
        &self,
        combination: &MaterialCombination,
    ) -> impl Future<Output = Result<GeneratedItem, ClientError>> + Send;
}

/// HTTP client for the generative stats service
pub struct GenerativeClient {
    client: Client,
    base_url: String,
    catalog: Arc<MaterialCatalog>,
}

impl GenerativeClient {
    /// Create a client against the given service URL
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        catalog: Arc<MaterialCatalog>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            catalog,
        })
    }

    /// Client against the local development service with the default timeout
    pub fn local(catalog: Arc<MaterialCatalog>) -> Result<Self, ClientError> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT, catalog)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the service answers its health endpoint
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// One generation attempt, no retry
    async fn request_once(
        &self,
        request: &GenerationRequest,
        combination: &MaterialCombination,
    ) -> Result<GeneratedItem, ClientError> {
        let url = format!("{}/generate_stats", self.base_url);

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::ServerError {
                status: status.as_u16(),
                message: text,
            });
        }

        let payload: GenerationResponse = response.json().await?;
        response_to_item(&self.catalog, combination, payload)
    }
}

impl ItemGenerator for GenerativeClient {
    /// Request generation, retrying once on a transient transport failure
    ///
    /// A second failure, a server error, or a bad payload propagates; the
    /// factory decides whether to fall back.
    async fn generate(
        &self,
        combination: &MaterialCombination,
    ) -> Result<GeneratedItem, ClientError> {
        let request = GenerationRequest::from_combination(combination);

        match self.request_once(&request, combination).await {
            Ok(item) => Ok(item),
            Err(err) if err.is_transient() => {
                debug!(
                    "Transient generation failure for {}: {}. Retrying once.",
                    combination.fingerprint(),
                    err
                );
                self.request_once(&request, combination).await
            }
            Err(err) => Err(err),
        }
    }
}
