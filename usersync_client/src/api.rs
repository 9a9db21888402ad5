use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::envelope::Envelope;
use crate::errors::ClientError;

/// Supplies the bearer token attached to outbound requests
///
/// Implementations typically wrap the identity provider's silent token
/// acquisition; returning `None` sends the request anonymously.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self, url: &str) -> Option<String>;
}

type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// HTTP client wrapping every call in the standard pipeline
///
/// Request side: bearer-token attachment, skipped for URLs on the public
/// allow-list. Response side: envelope unwrapping, error classification, one
/// retry for transport failures and 5xx responses, and an unauthorized hook
/// for 401 (clear local auth state, redirect to login).
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token_provider: Option<Arc<dyn TokenProvider>>,
    skip_auth: Vec<String>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        // A trailing slash keeps relative path joins appending
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token_provider: None,
            skip_auth: Vec::new(),
            on_unauthorized: None,
        })
    }

    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    /// URLs containing any of these fragments are sent without a token
    pub fn with_skip_auth(mut self, fragments: Vec<String>) -> Self {
        self.skip_auth = fragments;
        self
    }

    /// Invoked on every 401 before the error is returned
    pub fn on_unauthorized(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.request(Method::POST, path, Some(body)).await
    }

    fn should_skip_auth(&self, url: &str) -> bool {
        self.skip_auth.iter().any(|fragment| url.contains(fragment))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let token = if self.should_skip_auth(url.as_str()) {
            None
        } else {
            match &self.token_provider {
                Some(provider) => provider.access_token(url.as_str()).await,
                None => None,
            }
        };

        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut builder = self.http.request(method.clone(), url.clone());
            if let Some(token) = &token {
                builder = builder.bearer_auth(token);
            }
            if let Some(body) = &body {
                builder = builder.json(body);
            }

            let response = match builder.send().await {
                Ok(response) => response,
                Err(err) if attempt == 1 => {
                    tracing::warn!("Request to {} failed, retrying once: {}", url, err);
                    continue;
                }
                Err(err) => return Err(ClientError::Network(err.to_string())),
            };

            let status = response.status().as_u16();
            if status >= 500 && attempt == 1 {
                tracing::warn!("Server error {} from {}, retrying once", status, url);
                continue;
            }

            return self.classify(status, response).await;
        }
    }

    async fn classify<T: DeserializeOwned>(
        &self,
        status: u16,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        if status == 401 {
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
            return Err(ClientError::Unauthorized);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let body: Option<Value> = serde_json::from_slice(&bytes).ok();

        // Standard envelopes are unwrapped whatever the HTTP status; the
        // error list inside is authoritative
        if let Some(envelope) = body.as_ref().and_then(Envelope::from_value) {
            return envelope.unwrap_result();
        }

        if (200..300).contains(&status) {
            match body {
                Some(value) => {
                    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
                }
                None => Err(ClientError::Decode("Response body was not JSON".to_string())),
            }
        } else {
            Err(ClientError::from_status(status))
        }
    }
}
