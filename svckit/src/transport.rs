// svckit/src/transport.rs
//
// HTTP transport shared by every API client of the console.
// Attaches bearer credentials and folds every outcome into ApiResponse.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::credentials::CredentialSource;
use crate::errors::ClinicError;
use crate::metrics;

pub use reqwest::Method;

/// Uniform `{success, data?, error?}` envelope returned by every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    failure: Option<ClinicError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            failure: None,
        }
    }

    pub fn failed(err: ClinicError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            failure: Some(err),
        }
    }

    pub fn into_result(self) -> Result<T, ClinicError> {
        match (self.data, self.failure) {
            (Some(data), None) if self.success => Ok(data),
            (_, Some(err)) => Err(err),
            (_, None) => Err(ClinicError::Request(
                self.error.unwrap_or_else(|| "Empty response".to_string()),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions {
    /// Serve a successful GET from the in-memory cache while it is fresh.
    pub use_cache: bool,
}

impl RequestOptions {
    pub fn cached() -> Self {
        Self { use_cache: true }
    }

    pub fn no_cache() -> Self {
        Self { use_cache: false }
    }
}

struct CachedBody {
    stored_at: Instant,
    body: serde_json::Value,
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, CachedBody>>,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig, credentials: Arc<dyn CredentialSource>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            cache_ttl: config.cache_ttl(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResponse<T> {
        self.request(Method::GET, path, None, options).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResponse<T> {
        match serde_json::to_value(body) {
            Ok(body) => {
                self.request(Method::POST, path, Some(body), RequestOptions::default())
                    .await
            }
            Err(e) => encode_failure(e),
        }
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResponse<T> {
        self.request(Method::POST, path, None, RequestOptions::default()).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResponse<T> {
        match serde_json::to_value(body) {
            Ok(body) => {
                self.request(Method::PUT, path, Some(body), RequestOptions::default())
                    .await
            }
            Err(e) => encode_failure(e),
        }
    }

    /// Issues one request. Never fails at the Rust level: transport errors,
    /// non-2xx statuses and undecodable bodies all come back as
    /// `success: false` with a readable message.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> ApiResponse<T> {
        let url = format!("{}{}", self.base_url, path);
        let cacheable = method == Method::GET && options.use_cache;

        if cacheable {
            if let Some(body) = self.cached(&url) {
                debug!("Cache hit for {}", url);
                return decode(body);
            }
        }

        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = self.credentials.bearer_token() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if !options.use_cache {
            request = request.header(CACHE_CONTROL, "no-cache");
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let started = Instant::now();
        let result = request.send().await;
        let elapsed = started.elapsed().as_secs_f64();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                metrics::record_request(method.as_str(), None, elapsed);
                warn!("{} {} failed: {}", method, url, e);
                return ApiResponse::failed(ClinicError::from(e));
            }
        };

        let status = response.status();
        metrics::record_request(method.as_str(), Some(status.as_u16()), elapsed);
        debug!("{} {} -> {} in {:.3}s", method, url, status, elapsed);

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return ApiResponse::failed(ClinicError::from(e)),
        };

        if !status.is_success() {
            let message = error_message(&bytes).unwrap_or_else(|| {
                format!("HTTP {} {}", status.as_u16(), status.canonical_reason().unwrap_or(""))
                    .trim_end()
                    .to_string()
            });
            warn!("{} {} rejected: {}", method, url, message);
            return ApiResponse::failed(ClinicError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(body) => body,
            Err(e) => return ApiResponse::failed(ClinicError::Decode(e.to_string())),
        };

        if cacheable {
            self.cache.lock().insert(
                url,
                CachedBody {
                    stored_at: Instant::now(),
                    body: body.clone(),
                },
            );
        }

        decode(body)
    }

    /// Drops every cached GET body.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    fn cached(&self, url: &str) -> Option<serde_json::Value> {
        let mut cache = self.cache.lock();
        match cache.get(url) {
            Some(entry) if entry.stored_at.elapsed() < self.cache_ttl => Some(entry.body.clone()),
            Some(_) => {
                cache.remove(url);
                None
            }
            None => None,
        }
    }
}

fn encode_failure<T>(err: serde_json::Error) -> ApiResponse<T> {
    ApiResponse::failed(ClinicError::Request(format!("Cannot encode request: {}", err)))
}

fn decode<T: DeserializeOwned>(body: serde_json::Value) -> ApiResponse<T> {
    match serde_json::from_value(body) {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => ApiResponse::failed(ClinicError::Decode(e.to_string())),
    }
}

/// Pulls a readable message out of an error body, if the server sent one.
fn error_message(bytes: &[u8]) -> Option<String> {
    let body: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
