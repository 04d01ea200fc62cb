use std::sync::RwLock;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::wire::ErrorBody;
use crate::{Error, Result};

/// Shared HTTP client for a TaskFlow server
///
/// Holds the bearer token of the signed-in user, if any.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            // Talk to the server directly, never through a proxy
            http: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request, turning non-success responses into errors
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            Error::Persistence(format!("Failed to reach TaskFlow server: {}", e))
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.into_error(),
            Err(_) => Error::Persistence(format!("Server returned {}: {}", status, text)),
        })
    }

    pub(crate) async fn json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| Error::Persistence(format!("Invalid server response: {}", e)))
    }
}
