use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::http::api_error::ApiError;
use crate::domain::http::endpoint::ApiEndpoint;

/// Thin JSON client for the garage backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).timeout(timeout).build().map_err(|e| ApiError::Other(e.to_string()))?;

        Ok(ApiClient { client, base_url: base_url.into() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: ApiEndpoint) -> Result<T, ApiError> {
        let url = endpoint.url(&self.base_url);
        log::debug!("{} {}", endpoint.method(), url);

        let response = self.client.request(endpoint.method(), &url).send().await.map_err(|e| ApiError::from_reqwest(&url, e))?;
        let response = Self::check_status(&url, response).await?;

        response.json::<T>().await.map_err(|e| ApiError::Decode { url, reason: e.to_string() })
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, endpoint: ApiEndpoint, body: &B) -> Result<T, ApiError> {
        let url = endpoint.url(&self.base_url);
        log::debug!("{} {}", endpoint.method(), url);

        let response = self.client.request(endpoint.method(), &url).json(body).send().await.map_err(|e| ApiError::from_reqwest(&url, e))?;
        let response = Self::check_status(&url, response).await?;

        response.json::<T>().await.map_err(|e| ApiError::Decode { url, reason: e.to_string() })
    }

    /// Posts a JSON body to an endpoint that answers with plain text.
    pub async fn post_json_for_text<B: Serialize + ?Sized>(&self, endpoint: ApiEndpoint, body: &B) -> Result<(u16, String), ApiError> {
        let url = endpoint.url(&self.base_url);
        log::debug!("{} {}", endpoint.method(), url);

        let response = self.client.request(endpoint.method(), &url).json(body).send().await.map_err(|e| ApiError::from_reqwest(&url, e))?;
        let response = Self::check_status(&url, response).await?;
        let status = response.status().as_u16();

        let text = response.text().await.map_err(|e| ApiError::from_reqwest(&url, e))?;
        Ok((status, text))
    }

    async fn check_status(url: &str, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log::error!("Request to <<{}>> failed. Response-Status-Code: <<{}>> Response-Body: <<{}>>", url, status, body);
        Err(ApiError::from_status(url, status, body))
    }
}
