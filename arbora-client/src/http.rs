//! HTTP client for network-based API calls

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiErrorBody;

/// HTTP client for making requests to the inventory backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.client.request(method, self.url(path));
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        request
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        tracing::debug!(path, "GET");
        let response = self.request(Method::GET, path).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        tracing::debug!(path, "POST");
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        tracing::debug!(path, "PUT");
        let response = self.request(Method::PUT, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request
    ///
    /// `204 No Content` and empty 2xx bodies yield `None`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Option<T>> {
        tracing::debug!(path, "DELETE");
        let response = self.request(Method::DELETE, path).send().await?;
        Self::handle_optional_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::error_from_body(status, text));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::InvalidResponse(format!("{} ({} bytes)", e, bytes.len()))
        })
    }

    /// Like `handle_response`, but an empty success body is `None`
    async fn handle_optional_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<Option<T>> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::error_from_body(status, text));
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            ClientError::InvalidResponse(format!("{} ({} bytes)", e, bytes.len()))
        })
    }

    /// 尝试解析为 API 错误响应, 否则按状态码降级
    fn error_from_body(status: StatusCode, text: String) -> ClientError {
        if let Ok(body) = serde_json::from_str::<ApiErrorBody>(&text) {
            return ClientError::Api {
                code: body.code,
                message: body.message,
                details: body.details,
            };
        }
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::BAD_REQUEST => ClientError::Validation(text),
            _ => ClientError::Internal(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ClientConfig::new("http://host:1/").build_http_client().unwrap();
        assert_eq!(client.base_url(), "http://host:1");
        assert_eq!(client.url("api/zones"), "http://host:1/api/zones");
        assert_eq!(client.url("/api/zones/3"), "http://host:1/api/zones/3");
    }

    #[test]
    fn test_auth_header() {
        let client = ClientConfig::default().build_http_client().unwrap();
        assert!(client.auth_header().is_none());
        let client = client.with_token("t0k");
        assert_eq!(client.auth_header().as_deref(), Some("Bearer t0k"));
        assert_eq!(client.token(), Some("t0k"));
    }

    #[test]
    fn test_error_body_parsing() {
        let err = HttpClient::error_from_body(
            StatusCode::NOT_FOUND,
            r#"{"code":4001,"message":"Zone 3 not found"}"#.to_string(),
        );
        assert!(matches!(err, ClientError::Api { code: 4001, .. }));

        let err = HttpClient::error_from_body(StatusCode::FORBIDDEN, "nope".to_string());
        assert!(matches!(err, ClientError::Forbidden(ref t) if t == "nope"));

        let err = HttpClient::error_from_body(StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(err, ClientError::Unauthorized));

        let err = HttpClient::error_from_body(StatusCode::BAD_GATEWAY, "upstream".to_string());
        assert!(matches!(err, ClientError::Internal(_)));
    }
}
