// warung-client/src/http.rs
// HTTP client for the POS REST backend

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::client::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use shared::{EntityBody, ErrorBody, ListBody};

/// HTTP client for making network requests to the POS backend
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

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.client.request(method, self.url(path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Send a request and decode a JSON body
    pub async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let response = req.send().await?;
        let text = Self::check(response).await?;
        serde_json::from_str(&text).map_err(Into::into)
    }

    /// Send a request and ignore whatever body comes back
    pub async fn send_unit(&self, req: RequestBuilder) -> ClientResult<()> {
        let response = req.send().await?;
        Self::check(response).await.map(|_| ())
    }

    /// Read the body, mapping non-success statuses to errors
    async fn check(response: reqwest::Response) -> ClientResult<String> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return Ok(text);
        }

        if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
            return Err(ClientError::Api {
                status,
                message: body.message,
            });
        }

        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::BadRequest(text)
            }
            _ => ClientError::Internal(text),
        })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    /// GET a list endpoint, accepting bare and `{data: [...]}` bodies
    ///
    /// Any other body shape yields an empty list.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Vec<T>> {
        let body: ListBody<T> = self.get(path).await?;
        Ok(body.into_items().unwrap_or_else(|| {
            tracing::warn!(path, "Unexpected list response structure");
            Vec::new()
        }))
    }

    /// GET a single entity, accepting bare and `{data: ...}` bodies
    pub async fn get_entity<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.get::<EntityBody<T>>(path).await.map(EntityBody::into_inner)
    }

    /// Make a request with a JSON body and decode a single entity
    pub async fn send_entity<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send::<EntityBody<T>>(self.request(method, path).json(body))
            .await
            .map(EntityBody::into_inner)
    }

    /// Make a request with a JSON body, tolerating any response body
    ///
    /// Returns the decoded entity when the server echoes one back.
    pub async fn send_lenient<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<Option<T>> {
        let mut req = self.request(method, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        let response = req.send().await?;
        let text = Self::check(response).await?;
        Ok(serde_json::from_str::<EntityBody<T>>(&text)
            .ok()
            .map(EntityBody::into_inner))
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send_unit(self.request(Method::DELETE, path)).await
    }

    // ========== Auth API ==========

    /// Login with email and password
    ///
    /// On success the returned token is kept for subsequent requests.
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: LoginResponse = self
            .send(self.request(Method::POST, "login").json(&req))
            .await?;
        tracing::info!(email, role = %resp.user.role, "Logged in");
        self.token = Some(resp.token.clone());
        Ok(resp)
    }

    /// Register a new cashier account
    pub async fn register(
        &self,
        fullname: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<RegisterResponse> {
        let req = RegisterRequest {
            fullname: fullname.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.request(Method::POST, "register").json(&req))
            .await
    }

    /// Logout
    ///
    /// The backend keeps no session; dropping the token is all there is.
    pub fn logout(&mut self) {
        self.token = None;
    }

    // ========== Menu API ==========

    /// Food categories used for menu filtering
    pub async fn categories(&self) -> ClientResult<Vec<String>> {
        self.get_list("foods/categories").await
    }
}
