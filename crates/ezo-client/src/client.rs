//! The API client and its single-request plumbing.

use std::time::Duration;

use ezo_config::EzoConfig;
use reqwest::{Method, RequestBuilder};
use serde_json::Value;

use crate::error::EzoError;
use crate::form::FormPayload;
use crate::http::{check_response, read_json};

/// HTTP client for one EZOfficeInventory account.
///
/// Base URL and bearer token come from the [`EzoConfig`] handed to
/// [`EzoClient::new`] and are fixed for the lifetime of the client.
#[derive(Debug, Clone)]
pub struct EzoClient {
    http: reqwest::Client,
    config: EzoConfig,
}

impl EzoClient {
    /// Build a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Config`] if the base URL or token is missing or
    /// invalid, and [`EzoError::Build`] if the HTTP client cannot be built.
    pub fn new(config: EzoConfig) -> Result<Self, EzoError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(EzoError::Build)?;
        tracing::debug!(base_url = %config.base_url, "ezo client ready");
        Ok(Self { http, config })
    }

    /// Build a client from the layered config sources (TOML files + `EZO_*` env).
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Config`] if loading or validation fails.
    pub fn from_default_config() -> Result<Self, EzoError> {
        Self::new(EzoConfig::load()?)
    }

    pub const fn config(&self) -> &EzoConfig {
        &self.config
    }

    /// Start an authenticated request against an endpoint path.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.endpoint(path))
            .bearer_auth(&self.config.token)
    }

    /// Send a request and return the JSON body of a success response.
    pub(crate) async fn send_json(
        &self,
        builder: RequestBuilder,
        operation: &'static str,
    ) -> Result<Value, EzoError> {
        let resp = builder
            .send()
            .await
            .map_err(|source| EzoError::transport(operation, source))?;
        let resp = check_response(resp, operation).await?;
        read_json(resp, operation).await
    }

    /// Single GET returning the whole body.
    pub(crate) async fn get_json(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, EzoError> {
        tracing::debug!(operation, path, "GET");
        let builder = self.request(Method::GET, path).query(query);
        self.send_json(builder, operation).await
    }

    /// Bodyless state change such as `activate` or `mark_complete`.
    pub(crate) async fn action(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
    ) -> Result<Value, EzoError> {
        tracing::debug!(operation, %method, path, "action");
        self.send_json(self.request(method, path), operation).await
    }

    /// Validate, allow-list, and submit a typed payload as a form body.
    pub(crate) async fn submit<P: FormPayload>(
        &self,
        method: Method,
        path: &str,
        payload: &P,
        query: &[(&str, String)],
    ) -> Result<Value, EzoError> {
        let fields = payload.encode()?;
        let operation = P::SCHEMA.operation;
        tracing::debug!(operation, %method, path, fields = fields.len(), "submit");
        let builder = self
            .request(method, path)
            .query(query)
            .form(fields.as_pairs());
        self.send_json(builder, operation).await
    }
}
