use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use snafu::ResultExt;

use super::error::{
    BuildClientSnafu, DecodeSnafu, GatewayError, GatewayResult, StatusSnafu, TransportSnafu,
};
use super::types::{BackendAvailability, DeleteAllOutcome, HistoryEntry, User, backend_status};
use super::RemoteDataGateway;

pub const USERS_PATH: &str = "api/users";
pub const HISTORY_LIST_PATH: &str = "history/list";
pub const HISTORY_DELETE_ALL_PATH: &str = "history/delete_all";
pub const HISTORY_ENSURE_PATH: &str = "history/ensure";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim().to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// `RemoteDataGateway` backed by the advisor backend's HTTP API.
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context(BuildClientSnafu {
                stage: "http-gateway-new",
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, stage: &'static str, path: &'static str) -> GatewayResult<Url> {
        self.base_url
            .join(path)
            .map_err(|error| GatewayError::InvalidBaseUrl {
                stage,
                raw: self.base_url.to_string(),
                details: error.to_string(),
            })
    }

    async fn send(
        &self,
        stage: &'static str,
        method: Method,
        path: &'static str,
        query: &[(&str, String)],
    ) -> GatewayResult<(u16, String)> {
        let url = self.endpoint(stage, path)?;
        let response = self
            .client
            .request(method, url)
            .query(query)
            .send()
            .await
            .context(TransportSnafu { stage, path })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context(TransportSnafu { stage, path })?;

        tracing::debug!(path, status, "backend call settled");
        Ok((status, body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        stage: &'static str,
        path: &'static str,
        query: &[(&str, String)],
    ) -> GatewayResult<T> {
        let (status, body) = self.send(stage, Method::GET, path, query).await?;
        if !is_success(status) {
            return StatusSnafu {
                stage,
                path,
                status,
                body,
            }
            .fail();
        }

        serde_json::from_str(&body).context(DecodeSnafu { stage, path })
    }

    async fn ensure(&self) -> GatewayResult<BackendAvailability> {
        let (status, body) = self
            .send("ensure-history", Method::GET, HISTORY_ENSURE_PATH, &[])
            .await?;
        // Error responses are not guaranteed to carry JSON; classify on status alone then.
        let payload = serde_json::from_str::<Value>(&body).unwrap_or(Value::Null);
        Ok(classify_ensure_response(status, &payload))
    }

    async fn delete_all(&self) -> GatewayResult<DeleteAllOutcome> {
        let (status, body) = self
            .send(
                "delete-all-history",
                Method::DELETE,
                HISTORY_DELETE_ALL_PATH,
                &[],
            )
            .await?;

        if is_success(status) {
            return Ok(DeleteAllOutcome::succeeded());
        }

        tracing::warn!(status, "backend rejected bulk history delete");
        let detail = if body.trim().is_empty() {
            format!("status {status}")
        } else {
            body
        };
        Ok(DeleteAllOutcome::failed(detail))
    }
}

impl RemoteDataGateway for HttpGateway {
    fn list_users<'a>(&'a self) -> BoxFuture<'a, GatewayResult<Vec<User>>> {
        Box::pin(self.get_json("list-users", USERS_PATH, &[]))
    }

    fn fetch_history<'a>(
        &'a self,
        offset: usize,
    ) -> BoxFuture<'a, GatewayResult<Vec<HistoryEntry>>> {
        Box::pin(async move {
            self.get_json(
                "fetch-history",
                HISTORY_LIST_PATH,
                &[("offset", offset.to_string())],
            )
            .await
        })
    }

    fn delete_all_history<'a>(&'a self) -> BoxFuture<'a, GatewayResult<DeleteAllOutcome>> {
        Box::pin(self.delete_all())
    }

    fn ensure_history<'a>(&'a self) -> BoxFuture<'a, GatewayResult<BackendAvailability>> {
        Box::pin(self.ensure())
    }
}

fn parse_base_url(raw: &str) -> GatewayResult<Url> {
    // `Url::join` drops the last path segment unless the base ends with a slash.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&normalized).map_err(|error| GatewayError::InvalidBaseUrl {
        stage: "parse-base-url",
        raw: raw.to_string(),
        details: error.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(GatewayError::InvalidBaseUrl {
            stage: "parse-base-url",
            raw: raw.to_string(),
            details: "URL cannot be used as a base".to_string(),
        });
    }

    Ok(url)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Maps the availability probe response onto the fixed status strings.
pub fn classify_ensure_response(status: u16, payload: &Value) -> BackendAvailability {
    let has_message = payload
        .get("message")
        .and_then(Value::as_str)
        .is_some_and(|message| !message.trim().is_empty());

    let status_text = if has_message {
        backend_status::WORKING.to_string()
    } else {
        match status {
            500 => backend_status::NOT_WORKING.to_string(),
            401 => backend_status::INVALID_CREDENTIALS.to_string(),
            422 => payload
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| backend_status::NOT_WORKING.to_string()),
            _ => backend_status::NOT_CONFIGURED.to_string(),
        }
    };

    BackendAvailability {
        available: is_success(status),
        status: Some(status_text),
    }
}
