use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn status_error(&self, provider: &str) -> PipelineError {
        let detail = provider_error_message(&self.body).unwrap_or_else(|| self.body.clone());
        log::error!(
            "{} returned non-success status: {}. Body: {}",
            provider,
            self.status,
            self.body
        );
        PipelineError::fetch(format!(
            "{} responded with status {}: {}",
            provider, self.status, detail
        ))
    }

    /// Checks the status, then decodes the body. Either failure becomes a `Fetch` error
    /// carrying the provider's own message when one can be found.
    pub fn decode<T: DeserializeOwned>(&self, provider: &str) -> Result<T, PipelineError> {
        if !self.is_success() {
            return Err(self.status_error(provider));
        }
        serde_json::from_str(&self.body).map_err(|e| {
            log::error!("Failed to parse {} response. Error: {}. Body: {}", provider, e, self.body);
            PipelineError::fetch(format!("{} returned an unreadable body: {}", provider, e))
        })
    }
}

/// Pulls a human-readable error out of a provider payload: an `error` string,
/// an `error.message`, or a top-level `message`.
pub fn provider_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    match json.get("error") {
        Some(Value::String(message)) => return Some(message.clone()),
        Some(Value::Object(detail)) => {
            if let Some(Value::String(message)) = detail.get("message") {
                return Some(message.clone());
            }
        }
        _ => {}
    }
    json.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Outbound HTTP, the only place the pipeline suspends.
#[async_trait(?Send)]
pub trait Transport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, PipelineError>;

    async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
    ) -> Result<HttpResponse, PipelineError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        ReqwestTransport { client }
    }

    async fn send(
        &self,
        mut request: reqwest::RequestBuilder,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, PipelineError> {
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, PipelineError> {
        self.send(self.client.get(url), headers).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
    ) -> Result<HttpResponse, PipelineError> {
        self.send(self.client.post(url).body(body), headers).await
    }
}
