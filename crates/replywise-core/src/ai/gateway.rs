use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, non_empty, ReplyGenerator, ReplyRequest};
use crate::error::GenerateError;

#[derive(Deserialize)]
struct GatewayResponse {
    reply: Option<String>,
}

/// Client for a hosted reply function that builds the prompt server-side.
///
/// The request body is the [`ReplyRequest`] itself; the function answers
/// with `{ "reply": "..." }` or `{ "error": "..." }`.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl GatewayClient {
    pub fn new(url: &str, api_key: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

fn parse_reply(body: &str) -> Result<String, GenerateError> {
    let response: GatewayResponse =
        serde_json::from_str(body).map_err(|_| GenerateError::EmptyResponse)?;
    non_empty(response.reply)
}

#[async_trait]
impl ReplyGenerator for GatewayClient {
    async fn generate(&self, request: &ReplyRequest) -> Result<String, GenerateError> {
        let mut builder = self.client.post(&self.url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if let Err(err) = check_status(status, &body) {
            tracing::warn!(status, "reply function returned an error");
            return Err(err);
        }

        parse_reply(&body)
    }
}
