//! HTTP client transport
//!
//! Each request is one POST; the response envelope is the response body, so
//! delivery is always [`Delivery::Direct`].

use async_trait::async_trait;

use super::{ClientTransport, Delivery};
use crate::error::{Error, Result};
use crate::jsonrpc::decode_response;
use crate::protocol::JsonRpcRequest;
use crate::transport::http::MCP_ENDPOINT;

pub struct HttpClientTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClientTransport {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), MCP_ENDPOINT),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ClientTransport for HttpClientTransport {
    async fn send(&self, request: JsonRpcRequest) -> Result<Delivery> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!(
                "HTTP request failed with status {}",
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response body: {}", e)))?;
        Ok(Delivery::Direct(decode_response(&body)?))
    }

    fn is_connected(&self) -> bool {
        true
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(
            HttpClientTransport::new("http://127.0.0.1:3000/").endpoint(),
            "http://127.0.0.1:3000/api/mcp"
        );
        assert_eq!(
            HttpClientTransport::new("http://localhost:8080").endpoint(),
            "http://localhost:8080/api/mcp"
        );
    }
}
