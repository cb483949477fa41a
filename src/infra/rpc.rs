use std::sync::atomic::{AtomicU64, Ordering};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Ethereum JSON-RPC client over HTTP.
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Issue a JSON-RPC call and decode its `result`.
    ///
    /// A `null` result decodes into `Option::None` for optional return types.
    pub async fn request<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("rpc #{} -> {}", id, method);

        let body = Request {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let response: Response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        decode_response(method, response)
    }

    /// Get the RPC URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn decode_response<R: DeserializeOwned>(method: &str, response: Response) -> Result<R> {
    if let Some(err) = response.error {
        return Err(Error::from_rpc(err.code, &err.message));
    }
    let result = response.result.unwrap_or(Value::Null);
    serde_json::from_value(result)
        .map_err(|e| Error::Unknown(format!("malformed {method} result: {e}")))
}
