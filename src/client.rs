use std::time::Duration;

use serde_json::Value;

use crate::connection::ConnectionConfig;
use crate::error::StashError;
use crate::fragments::FragmentRegistry;
use crate::types::{GraphQlRequest, GraphQlResponse};

/// Minimal query used to verify the connection when a client is created.
const PROBE_QUERY: &str = "query Configuration { configuration { general { stashes { path } } } }";

/// Full configuration query, selecting every Config* fragment.
const CONFIGURATION_QUERY: &str = "query Configuration { configuration { ...ConfigData } }";

/// Client for a Stash server's GraphQL endpoint.
///
/// Queries pass through the fragment registry before being sent, so
/// operation bodies can reference any registered fragment by spread.
pub struct StashClient {
    http: reqwest::Client,
    endpoint: String,
    config: ConnectionConfig,
    fragments: FragmentRegistry,
}

impl StashClient {
    /// Connect with the built-in fragment registry and verify the server is
    /// reachable.
    pub async fn connect(config: ConnectionConfig) -> Result<Self, StashError> {
        Self::connect_with(config, FragmentRegistry::empty()).await
    }

    /// Connect with additional fragment definitions merged over the
    /// built-in set (extra definitions win on name collision).
    pub async fn connect_with(
        config: ConnectionConfig,
        extra_fragments: FragmentRegistry,
    ) -> Result<Self, StashError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let mut fragments = FragmentRegistry::default();
        fragments.extend(extra_fragments);

        let endpoint = config.endpoint();
        log::debug!("using Stash GraphQL endpoint at {endpoint}");

        let client = Self {
            http,
            endpoint,
            config,
            fragments,
        };
        client.probe().await?;
        Ok(client)
    }

    async fn probe(&self) -> Result<(), StashError> {
        match self.call(PROBE_QUERY, None).await {
            Ok(_) => Ok(()),
            Err(StashError::Unauthorized) => Err(StashError::Unauthorized),
            Err(other) => Err(StashError::Connection {
                url: self.endpoint.clone(),
                message: other.to_string(),
            }),
        }
    }

    /// The fragment registry this client resolves queries against.
    pub fn fragments(&self) -> &FragmentRegistry {
        &self.fragments
    }

    /// The GraphQL endpoint URL this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the server's full configuration (general, interface, and DLNA
    /// sections).
    pub async fn configuration(&self) -> Result<Value, StashError> {
        let data = self.call(CONFIGURATION_QUERY, None).await?;
        decode_at(&data, "/configuration")
    }

    /// Resolve fragments in `query`, POST it with `variables`, and return
    /// the response's `data` value.
    ///
    /// Server-reported GraphQL errors are logged; the call still succeeds
    /// when partial data is present. A response with errors and no data
    /// fails with [`StashError::GraphQl`].
    pub async fn call(&self, query: &str, variables: Option<Value>) -> Result<Value, StashError> {
        let query = self.fragments.resolve(query)?;
        let body = GraphQlRequest {
            query: &query,
            variables,
        };

        let mut request = self
            .http
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&body);
        if let Some(cookie) = &self.config.session_cookie {
            request = request.header("Cookie", format!("session={cookie}"));
        }
        if let Some(key) = &self.config.api_key {
            request = request.header("ApiKey", key);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(StashError::Unauthorized);
        }

        let text = resp.text().await?;
        if !status.is_success() {
            return Err(StashError::Server {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        let response: GraphQlResponse =
            serde_json::from_str(&text).map_err(|e| StashError::Server {
                status: status.as_u16(),
                message: format!(
                    "failed to parse response: {e}. Response: {}",
                    text.chars().take(200).collect::<String>()
                ),
            })?;

        for error in &response.errors {
            log::error!("GraphQL error: {}", error.message);
        }

        match response.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(StashError::GraphQl {
                messages: response.errors.into_iter().map(|e| e.message).collect(),
            }),
        }
    }
}

/// Deserialize the value at a JSON pointer within a `data` payload.
pub(crate) fn decode_at<T: serde::de::DeserializeOwned>(
    data: &Value,
    pointer: &str,
) -> Result<T, StashError> {
    let value = data.pointer(pointer).cloned().unwrap_or(Value::Null);
    Ok(serde_json::from_value(value)?)
}
