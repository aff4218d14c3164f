/// Errors that can occur while talking to a Stash server.
#[derive(Debug, thiserror::Error)]
pub enum StashError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GraphQL fragment \"{0}\" is not defined in the query or the registry")]
    UndefinedFragment(String),

    #[error("Unauthorized (HTTP 401): session cookie or API key rejected")]
    Unauthorized,

    #[error("Could not connect to Stash at {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("GraphQL query returned no data: {}", .messages.join("; "))]
    GraphQl { messages: Vec<String> },

    #[error("Configuration error: {0}")]
    Config(String),
}
