use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog service returned status {status}: {body}")]
    Status { status: u16, body: String },

    // Misconfigured proxies answer with the SPA index page instead of JSON.
    #[error("Catalog service returned HTML instead of JSON")]
    NotJson,

    #[error("Failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed catalog CSV row {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No catalog record with id '{0}'")]
    NotFound(String),
}
