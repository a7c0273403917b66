// Errors that abort a crawl run. A row without a match identifier is not an
// error; the parser simply returns `None` for it.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
    #[error("unexpected status {status} from {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },
    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
