use thiserror::Error;

/// Everything that can go wrong talking to an upstream provider.
///
/// None of these reach the request layer: the resolver falls through to the
/// next xG source and the aggregator skips the league.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("provider rejected request with status {status}")]
    Rejected { status: u16 },

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("embedded data not found: {0}")]
    ScrapeStructureNotFound(String),

    #[error("no matching fixture: {0}")]
    NoMatchFound(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::MalformedPayload(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::Rejected {
                status: status.as_u16(),
            }
        } else {
            ProviderError::Unreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::MalformedPayload(err.to_string())
    }
}

/// Turn a non-success status into `Rejected`
pub fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ProviderError::Rejected {
            status: status.as_u16(),
        })
    }
}
